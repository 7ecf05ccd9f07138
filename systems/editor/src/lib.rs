#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Editor system that turns a selected tool and a target tile into level commands.
//!
//! The controller evaluates every conflict before it mutates anything: hard
//! conflicts first (wall, start, goal), then replacement confirmations (fire,
//! enemy). A rejection or a declined confirmation leaves the level untouched.

mod pointer;

use std::fmt;

use glam::Vec2;
use log::{debug, warn};
use wizard_dungeon_core::{
    Command, Coordinate, EntityKind, Event, LevelError, Marker, PlacementConflict, PlacementMode,
    PlacementOutcome, PlayMode, ReplaceOutcome, Tile,
};
use wizard_dungeon_level::{self as level, query, Level};

pub use pointer::TileMetrics;

/// Question put to the user before an occupant is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplacePrompt {
    /// Kind of entity that would be removed.
    pub occupant: EntityKind,
    /// Tile holding the occupant.
    pub at: Coordinate,
    /// Tool requesting the replacement.
    pub mode: PlacementMode,
}

impl fmt::Display for ReplacePrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Replace the {} at {}?", self.occupant, self.at)
    }
}

/// Capability that answers replacement questions.
///
/// Calls block until the user answers; `false` aborts the placement.
pub trait Confirm {
    /// Returns `true` when the user accepts the replacement.
    fn confirm(&mut self, prompt: &ReplacePrompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ReplacePrompt) -> bool,
{
    fn confirm(&mut self, prompt: &ReplacePrompt) -> bool {
        self(prompt)
    }
}

/// Placement controller holding the active tool and overlap policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementController {
    mode: PlacementMode,
    overlap_prevention: bool,
}

impl Default for PlacementController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementController {
    /// Creates a controller with no tool selected and overlap prevention on.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: PlacementMode::Off,
            overlap_prevention: true,
        }
    }

    /// Currently selected tool.
    #[must_use]
    pub const fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// Selects a tool.
    pub fn set_mode(&mut self, mode: PlacementMode) {
        self.mode = mode;
    }

    /// Whether placements are checked against walls and existing entities.
    #[must_use]
    pub const fn overlap_prevention(&self) -> bool {
        self.overlap_prevention
    }

    /// Enables or disables overlap checks.
    pub fn set_overlap_prevention(&mut self, enabled: bool) {
        self.overlap_prevention = enabled;
    }

    /// Applies the active tool to the target tile.
    ///
    /// Returns [`LevelError::OutOfBounds`] for targets outside the grid. All
    /// routine refusals are reported through the returned outcome and a
    /// matching event.
    pub fn apply_placement<C>(
        &self,
        level: &mut Level,
        target: Coordinate,
        confirm: &mut C,
        out_events: &mut Vec<Event>,
    ) -> Result<PlacementOutcome, LevelError>
    where
        C: Confirm + ?Sized,
    {
        if self.mode == PlacementMode::Off {
            return Ok(PlacementOutcome::Skipped);
        }
        if query::play_mode(level) == PlayMode::Playing {
            warn!("[Editor] End the game before altering the level");
            return Ok(PlacementOutcome::Locked);
        }

        let current = query::tile(level, target)?;
        let Some(plan) = Plan::for_mode(self.mode, current, target, level) else {
            return Ok(PlacementOutcome::Skipped);
        };

        if self.overlap_prevention && !plan.unchecked {
            if let Some(reason) = plan
                .hard_checks
                .iter()
                .find_map(|check| check.evaluate(level, current, target))
            {
                debug!("[Editor] {:?} at {target} rejected: {reason}", self.mode);
                out_events.push(Event::PlacementRejected {
                    mode: self.mode,
                    at: target,
                    reason,
                });
                return Ok(PlacementOutcome::Rejected(reason));
            }

            let mut removals = Vec::new();
            for &occupant in plan.replaceable {
                match self.confirm_replacement(level, occupant, target, confirm) {
                    ReplaceOutcome::NoConflict => {}
                    ReplaceOutcome::ReplacedAfterConfirmation => {
                        removals.push(Command::RemoveEntity {
                            kind: occupant,
                            at: target,
                        });
                    }
                    ReplaceOutcome::AbortedByUser => {
                        debug!("[Editor] Kept {occupant} at {target}, placement aborted");
                        out_events.push(Event::ReplacementDeclined {
                            mode: self.mode,
                            at: target,
                            occupant,
                        });
                        return Ok(PlacementOutcome::Aborted);
                    }
                }
            }

            for command in removals {
                level::apply(level, command, out_events)?;
            }
        }

        level::apply(level, plan.command, out_events)?;
        Ok(PlacementOutcome::Applied)
    }

    /// Applies the active tool to the tile under a canvas pixel.
    ///
    /// Pixels that fall outside the grid are skipped rather than rejected.
    pub fn apply_click<C>(
        &self,
        level: &mut Level,
        pixel: Vec2,
        metrics: TileMetrics,
        confirm: &mut C,
        out_events: &mut Vec<Event>,
    ) -> Result<PlacementOutcome, LevelError>
    where
        C: Confirm + ?Sized,
    {
        let (width, height) = query::dimensions(level);
        match metrics.tile_at(pixel) {
            Some(target) if target.is_within(width, height) => {
                self.apply_placement(level, target, confirm, out_events)
            }
            _ => Ok(PlacementOutcome::Skipped),
        }
    }

    fn confirm_replacement<C>(
        &self,
        level: &Level,
        occupant: EntityKind,
        target: Coordinate,
        confirm: &mut C,
    ) -> ReplaceOutcome
    where
        C: Confirm + ?Sized,
    {
        if !query::has_entity(level, occupant, target) {
            return ReplaceOutcome::NoConflict;
        }

        let prompt = ReplacePrompt {
            occupant,
            at: target,
            mode: self.mode,
        };
        if confirm.confirm(&prompt) {
            ReplaceOutcome::ReplacedAfterConfirmation
        } else {
            ReplaceOutcome::AbortedByUser
        }
    }
}

/// Hard conflict checks, evaluated in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HardCheck {
    Wall,
    Start,
    Goal,
}

impl HardCheck {
    fn evaluate(
        self,
        level: &Level,
        current: Tile,
        target: Coordinate,
    ) -> Option<PlacementConflict> {
        match self {
            Self::Wall => (current == Tile::Wall).then_some(PlacementConflict::Wall),
            Self::Start => (query::marker(level, Marker::Start) == Some(target))
                .then_some(PlacementConflict::Start),
            Self::Goal => (query::marker(level, Marker::Goal) == Some(target))
                .then_some(PlacementConflict::Goal),
        }
    }
}

/// Checks and final command required by one placement.
#[derive(Debug)]
struct Plan {
    hard_checks: &'static [HardCheck],
    replaceable: &'static [EntityKind],
    unchecked: bool,
    command: Command,
}

impl Plan {
    fn for_mode(
        mode: PlacementMode,
        current: Tile,
        target: Coordinate,
        level: &Level,
    ) -> Option<Self> {
        let toggle_entity = |kind: EntityKind| {
            if query::has_entity(level, kind, target) {
                Command::RemoveEntity { kind, at: target }
            } else {
                Command::AddEntity { kind, at: target }
            }
        };

        let plan = match mode {
            PlacementMode::Off => return None,
            // Removing a wall never conflicts with anything.
            PlacementMode::ToggleTile => Self {
                hard_checks: &[HardCheck::Start, HardCheck::Goal],
                replaceable: &[EntityKind::Fire, EntityKind::Enemy],
                unchecked: current == Tile::Wall,
                command: Command::SetTile {
                    at: target,
                    tile: current.toggled(),
                },
            },
            PlacementMode::PlaceFire => Self {
                hard_checks: &[HardCheck::Wall, HardCheck::Start, HardCheck::Goal],
                replaceable: &[EntityKind::Enemy],
                unchecked: false,
                command: toggle_entity(EntityKind::Fire),
            },
            PlacementMode::PlaceEnemy => Self {
                hard_checks: &[HardCheck::Wall, HardCheck::Start, HardCheck::Goal],
                replaceable: &[EntityKind::Fire],
                unchecked: false,
                command: toggle_entity(EntityKind::Enemy),
            },
            PlacementMode::PlaceStart => Self::marker(
                Marker::Start,
                target,
                &[HardCheck::Wall, HardCheck::Goal],
            ),
            PlacementMode::PlaceGoal => Self::marker(
                Marker::Goal,
                target,
                &[HardCheck::Wall, HardCheck::Start],
            ),
        };
        Some(plan)
    }

    fn marker(marker: Marker, target: Coordinate, hard_checks: &'static [HardCheck]) -> Self {
        Self {
            hard_checks,
            replaceable: &[EntityKind::Fire, EntityKind::Enemy],
            unchecked: false,
            command: Command::SetMarker {
                marker,
                at: Some(target),
            },
        }
    }
}
