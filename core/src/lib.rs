#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Wizard Dungeon level editor.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative level, and the editor system. Adapters and systems submit
//! [`Command`] values describing desired mutations, the level executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing exactly what changed. Routine placement refusals are values
//! ([`PlacementOutcome`]); contract violations are [`LevelError`]s.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest width or height a level grid may be resized to.
pub const MAX_GRID_DIMENSION: u32 = 1024;

/// Classification of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Solid cell that blocks movement.
    Wall,
    /// Walkable cell. Newly exposed cells default to floor.
    #[default]
    Floor,
}

impl Tile {
    /// Returns the opposite tile type.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Wall => Self::Floor,
            Self::Floor => Self::Wall,
        }
    }
}

/// Location of a single grid tile expressed as `x` and `y` indices.
///
/// Components are signed so that requests left of or above the grid can be
/// represented and rejected instead of silently wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Reports whether the coordinate lies within a `width` by `height` grid.
    #[must_use]
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        u32::try_from(self.x).map_or(false, |x| x < width)
            && u32::try_from(self.y).map_or(false, |y| y < height)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Placeable objects stored as coordinate sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Enemy spawn position.
    Enemy,
    /// Fire hazard position.
    Fire,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enemy => f.write_str("enemy"),
            Self::Fire => f.write_str("fire"),
        }
    }
}

/// Singleton positions a level may hold at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    /// Tile the player starts on.
    Start,
    /// Tile the player must reach.
    Goal,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Goal => f.write_str("goal"),
        }
    }
}

/// Axis along which a level may be mirrored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlipDirection {
    /// Mirrors columns, mapping `x` to `width - 1 - x`.
    Horizontal,
    /// Mirrors rows, mapping `y` to `height - 1 - y`.
    Vertical,
}

/// Describes whether the level is being edited or played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayMode {
    /// Editing mode where placements and resizes are permitted.
    #[default]
    Editing,
    /// A game session is running and the level is read-only.
    Playing,
}

/// Editing tool currently selected in the editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementMode {
    /// No tool selected; placements are ignored.
    #[default]
    Off,
    /// Toggles the target tile between wall and floor.
    ToggleTile,
    /// Adds or removes a fire hazard.
    PlaceFire,
    /// Adds or removes an enemy.
    PlaceEnemy,
    /// Moves the start marker.
    PlaceStart,
    /// Moves the goal marker.
    PlaceGoal,
}

/// Commands that express all permissible level mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Overwrites a single tile.
    SetTile {
        /// Tile being written.
        at: Coordinate,
        /// New tile value.
        tile: Tile,
    },
    /// Appends an entity at the provided coordinate.
    AddEntity {
        /// Kind of entity to add.
        kind: EntityKind,
        /// Location of the new entity.
        at: Coordinate,
    },
    /// Removes the first entity of the given kind stored at the coordinate.
    RemoveEntity {
        /// Kind of entity to remove.
        kind: EntityKind,
        /// Location of the entity.
        at: Coordinate,
    },
    /// Moves or clears a singleton marker.
    SetMarker {
        /// Marker being updated.
        marker: Marker,
        /// New location, or `None` to unset the marker.
        at: Option<Coordinate>,
    },
    /// Resizes the grid, preserving overlapping tiles and pruning entities.
    ResizeGrid {
        /// Requested number of columns.
        width: i32,
        /// Requested number of rows.
        height: i32,
    },
    /// Mirrors the grid and every entity along an axis.
    Flip {
        /// Axis to mirror along.
        direction: FlipDirection,
    },
    /// Updates the time allowed to finish the level.
    SetTimeLimit {
        /// Time limit in whole seconds.
        seconds: u32,
    },
    /// Switches between editing and playing.
    SetPlayMode {
        /// Mode the level should enter.
        mode: PlayMode,
    },
}

/// Events reported after commands are processed or placements resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A tile changed value.
    TileChanged {
        /// Location of the tile.
        at: Coordinate,
        /// Value written to the tile.
        tile: Tile,
    },
    /// An entity was appended to the registry.
    EntityAdded {
        /// Kind of entity added.
        kind: EntityKind,
        /// Location of the entity.
        at: Coordinate,
    },
    /// An entity was removed from the registry.
    EntityRemoved {
        /// Kind of entity removed.
        kind: EntityKind,
        /// Location the entity occupied.
        at: Coordinate,
    },
    /// A marker was moved, placed, or cleared.
    MarkerMoved {
        /// Marker that changed.
        marker: Marker,
        /// Previous location, if the marker was set.
        from: Option<Coordinate>,
        /// New location, or `None` if the marker was cleared.
        to: Option<Coordinate>,
    },
    /// The grid was replaced with one of new dimensions.
    GridResized {
        /// New number of columns.
        width: u32,
        /// New number of rows.
        height: u32,
    },
    /// The level was mirrored.
    LevelFlipped {
        /// Axis the level was mirrored along.
        direction: FlipDirection,
    },
    /// The time limit changed.
    TimeLimitChanged {
        /// New time limit in seconds.
        seconds: u32,
    },
    /// The level entered a new play mode.
    PlayModeChanged {
        /// Mode that became active.
        mode: PlayMode,
    },
    /// A placement was refused by the overlap-prevention policy.
    PlacementRejected {
        /// Tool that attempted the placement.
        mode: PlacementMode,
        /// Target of the placement.
        at: Coordinate,
        /// Reason the placement was refused.
        reason: PlacementConflict,
    },
    /// The user declined to replace an occupant, aborting a placement.
    ReplacementDeclined {
        /// Tool that attempted the placement.
        mode: PlacementMode,
        /// Target of the placement.
        at: Coordinate,
        /// Kind of entity the user chose to keep.
        occupant: EntityKind,
    },
}

/// Hard conflicts that reject a placement while overlap prevention is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementConflict {
    /// The target tile is a wall.
    Wall,
    /// The target holds the start marker.
    Start,
    /// The target holds the goal marker.
    Goal,
}

impl fmt::Display for PlacementConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wall => f.write_str("cannot place on a wall"),
            Self::Start => f.write_str("cannot place on the start position"),
            Self::Goal => f.write_str("cannot place on the goal position"),
        }
    }
}

/// Result of asking whether an occupant may be replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplaceOutcome {
    /// Nothing occupies the target.
    NoConflict,
    /// The user agreed to remove the occupant.
    ReplacedAfterConfirmation,
    /// The user declined; the placement must not proceed.
    AbortedByUser,
}

/// Final result of a placement request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementOutcome {
    /// No tool is active, nothing happened.
    Skipped,
    /// A game session is running, nothing happened.
    Locked,
    /// The placement mutated the level.
    Applied,
    /// The placement was refused with a hard conflict.
    Rejected(PlacementConflict),
    /// The user declined a replacement confirmation.
    Aborted,
}

impl PlacementOutcome {
    /// Reports whether the level was mutated.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Contract violations raised by level operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// A coordinate lies outside the current grid.
    #[error("coordinate {at} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Offending coordinate.
        at: Coordinate,
        /// Grid width at the time of the request.
        width: u32,
        /// Grid height at the time of the request.
        height: u32,
    },
    /// A resize target is negative or exceeds [`MAX_GRID_DIMENSION`].
    #[error("invalid grid size {width}x{height}")]
    InvalidArgument {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// The level is read-only while a game session runs.
    #[error("the level cannot be edited while a game is in progress")]
    SessionActive,
}

#[cfg(test)]
mod tests {
    use super::{Coordinate, EntityKind, FlipDirection, LevelError, Marker, PlacementConflict, Tile};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn coordinate_round_trips_through_bincode() {
        assert_round_trip(&Coordinate::new(-3, 17));
    }

    #[test]
    fn vocabulary_round_trips_through_bincode() {
        assert_round_trip(&Tile::Wall);
        assert_round_trip(&EntityKind::Fire);
        assert_round_trip(&Marker::Goal);
        assert_round_trip(&FlipDirection::Vertical);
        assert_round_trip(&PlacementConflict::Start);
    }

    #[test]
    fn coordinate_bounds_reject_negative_components() {
        assert!(Coordinate::new(0, 0).is_within(1, 1));
        assert!(!Coordinate::new(-1, 0).is_within(4, 4));
        assert!(!Coordinate::new(0, -1).is_within(4, 4));
        assert!(!Coordinate::new(4, 0).is_within(4, 4));
        assert!(!Coordinate::new(0, 0).is_within(0, 0));
    }

    #[test]
    fn toggled_tile_swaps_wall_and_floor() {
        assert_eq!(Tile::Wall.toggled(), Tile::Floor);
        assert_eq!(Tile::Floor.toggled(), Tile::Wall);
        assert_eq!(Tile::default(), Tile::Floor);
    }

    #[test]
    fn out_of_bounds_error_names_coordinate_and_grid() {
        let error = LevelError::OutOfBounds {
            at: Coordinate::new(5, 2),
            width: 4,
            height: 3,
        };
        assert_eq!(
            error.to_string(),
            "coordinate (5, 2) is outside the 4x3 grid"
        );
    }
}
