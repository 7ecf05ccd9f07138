#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Wizard Dungeon.
//!
//! A [`Level`] owns the tile grid, the entity registry, and the time limit.
//! All mutations flow through [`apply`], which either performs a command in
//! full and reports what changed, or fails without touching the level.

mod grid;
mod registry;

use std::fmt;

use log::{debug, info};
use wizard_dungeon_core::{Command, Coordinate, Event, LevelError, PlayMode, MAX_GRID_DIMENSION};

pub use grid::TileGrid;
pub use registry::EntityRegistry;

/// Represents a single dungeon level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Level {
    grid: TileGrid,
    entities: EntityRegistry,
    time_limit: u32,
    play_mode: PlayMode,
}

impl Level {
    /// Creates an empty `0x0` level with no entities and no time limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a level from loaded parts, validating entity bounds.
    ///
    /// Loaders use this to hand over fully populated levels; any stored
    /// coordinate outside the grid is reported as [`LevelError::OutOfBounds`].
    pub fn from_parts(
        grid: TileGrid,
        entities: EntityRegistry,
        time_limit: u32,
    ) -> Result<Self, LevelError> {
        if let Some(at) = entities.coordinates().find(|at| !grid.contains(*at)) {
            return Err(LevelError::OutOfBounds {
                at,
                width: grid.width(),
                height: grid.height(),
            });
        }

        Ok(Self {
            grid,
            entities,
            time_limit,
            play_mode: PlayMode::Editing,
        })
    }

    fn ensure_in_bounds(&self, at: Coordinate) -> Result<(), LevelError> {
        if self.grid.contains(at) {
            Ok(())
        } else {
            Err(LevelError::OutOfBounds {
                at,
                width: self.grid.width(),
                height: self.grid.height(),
            })
        }
    }

    fn resize(
        &mut self,
        width: i32,
        height: i32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), LevelError> {
        let (new_width, new_height) = validate_dimensions(width, height)?;
        if new_width == self.grid.width() && new_height == self.grid.height() {
            return Ok(());
        }

        info!(
            "[Level] Resizing grid from {}x{} to {new_width}x{new_height}",
            self.grid.width(),
            self.grid.height()
        );
        self.grid = self.grid.resized(new_width, new_height);
        out_events.push(Event::GridResized {
            width: new_width,
            height: new_height,
        });

        let pruned = self.entities.retain_within(new_width, new_height);
        for (kind, at) in pruned.entities {
            debug!("[Level] Pruned {kind} at {at} outside the resized grid");
            out_events.push(Event::EntityRemoved { kind, at });
        }
        for (marker, at) in pruned.markers {
            debug!("[Level] Cleared {marker} at {at} outside the resized grid");
            out_events.push(Event::MarkerMoved {
                marker,
                from: Some(at),
                to: None,
            });
        }

        Ok(())
    }
}

/// Applies the provided command to the level.
///
/// On error the level is left exactly as it was and no events are emitted.
pub fn apply(
    level: &mut Level,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    if level.play_mode == PlayMode::Playing && !matches!(command, Command::SetPlayMode { .. }) {
        return Err(LevelError::SessionActive);
    }

    match command {
        Command::SetTile { at, tile } => {
            level.grid.set_tile(at, tile)?;
            out_events.push(Event::TileChanged { at, tile });
        }
        Command::AddEntity { kind, at } => {
            level.ensure_in_bounds(at)?;
            level.entities.insert(kind, at);
            out_events.push(Event::EntityAdded { kind, at });
        }
        Command::RemoveEntity { kind, at } => {
            if level.entities.remove(kind, at) {
                out_events.push(Event::EntityRemoved { kind, at });
            }
        }
        Command::SetMarker { marker, at } => {
            if let Some(at) = at {
                level.ensure_in_bounds(at)?;
            }
            let from = level.entities.set_marker(marker, at);
            out_events.push(Event::MarkerMoved {
                marker,
                from,
                to: at,
            });
        }
        Command::ResizeGrid { width, height } => level.resize(width, height, out_events)?,
        Command::Flip { direction } => {
            let (width, height) = (level.grid.width(), level.grid.height());
            level.grid.flip(direction);
            level.entities.flip(direction, width, height);
            out_events.push(Event::LevelFlipped { direction });
        }
        Command::SetTimeLimit { seconds } => {
            level.time_limit = seconds;
            out_events.push(Event::TimeLimitChanged { seconds });
        }
        Command::SetPlayMode { mode } => {
            if level.play_mode != mode {
                level.play_mode = mode;
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
    }

    Ok(())
}

fn validate_dimensions(width: i32, height: i32) -> Result<(u32, u32), LevelError> {
    let invalid = LevelError::InvalidArgument { width, height };
    let columns = u32::try_from(width).map_err(|_| invalid.clone())?;
    let rows = u32::try_from(height).map_err(|_| invalid.clone())?;
    if columns > MAX_GRID_DIMENSION || rows > MAX_GRID_DIMENSION {
        return Err(invalid);
    }
    Ok((columns, rows))
}

/// Tile and entity counts summarising a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelStats {
    /// Number of floor tiles.
    pub floors: usize,
    /// Number of wall tiles.
    pub walls: usize,
    /// Number of enemies.
    pub enemies: usize,
    /// Number of fires.
    pub fires: usize,
}

impl fmt::Display for LevelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Floors: {} | Walls: {} | Enemies: {} | Fires: {}",
            self.floors, self.walls, self.enemies, self.fires
        )
    }
}

/// Query functions that provide read-only access to the level.
pub mod query {
    use super::{Level, LevelStats};
    use wizard_dungeon_core::{Coordinate, EntityKind, LevelError, Marker, PlayMode, Tile};

    use crate::{EntityRegistry, TileGrid};

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(level: &Level) -> &TileGrid {
        &level.grid
    }

    /// Provides read-only access to the entity registry.
    #[must_use]
    pub fn entities(level: &Level) -> &EntityRegistry {
        &level.entities
    }

    /// Current grid dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(level: &Level) -> (u32, u32) {
        (level.grid.width(), level.grid.height())
    }

    /// Reads the tile at the coordinate.
    pub fn tile(level: &Level, at: Coordinate) -> Result<Tile, LevelError> {
        level.grid.tile(at)
    }

    /// Counts the tiles of the provided type.
    #[must_use]
    pub fn count_tiles(level: &Level, tile: Tile) -> usize {
        level.grid.count(tile)
    }

    /// Positions stored for the provided entity kind.
    #[must_use]
    pub fn positions(level: &Level, kind: EntityKind) -> &[Coordinate] {
        level.entities.positions(kind)
    }

    /// Reports whether an entity of the given kind sits at the coordinate.
    #[must_use]
    pub fn has_entity(level: &Level, kind: EntityKind, at: Coordinate) -> bool {
        level.entities.contains(kind, at)
    }

    /// Current location of a marker, if set.
    #[must_use]
    pub fn marker(level: &Level, marker: Marker) -> Option<Coordinate> {
        level.entities.marker(marker)
    }

    /// Time allowed to finish the level, in seconds.
    #[must_use]
    pub fn time_limit(level: &Level) -> u32 {
        level.time_limit
    }

    /// Mode the level is currently in.
    #[must_use]
    pub fn play_mode(level: &Level) -> PlayMode {
        level.play_mode
    }

    /// Summarises tile and entity counts.
    #[must_use]
    pub fn stats(level: &Level) -> LevelStats {
        LevelStats {
            floors: level.grid.count(Tile::Floor),
            walls: level.grid.count(Tile::Wall),
            enemies: level.entities.positions(EntityKind::Enemy).len(),
            fires: level.entities.positions(EntityKind::Fire).len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizard_dungeon_core::{EntityKind, Marker, Tile};

    fn resized(width: i32, height: i32) -> Level {
        let mut level = Level::new();
        let mut events = Vec::new();
        apply(&mut level, Command::ResizeGrid { width, height }, &mut events).expect("resize");
        level
    }

    #[test]
    fn new_level_is_empty() {
        let level = Level::new();
        assert_eq!(query::dimensions(&level), (0, 0));
        assert_eq!(query::stats(&level), LevelStats::default());
        assert_eq!(query::marker(&level, Marker::Start), None);
        assert_eq!(query::play_mode(&level), PlayMode::Editing);
    }

    #[test]
    fn first_resize_initialises_all_floor() {
        let level = resized(4, 3);
        assert_eq!(query::dimensions(&level), (4, 3));
        assert_eq!(query::count_tiles(&level, Tile::Floor), 12);
    }

    #[test]
    fn negative_resize_is_rejected_without_mutation() {
        let mut level = resized(2, 2);
        let before = level.clone();
        let mut events = Vec::new();

        let result = apply(
            &mut level,
            Command::ResizeGrid {
                width: -1,
                height: 3,
            },
            &mut events,
        );

        assert_eq!(
            result,
            Err(LevelError::InvalidArgument {
                width: -1,
                height: 3
            })
        );
        assert_eq!(level, before);
        assert!(events.is_empty());
    }

    #[test]
    fn oversized_resize_is_rejected() {
        let mut level = Level::new();
        let mut events = Vec::new();
        let too_wide = i32::try_from(MAX_GRID_DIMENSION + 1).expect("fits");
        assert!(apply(
            &mut level,
            Command::ResizeGrid {
                width: too_wide,
                height: 1,
            },
            &mut events,
        )
        .is_err());
    }

    #[test]
    fn same_size_resize_emits_nothing() {
        let mut level = resized(3, 3);
        let mut events = Vec::new();
        apply(
            &mut level,
            Command::ResizeGrid {
                width: 3,
                height: 3,
            },
            &mut events,
        )
        .expect("resize");
        assert!(events.is_empty());
    }

    #[test]
    fn add_entity_rejects_out_of_bounds() {
        let mut level = resized(2, 2);
        let mut events = Vec::new();
        let result = apply(
            &mut level,
            Command::AddEntity {
                kind: EntityKind::Enemy,
                at: Coordinate::new(2, 0),
            },
            &mut events,
        );
        assert!(matches!(result, Err(LevelError::OutOfBounds { .. })));
        assert!(query::positions(&level, EntityKind::Enemy).is_empty());
    }

    #[test]
    fn remove_missing_entity_is_silent() {
        let mut level = resized(2, 2);
        let mut events = Vec::new();
        apply(
            &mut level,
            Command::RemoveEntity {
                kind: EntityKind::Fire,
                at: Coordinate::new(0, 0),
            },
            &mut events,
        )
        .expect("remove");
        assert!(events.is_empty());
    }

    #[test]
    fn playing_level_refuses_edits() {
        let mut level = resized(2, 2);
        let mut events = Vec::new();
        apply(
            &mut level,
            Command::SetPlayMode {
                mode: PlayMode::Playing,
            },
            &mut events,
        )
        .expect("mode change");

        let result = apply(
            &mut level,
            Command::SetTile {
                at: Coordinate::new(0, 0),
                tile: Tile::Wall,
            },
            &mut events,
        );
        assert_eq!(result, Err(LevelError::SessionActive));
        assert_eq!(query::count_tiles(&level, Tile::Wall), 0);

        apply(
            &mut level,
            Command::SetPlayMode {
                mode: PlayMode::Editing,
            },
            &mut events,
        )
        .expect("mode change");
        assert_eq!(
            events,
            vec![
                Event::PlayModeChanged {
                    mode: PlayMode::Playing
                },
                Event::PlayModeChanged {
                    mode: PlayMode::Editing
                },
            ]
        );
    }

    #[test]
    fn from_parts_rejects_entities_outside_grid() {
        let mut entities = EntityRegistry::new();
        let _ = entities.set_marker(Marker::Goal, Some(Coordinate::new(5, 5)));
        let result = Level::from_parts(TileGrid::new(3, 3), entities, 30);
        assert_eq!(
            result,
            Err(LevelError::OutOfBounds {
                at: Coordinate::new(5, 5),
                width: 3,
                height: 3,
            })
        );
    }

    #[test]
    fn stats_display_matches_status_bar() {
        let stats = LevelStats {
            floors: 7,
            walls: 2,
            enemies: 1,
            fires: 0,
        };
        assert_eq!(
            stats.to_string(),
            "Floors: 7 | Walls: 2 | Enemies: 1 | Fires: 0"
        );
    }
}
