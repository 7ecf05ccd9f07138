use serde::{Deserialize, Serialize};
use wizard_dungeon_core::{Coordinate, EntityKind, LevelError, Marker, Tile, MAX_GRID_DIMENSION};
use wizard_dungeon_level::{query, EntityRegistry, Level, TileGrid};

use crate::PersistenceError;

pub(crate) const DOCUMENT_VERSION: u32 = 1;
const WALL_GLYPH: char = '#';
const FLOOR_GLYPH: char = '.';

/// Serialisable description of a complete level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LevelDocument {
    pub(crate) version: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) time_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) start: Option<[i32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) goal: Option<[i32; 2]>,
    #[serde(default)]
    pub(crate) enemies: Vec<[i32; 2]>,
    #[serde(default)]
    pub(crate) fires: Vec<[i32; 2]>,
    #[serde(default)]
    pub(crate) tiles: Vec<String>,
}

impl LevelDocument {
    pub(crate) fn from_level(level: &Level) -> Self {
        let (width, height) = query::dimensions(level);
        let tiles: Vec<String> = query::grid(level)
            .rows()
            .map(|row| row.iter().map(|tile| glyph(*tile)).collect())
            .collect();

        Self {
            version: DOCUMENT_VERSION,
            width,
            height,
            time_limit: query::time_limit(level),
            start: query::marker(level, Marker::Start).map(pair),
            goal: query::marker(level, Marker::Goal).map(pair),
            enemies: pairs(query::positions(level, EntityKind::Enemy)),
            fires: pairs(query::positions(level, EntityKind::Fire)),
            tiles,
        }
    }

    pub(crate) fn into_level(self) -> Result<Level, PersistenceError> {
        if self.version != DOCUMENT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: self.version,
                expected: DOCUMENT_VERSION,
            });
        }
        if self.width > MAX_GRID_DIMENSION || self.height > MAX_GRID_DIMENSION {
            return Err(LevelError::InvalidArgument {
                width: i32::try_from(self.width).unwrap_or(i32::MAX),
                height: i32::try_from(self.height).unwrap_or(i32::MAX),
            }
            .into());
        }
        if self.tiles.len() != self.height as usize {
            return Err(PersistenceError::RowCount {
                expected: self.height,
                found: self.tiles.len(),
            });
        }

        let mut grid = TileGrid::new(self.width, self.height);
        for (y, row) in self.tiles.iter().enumerate() {
            let found = row.chars().count();
            if found != self.width as usize {
                return Err(PersistenceError::RowWidth {
                    row: y,
                    expected: self.width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = parse_glyph(glyph).ok_or(PersistenceError::InvalidGlyph {
                    row: y,
                    column: x,
                    glyph,
                })?;
                if tile == Tile::Wall {
                    // Both indices are bounded by MAX_GRID_DIMENSION.
                    grid.set_tile(Coordinate::new(x as i32, y as i32), tile)?;
                }
            }
        }

        let mut entities = EntityRegistry::new();
        for at in self.enemies {
            entities.insert(EntityKind::Enemy, coordinate(at));
        }
        for at in self.fires {
            entities.insert(EntityKind::Fire, coordinate(at));
        }
        let _ = entities.set_marker(Marker::Start, self.start.map(coordinate));
        let _ = entities.set_marker(Marker::Goal, self.goal.map(coordinate));

        Ok(Level::from_parts(grid, entities, self.time_limit)?)
    }
}

fn glyph(tile: Tile) -> char {
    match tile {
        Tile::Wall => WALL_GLYPH,
        Tile::Floor => FLOOR_GLYPH,
    }
}

fn parse_glyph(glyph: char) -> Option<Tile> {
    match glyph {
        WALL_GLYPH => Some(Tile::Wall),
        FLOOR_GLYPH => Some(Tile::Floor),
        _ => None,
    }
}

fn pair(at: Coordinate) -> [i32; 2] {
    [at.x(), at.y()]
}

fn pairs(positions: &[Coordinate]) -> Vec<[i32; 2]> {
    positions.iter().copied().map(pair).collect()
}

fn coordinate([x, y]: [i32; 2]) -> Coordinate {
    Coordinate::new(x, y)
}
