//! Dense tile storage backing a level.

use wizard_dungeon_core::{Coordinate, FlipDirection, LevelError, Tile};

/// Row-major grid of tiles with fixed dimensions.
///
/// Storage never changes size once allocated; resizing produces a new grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid of the provided dimensions with every tile set to floor.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            tiles: vec![Tile::Floor; capacity],
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the grid holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Reports whether the coordinate addresses a tile inside the grid.
    #[must_use]
    pub fn contains(&self, at: Coordinate) -> bool {
        at.is_within(self.width, self.height)
    }

    /// Reads the tile stored at the coordinate.
    pub fn tile(&self, at: Coordinate) -> Result<Tile, LevelError> {
        let index = self.index(at).ok_or_else(|| self.out_of_bounds(at))?;
        Ok(self.tiles[index])
    }

    /// Overwrites the tile stored at the coordinate.
    pub fn set_tile(&mut self, at: Coordinate, tile: Tile) -> Result<(), LevelError> {
        let index = self.index(at).ok_or_else(|| self.out_of_bounds(at))?;
        self.tiles[index] = tile;
        Ok(())
    }

    /// Counts the tiles matching the provided type.
    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|candidate| **candidate == tile).count()
    }

    /// Iterates over the grid one row at a time, top row first.
    ///
    /// Always yields `height` rows; each is empty when the grid has no columns.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        (0..height).map(move |row| {
            let start = row * width;
            self.tiles.get(start..start + width).unwrap_or(&[])
        })
    }

    /// Produces a grid of new dimensions that keeps every overlapping tile.
    ///
    /// Cells exposed by growth are floor. An empty source skips the copy
    /// entirely and yields a fresh all-floor grid.
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let mut next = Self::new(width, height);
        if self.is_empty() || next.is_empty() {
            return next;
        }

        let kept_columns = usize::try_from(self.width.min(width)).unwrap_or(0);
        let kept_rows = usize::try_from(self.height.min(height)).unwrap_or(0);
        let old_width = usize::try_from(self.width).unwrap_or(0);
        let new_width = usize::try_from(width).unwrap_or(0);

        for row in 0..kept_rows {
            let source = &self.tiles[row * old_width..row * old_width + kept_columns];
            next.tiles[row * new_width..row * new_width + kept_columns].copy_from_slice(source);
        }

        next
    }

    /// Mirrors the grid in place along the provided axis.
    pub fn flip(&mut self, direction: FlipDirection) {
        let width = usize::try_from(self.width).unwrap_or(0);
        if width == 0 {
            return;
        }

        match direction {
            FlipDirection::Horizontal => {
                for row in self.tiles.chunks_mut(width) {
                    row.reverse();
                }
            }
            FlipDirection::Vertical => {
                let rows: Vec<&[Tile]> = self.tiles.chunks(width).rev().collect();
                self.tiles = rows.concat();
            }
        }
    }

    fn index(&self, at: Coordinate) -> Option<usize> {
        if self.contains(at) {
            let row = usize::try_from(at.y()).ok()?;
            let column = usize::try_from(at.x()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn out_of_bounds(&self, at: Coordinate) -> LevelError {
        LevelError::OutOfBounds {
            at,
            width: self.width,
            height: self.height,
        }
    }
}

/// Maps a coordinate onto its mirror image within a `width` by `height` grid.
pub(crate) fn mirror(
    at: Coordinate,
    direction: FlipDirection,
    width: u32,
    height: u32,
) -> Coordinate {
    match direction {
        FlipDirection::Horizontal => Coordinate::new(last_index(width) - at.x(), at.y()),
        FlipDirection::Vertical => Coordinate::new(at.x(), last_index(height) - at.y()),
    }
}

fn last_index(extent: u32) -> i32 {
    i32::try_from(extent).unwrap_or(i32::MAX).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_all_floor() {
        let grid = TileGrid::new(4, 3);
        assert_eq!(grid.count(Tile::Floor), 12);
        assert_eq!(grid.count(Tile::Wall), 0);
    }

    #[test]
    fn rows_follow_height_even_without_columns() {
        let grid = TileGrid::new(0, 3);
        let rows: Vec<&[Tile]> = grid.rows().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.is_empty()));

        assert_eq!(TileGrid::new(4, 0).rows().count(), 0);

        let mut grid = TileGrid::new(2, 2);
        grid.set_tile(Coordinate::new(1, 1), Tile::Wall).expect("in bounds");
        let rows: Vec<&[Tile]> = grid.rows().collect();
        assert_eq!(rows[0], [Tile::Floor, Tile::Floor]);
        assert_eq!(rows[1], [Tile::Floor, Tile::Wall]);
    }

    #[test]
    fn read_after_write_returns_written_tile() {
        let mut grid = TileGrid::new(3, 3);
        let at = Coordinate::new(2, 1);
        grid.set_tile(at, Tile::Wall).expect("in bounds");
        assert_eq!(grid.tile(at), Ok(Tile::Wall));
        assert_eq!(grid.tile(Coordinate::new(1, 2)), Ok(Tile::Floor));
    }

    #[test]
    fn out_of_bounds_access_is_rejected() {
        let mut grid = TileGrid::new(2, 2);
        for at in [
            Coordinate::new(2, 0),
            Coordinate::new(0, 2),
            Coordinate::new(-1, 0),
            Coordinate::new(0, -1),
        ] {
            assert_eq!(
                grid.tile(at),
                Err(LevelError::OutOfBounds {
                    at,
                    width: 2,
                    height: 2
                })
            );
            assert!(grid.set_tile(at, Tile::Wall).is_err());
        }
        assert_eq!(grid.count(Tile::Wall), 0);
    }

    #[test]
    fn resized_keeps_overlap_and_fills_growth_with_floor() {
        let mut grid = TileGrid::new(2, 2);
        grid.set_tile(Coordinate::new(0, 0), Tile::Wall).expect("in bounds");
        grid.set_tile(Coordinate::new(1, 1), Tile::Wall).expect("in bounds");

        let grown = grid.resized(3, 4);
        assert_eq!(grown.width(), 3);
        assert_eq!(grown.height(), 4);
        assert_eq!(grown.tile(Coordinate::new(0, 0)), Ok(Tile::Wall));
        assert_eq!(grown.tile(Coordinate::new(1, 1)), Ok(Tile::Wall));
        assert_eq!(grown.count(Tile::Wall), 2);
        assert_eq!(grown.count(Tile::Floor), 10);

        let shrunk = grown.resized(1, 1);
        assert_eq!(shrunk.tile(Coordinate::new(0, 0)), Ok(Tile::Wall));
        assert_eq!(shrunk.count(Tile::Floor), 0);
    }

    #[test]
    fn resized_to_zero_is_empty() {
        let grid = TileGrid::new(3, 3).resized(0, 0);
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 0);
    }

    #[test]
    fn flip_mirrors_rows_and_columns() {
        let mut grid = TileGrid::new(3, 2);
        grid.set_tile(Coordinate::new(0, 0), Tile::Wall).expect("in bounds");

        grid.flip(FlipDirection::Horizontal);
        assert_eq!(grid.tile(Coordinate::new(2, 0)), Ok(Tile::Wall));

        grid.flip(FlipDirection::Vertical);
        assert_eq!(grid.tile(Coordinate::new(2, 1)), Ok(Tile::Wall));
        assert_eq!(grid.count(Tile::Wall), 1);
    }

    #[test]
    fn mirror_matches_grid_flip() {
        let at = Coordinate::new(1, 0);
        assert_eq!(
            mirror(at, FlipDirection::Horizontal, 4, 3),
            Coordinate::new(2, 0)
        );
        assert_eq!(
            mirror(at, FlipDirection::Vertical, 4, 3),
            Coordinate::new(1, 2)
        );
    }
}
