//! Conversion between canvas pixels and tile coordinates.

use glam::Vec2;
use wizard_dungeon_core::Coordinate;

/// Fixed square tile size used to map canvas pixels onto the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileMetrics {
    tile_size: u32,
}

impl TileMetrics {
    /// Creates metrics for square tiles of `tile_size` pixels.
    ///
    /// A zero size is clamped to one pixel.
    #[must_use]
    pub const fn new(tile_size: u32) -> Self {
        Self {
            tile_size: if tile_size == 0 { 1 } else { tile_size },
        }
    }

    /// Edge length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Pixel position of the tile's upper-left corner.
    #[must_use]
    pub fn pixel_origin(&self, at: Coordinate) -> Vec2 {
        let size = self.tile_size as f32;
        Vec2::new(at.x() as f32 * size, at.y() as f32 * size)
    }

    /// Tile containing the pixel, or `None` for pixels left of or above the canvas.
    #[must_use]
    pub fn tile_at(&self, pixel: Vec2) -> Option<Coordinate> {
        if !pixel.is_finite() || pixel.x < 0.0 || pixel.y < 0.0 {
            return None;
        }

        let tile = (pixel / self.tile_size as f32).floor();
        if tile.x > i32::MAX as f32 || tile.y > i32::MAX as f32 {
            return None;
        }
        Some(Coordinate::new(tile.x as i32, tile.y as i32))
    }
}
