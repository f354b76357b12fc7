//! Tile-space to page-space coordinate remapping.
//!
//! Detections come back in the coordinate space of a (possibly resized) tile.
//! The transform here undoes the resize and applies the tile's page offset in
//! one pass. The whole-image path uses the identity transform, so callers do
//! not branch on tiling mode at the geometry level.

use crate::processors::geometry::Quad;
use crate::processors::tiling::Tile;

/// The inverse transform from a tile's model coordinate space to page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTransform {
    /// Horizontal resize factor (original tile width / model input width).
    pub scale_x: f32,
    /// Vertical resize factor (original tile height / model input height).
    pub scale_y: f32,
    /// Page-space X of the tile origin.
    pub left_offset: i32,
    /// Page-space Y of the tile origin.
    pub top_offset: i32,
}

impl TileTransform {
    /// The identity transform, used for detections made on the whole page.
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        left_offset: 0,
        top_offset: 0,
    };

    /// Builds the transform for one generated tile.
    pub fn for_tile(tile: &Tile) -> Self {
        Self {
            scale_x: tile.scale_x,
            scale_y: tile.scale_y,
            left_offset: tile.left_offset as i32,
            top_offset: tile.top_offset as i32,
        }
    }

    /// Maps one model-space coordinate pair to page space.
    #[inline]
    pub fn map_point(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x * self.scale_x).round() as i32 + self.left_offset,
            (y * self.scale_y).round() as i32 + self.top_offset,
        )
    }

    /// Maps a model-space rectangle to a page-space quad, corner by corner.
    ///
    /// # Arguments
    ///
    /// * `rect` - The model-space box as `[xmin, ymin, xmax, ymax]`.
    pub fn map_rect(&self, rect: [f32; 4]) -> Quad {
        let [xmin, ymin, xmax, ymax] = rect;
        let (left, top) = self.map_point(xmin, ymin);
        let (right, bottom) = self.map_point(xmax, ymax);
        Quad::from_rect(left, top, right, bottom)
    }
}
