//! Sliding-window tile generation for oversized pages.
//!
//! Long-strip comic pages routinely exceed the detection model's input size,
//! so the page is walked with a fixed-size overlapping window. Every tile is
//! cropped at full tile size (the window is clamped at the page edges rather
//! than shrunk), then resized to the model's square input dimension with the
//! inverse scale factors recorded for coordinate remapping.

use image::{RgbImage, imageops};
use serde::{Deserialize, Serialize};

/// Width of a detection tile, either literal pixels or a named sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileWidthSpec {
    /// Fixed width in pixels.
    Pixels(u32),
    /// Named sentinel width.
    Named(TileWidthSentinel),
}

/// Named tile width sentinels accepted in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileWidthSentinel {
    /// Use the full page width.
    Page,
    /// Use the tile height (square tiles).
    Square,
}

impl TileWidthSpec {
    /// Resolves to a concrete pixel width for the given page.
    pub fn resolve(&self, page_width: u32, tile_height: u32) -> u32 {
        match self {
            TileWidthSpec::Pixels(px) => *px,
            TileWidthSpec::Named(TileWidthSentinel::Page) => page_width,
            TileWidthSpec::Named(TileWidthSentinel::Square) => tile_height,
        }
    }
}

impl Default for TileWidthSpec {
    fn default() -> Self {
        TileWidthSpec::Named(TileWidthSentinel::Square)
    }
}

/// One detection tile: the (possibly resized) pixels plus the metadata needed
/// to map detections made on it back to page space.
///
/// `scale_x`/`scale_y` convert a coordinate in the resized tile's pixel space
/// back to the tile's pre-resize pixel space. A tile is created here, consumed
/// once by the detector, and discarded after remapping.
#[derive(Clone)]
pub struct Tile {
    /// Tile pixels at the model input size.
    pub image: RgbImage,
    /// Page-space Y of the tile origin.
    pub top_offset: u32,
    /// Page-space X of the tile origin.
    pub left_offset: u32,
    /// Horizontal resize factor (original tile width / resized width).
    pub scale_x: f32,
    /// Vertical resize factor (original tile height / resized height).
    pub scale_y: f32,
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field(
                "image",
                &format_args!("RgbImage({}x{})", self.image.width(), self.image.height()),
            )
            .field("top_offset", &self.top_offset)
            .field("left_offset", &self.left_offset)
            .field("scale_x", &self.scale_x)
            .field("scale_y", &self.scale_y)
            .finish()
    }
}

/// Lazy iterator over the sliding-window tiles of one page.
///
/// Walks top-to-bottom, left-to-right with stride `tile - overlap` (or the
/// full tile dimension when the overlap is not smaller than it). Window
/// positions are clamped so no tile exceeds the page; the trailing row and
/// column therefore overlap their neighbors more than `overlap` pixels.
/// A page smaller than one tile yields exactly one tile covering the page.
pub struct TileGrid<'a> {
    page: &'a RgbImage,
    tile_width: u32,
    tile_height: u32,
    crop_width: u32,
    crop_height: u32,
    target_dim: u32,
    stride_x: u32,
    stride_y: u32,
    top: u32,
    left: u32,
    done: bool,
}

impl<'a> TileGrid<'a> {
    /// Creates a tile iterator over `page`.
    ///
    /// # Arguments
    ///
    /// * `page` - The full composite page.
    /// * `tile_height` - Window height in pixels.
    /// * `tile_width` - Window width in pixels.
    /// * `target_dim` - The detection model's square input dimension.
    /// * `overlap` - Overlap between neighboring windows, in pixels.
    pub fn new(
        page: &'a RgbImage,
        tile_height: u32,
        tile_width: u32,
        target_dim: u32,
        overlap: u32,
    ) -> Self {
        let stride = |dim: u32| if overlap >= dim { dim } else { dim - overlap };

        Self {
            page,
            tile_width,
            tile_height,
            crop_width: tile_width.min(page.width()),
            crop_height: tile_height.min(page.height()),
            target_dim,
            stride_x: stride(tile_width),
            stride_y: stride(tile_height),
            top: 0,
            left: 0,
            done: page.width() == 0
                || page.height() == 0
                || tile_width == 0
                || tile_height == 0,
        }
    }

    fn cut(&self, effective_left: u32, effective_top: u32) -> Tile {
        let cropped = imageops::crop_imm(
            self.page,
            effective_left,
            effective_top,
            self.crop_width,
            self.crop_height,
        )
        .to_image();

        if self.crop_width == self.target_dim && self.crop_height == self.target_dim {
            return Tile {
                image: cropped,
                top_offset: effective_top,
                left_offset: effective_left,
                scale_x: 1.0,
                scale_y: 1.0,
            };
        }

        let filter = if self.crop_width > self.target_dim {
            imageops::FilterType::Triangle
        } else {
            imageops::FilterType::Lanczos3
        };
        let resized = imageops::resize(&cropped, self.target_dim, self.target_dim, filter);

        Tile {
            image: resized,
            top_offset: effective_top,
            left_offset: effective_left,
            scale_x: self.crop_width as f32 / self.target_dim as f32,
            scale_y: self.crop_height as f32 / self.target_dim as f32,
        }
    }
}

impl Iterator for TileGrid<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.done {
            return None;
        }

        let effective_top = self.top.min(self.page.height() - self.crop_height);
        let effective_left = self.left.min(self.page.width() - self.crop_width);
        let tile = self.cut(effective_left, effective_top);

        // Advance column-first; stop each axis once the window edge reaches
        // the page edge so the clamped trailing tile is emitted exactly once.
        if self.left as u64 + self.tile_width as u64 >= self.page.width() as u64 {
            self.left = 0;
            if self.top as u64 + self.tile_height as u64 >= self.page.height() as u64 {
                self.done = true;
            } else {
                self.top += self.stride_y;
            }
        } else {
            self.left += self.stride_x;
        }

        Some(tile)
    }
}
