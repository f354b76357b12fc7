//! Text-safe vertical segmentation of the composite page.
//!
//! Rendering stages cannot digest a multi-megapixel page in one piece, so the
//! page is split into height-bounded chunks. A split line must never pass
//! through a detected region: the planner scans backward from the height cap
//! for the largest cut that clears every region's margin-expanded vertical
//! extent, and only when no such line exists does it force a cut at the cap.

use image::{RgbImage, imageops};

use crate::core::errors::PipelineError;
use crate::domain::region::Region;

/// Extra clearance above and below each region when testing split safety.
pub const DEFAULT_SPLIT_MARGIN: u32 = 20;

/// A contiguous vertical slice of the page.
#[derive(Clone)]
pub struct Chunk {
    /// The chunk pixels, spanning the full page width.
    pub image: RgbImage,
    /// Page-space Y of the chunk's first row. Region coordinates relative to
    /// this chunk are `region_y - top_offset`.
    pub top_offset: u32,
}

impl Chunk {
    /// Height of the chunk in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns true when the page-space coordinate `y` falls inside this chunk.
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top_offset as f32 && y < (self.top_offset + self.height()) as f32
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field(
                "image",
                &format_args!("RgbImage({}x{})", self.image.width(), self.image.height()),
            )
            .field("top_offset", &self.top_offset)
            .finish()
    }
}

/// The planned cut lines for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    /// Strictly increasing cut positions, starting at 0 and ending at the
    /// page height. Chunk `i` spans `[points[i], points[i + 1])`.
    pub points: Vec<u32>,
    /// Cut positions that had to be forced through a region because no safe
    /// line existed in range (a region taller than `max_height`).
    pub forced: Vec<u32>,
}

/// The materialized segmentation of one page.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Contiguous, non-overlapping chunks covering the page top to bottom.
    pub chunks: Vec<Chunk>,
    /// Forced cut positions carried over from the plan.
    pub forced_splits: Vec<u32>,
}

/// Plans split positions such that no cut falls strictly inside any region's
/// `[y_min - margin, y_max + margin]` interval.
///
/// The scan is greedy: for each chunk it takes the largest safe `y` not more
/// than `max_height` below the previous cut, which maximizes chunk size under
/// the cap. When nothing in range is safe, the cut is forced at the cap and
/// recorded in `forced`: a degraded result, not an error.
///
/// # Errors
///
/// Returns a configuration error when `max_height` is zero; the scan cannot
/// make forward progress without a positive cap.
pub fn plan_splits(
    page_height: u32,
    regions: &[Region],
    max_height: u32,
    margin: u32,
) -> Result<SplitPlan, PipelineError> {
    if max_height == 0 {
        return Err(PipelineError::invalid_field(
            "max_height",
            "a positive chunk height",
            "0",
        ));
    }

    // Margin-expanded exclusion intervals, one per region.
    let forbidden: Vec<(i64, i64)> = regions
        .iter()
        .map(|r| {
            (
                r.bbox.y_min() as i64 - margin as i64,
                r.bbox.y_max() as i64 + margin as i64,
            )
        })
        .collect();

    let is_safe = |y: u32| {
        let y = y as i64;
        !forbidden.iter().any(|&(lo, hi)| y > lo && y < hi)
    };

    let mut points: Vec<u32> = vec![0];
    let mut forced: Vec<u32> = Vec::new();
    let mut current_pos: u32 = 0;

    while current_pos < page_height {
        let max_safe_y = page_height.min(current_pos.saturating_add(max_height));

        // Largest safe y in (current_pos, max_safe_y], scanning backward.
        let best_split = match (current_pos + 1..=max_safe_y).rev().find(|&y| is_safe(y)) {
            Some(y) => y,
            None => {
                tracing::warn!(
                    at = max_safe_y,
                    "no text-safe split in range, cutting through a region"
                );
                forced.push(max_safe_y);
                max_safe_y
            }
        };

        points.push(best_split);
        current_pos = best_split;
    }

    Ok(SplitPlan { points, forced })
}

/// Splits the page into chunks along a text-safe plan.
///
/// Chunks are contiguous, non-overlapping, cover `[0, page_height)` exactly,
/// and each records its page-space `top_offset`.
pub fn segment_page(
    page: &RgbImage,
    regions: &[Region],
    max_height: u32,
    margin: u32,
) -> Result<Segmentation, PipelineError> {
    let plan = plan_splits(page.height(), regions, max_height, margin)?;

    let mut chunks = Vec::with_capacity(plan.points.len().saturating_sub(1));
    for window in plan.points.windows(2) {
        let (y_start, y_end) = (window[0], window[1]);
        let chunk = imageops::crop_imm(page, 0, y_start, page.width(), y_end - y_start).to_image();
        chunks.push(Chunk {
            image: chunk,
            top_offset: y_start,
        });
    }

    tracing::info!(chunks = chunks.len(), "page segmented");

    Ok(Segmentation {
        chunks,
        forced_splits: plan.forced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::region::RegionLabel;
    use crate::processors::geometry::Quad;

    fn region(ymin: i32, ymax: i32) -> Region {
        Region::new(
            Quad::from_rect(100, ymin, 300, ymax),
            RegionLabel::TextBubble,
            0.9,
            "page_00",
            0,
        )
    }

    #[test]
    fn test_split_avoids_region_near_cap() {
        // Cap at 400 lands inside the expanded interval (360, 440) of a
        // region spanning 380..420; the scan must back off to 360.
        let plan = plan_splits(1000, &[region(380, 420)], 400, 20).unwrap();

        assert_eq!(plan.points[0], 0);
        assert_eq!(plan.points[1], 360);
        assert!(plan.forced.is_empty());

        for &point in &plan.points[1..plan.points.len() - 1] {
            assert!(point <= 360 || point >= 440, "cut at {point} bisects region");
        }
        assert_eq!(*plan.points.last().unwrap(), 1000);
    }

    #[test]
    fn test_plan_covers_page_without_gaps() {
        let regions = vec![region(100, 150), region(500, 620), region(900, 950)];
        let plan = plan_splits(1200, &regions, 300, 20).unwrap();

        assert_eq!(plan.points[0], 0);
        assert_eq!(*plan.points.last().unwrap(), 1200);
        for window in plan.points.windows(2) {
            assert!(window[1] > window[0], "points not strictly increasing");
            assert!(window[1] - window[0] <= 300, "chunk taller than cap");
        }
    }

    #[test]
    fn test_oversized_region_forces_a_cut() {
        // One region taller than the cap: every candidate line is unsafe.
        let plan = plan_splits(1000, &[region(0, 990)], 400, 20).unwrap();

        assert!(!plan.forced.is_empty());
        assert_eq!(plan.forced[0], 400);
        assert_eq!(*plan.points.last().unwrap(), 1000);
    }

    #[test]
    fn test_zero_max_height_is_rejected() {
        let err = plan_splits(1000, &[], 0, 20).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError { .. }));
    }

    #[test]
    fn test_no_regions_splits_at_the_cap() {
        let plan = plan_splits(1000, &[], 400, 20).unwrap();
        assert_eq!(plan.points, vec![0, 400, 800, 1000]);
        assert!(plan.forced.is_empty());
    }

    #[test]
    fn test_segment_page_chunks_are_contiguous() {
        let page = RgbImage::from_pixel(200, 1000, image::Rgb([255, 255, 255]));
        let segmentation = segment_page(&page, &[region(380, 420)], 400, 20).unwrap();

        let chunks = &segmentation.chunks;
        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0].top_offset, 0);

        let mut expected_top = 0;
        let mut total = 0;
        for chunk in chunks {
            assert_eq!(chunk.top_offset, expected_top);
            assert_eq!(chunk.image.width(), 200);
            expected_top += chunk.height();
            total += chunk.height();
        }
        assert_eq!(total, 1000);
    }

    #[test]
    fn test_chunk_contains_y() {
        let chunk = Chunk {
            image: RgbImage::new(10, 100),
            top_offset: 50,
        };
        assert!(chunk.contains_y(50.0));
        assert!(chunk.contains_y(149.0));
        assert!(!chunk.contains_y(150.0));
        assert!(!chunk.contains_y(49.0));
    }
}
