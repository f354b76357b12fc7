//! The geometry and partitioning core of the pipeline.
//!
//! This module holds the algorithmically dense part of the crate: tile
//! generation for oversized pages, coordinate remapping back to page space,
//! consolidation of duplicate and fragmented detections, text-safe page
//! segmentation, and page composition. Everything here is deterministic and
//! single-threaded; parallelism lives with the callers.

pub mod compose;
pub mod consolidate;
pub mod geometry;
pub mod remap;
pub mod segment;
pub mod tiling;

pub use compose::compose_vertical;
pub use consolidate::{merge_nearby_boxes, merge_overlapping_boxes, sort_reading_order};
pub use geometry::{Point, Quad};
pub use remap::TileTransform;
pub use segment::{Chunk, DEFAULT_SPLIT_MARGIN, Segmentation, SplitPlan, plan_splits, segment_page};
pub use tiling::{Tile, TileGrid, TileWidthSentinel, TileWidthSpec};
