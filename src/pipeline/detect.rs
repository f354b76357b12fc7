//! Text-area detection over tiles.
//!
//! The detection model itself is an external collaborator behind the
//! [`TextAreaDetector`] trait. This module owns the driving policy around it:
//! tensor preparation fans out across the worker pool, the inference call is
//! serialized behind a mutex (shared sessions are rarely safe to enter
//! concurrently), and results are collected in tile order because downstream
//! consolidation is order-dependent. A failed tile is logged and skipped, not
//! escalated.

use std::sync::Mutex;

use ndarray::Array4;
use rayon::prelude::*;

use crate::core::config::DetectionConfig;
use crate::core::errors::PipelineError;
use crate::core::parallel::ParallelPolicy;
use crate::domain::region::{Region, RegionLabel};
use crate::processors::remap::TileTransform;
use crate::processors::tiling::Tile;
use crate::utils::tensor::image_to_nchw;

/// One raw detection in the tile's model coordinate space.
#[derive(Debug, Clone)]
pub struct RawDetection {
    /// Numeric class id as reported by the model.
    pub class_id: u32,
    /// Model-space box as `[xmin, ymin, xmax, ymax]`.
    pub bbox: [f32; 4],
    /// Confidence score for this detection.
    pub confidence: f32,
}

/// The text-area detection collaborator.
///
/// `detect` receives one tile's normalized NCHW tensor plus the model input
/// size and returns the raw detections for that tile.
pub trait TextAreaDetector: Send {
    /// Runs detection on one prepared tile tensor.
    fn detect(
        &mut self,
        input: &Array4<f32>,
        target_size: (u32, u32),
    ) -> Result<Vec<RawDetection>, PipelineError>;
}

/// Runs detection across all tiles and returns page-space regions in tile
/// order, filtered to confident text classes.
pub(crate) fn detect_on_tiles<D: TextAreaDetector>(
    detector: &Mutex<D>,
    tiles: &[Tile],
    config: &DetectionConfig,
    policy: &ParallelPolicy,
    page_name: &str,
) -> Vec<Region> {
    let run_tile = |(tile_index, tile): (usize, &Tile)| -> Vec<Region> {
        // Tensor prep is the parallel part; the model call below is not.
        let tensor = image_to_nchw(&tile.image);
        let target_size = tile.image.dimensions();

        let outcome = {
            // A poisoned lock only means another tile's call panicked; the
            // session itself is still usable for the remaining tiles.
            let mut session = detector
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            session.detect(&tensor, target_size)
        };

        match outcome {
            Ok(raw) => remap_detections(raw, tile, config, page_name),
            Err(error) => {
                tracing::warn!(
                    tile = tile_index,
                    error = %error,
                    "detection failed for tile, skipping"
                );
                Vec::new()
            }
        }
    };

    let per_tile: Vec<Vec<Region>> = if policy.should_parallelize(tiles.len()) {
        tiles.par_iter().enumerate().map(run_tile).collect()
    } else {
        tiles.iter().enumerate().map(run_tile).collect()
    };

    let regions: Vec<Region> = per_tile.into_iter().flatten().collect();
    tracing::debug!(detections = regions.len(), "tiles detected");
    regions
}

fn remap_detections(
    raw: Vec<RawDetection>,
    tile: &Tile,
    config: &DetectionConfig,
    page_name: &str,
) -> Vec<Region> {
    let transform = TileTransform::for_tile(tile);

    raw.into_iter()
        .filter_map(|detection| {
            if detection.confidence < config.confidence_threshold {
                return None;
            }
            let label = RegionLabel::from_class_id(detection.class_id)?;
            if !label.is_text() {
                return None;
            }

            let bbox = transform.map_rect(detection.bbox);
            Some(Region::new(
                bbox,
                label,
                detection.confidence,
                page_name,
                0,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::geometry::Quad;
    use image::RgbImage;

    struct ScriptedDetector {
        per_call: Vec<Result<Vec<RawDetection>, PipelineError>>,
        calls: usize,
    }

    impl TextAreaDetector for ScriptedDetector {
        fn detect(
            &mut self,
            _input: &Array4<f32>,
            _target_size: (u32, u32),
        ) -> Result<Vec<RawDetection>, PipelineError> {
            let result = self.per_call.remove(0);
            self.calls += 1;
            result
        }
    }

    fn tile(top_offset: u32, left_offset: u32, scale: f32) -> Tile {
        Tile {
            image: RgbImage::new(8, 8),
            top_offset,
            left_offset,
            scale_x: scale,
            scale_y: scale,
        }
    }

    fn raw(class_id: u32, bbox: [f32; 4], confidence: f32) -> RawDetection {
        RawDetection {
            class_id,
            bbox,
            confidence,
        }
    }

    #[test]
    fn test_filters_and_remaps_detections() {
        let detector = Mutex::new(ScriptedDetector {
            per_call: vec![Ok(vec![
                raw(1, [1.0, 1.0, 3.0, 3.0], 0.9),
                // Bubble outline: dropped.
                raw(0, [1.0, 1.0, 3.0, 3.0], 0.9),
                // Under the confidence threshold: dropped.
                raw(2, [4.0, 4.0, 6.0, 6.0], 0.1),
                // Unknown class id: dropped.
                raw(7, [4.0, 4.0, 6.0, 6.0], 0.9),
            ])],
            calls: 0,
        });
        let tiles = vec![tile(100, 50, 2.0)];
        let config = DetectionConfig::default();

        let regions = detect_on_tiles(
            &detector,
            &tiles,
            &config,
            &ParallelPolicy::default(),
            "page_00",
        );

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bbox, Quad::from_rect(52, 102, 56, 106));
        assert_eq!(regions[0].label, RegionLabel::TextBubble);
        assert_eq!(regions[0].image_name, "page_00");
    }

    #[test]
    fn test_failed_tile_is_skipped_not_fatal() {
        let detector = Mutex::new(ScriptedDetector {
            per_call: vec![
                Ok(vec![raw(1, [0.0, 0.0, 2.0, 2.0], 0.9)]),
                Err(PipelineError::invalid_input("session hiccup")),
                Ok(vec![raw(1, [0.0, 0.0, 2.0, 2.0], 0.9)]),
            ],
            calls: 0,
        });
        let tiles = vec![tile(0, 0, 1.0), tile(100, 0, 1.0), tile(200, 0, 1.0)];
        let config = DetectionConfig::default();

        let regions = detect_on_tiles(
            &detector,
            &tiles,
            &config,
            // Sequential: the scripted results must line up with tile order.
            &ParallelPolicy::default().with_sequential_threshold(10),
            "page_00",
        );

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].bbox.y_min(), 0);
        assert_eq!(regions[1].bbox.y_min(), 200);
        assert_eq!(detector.lock().unwrap().calls, 3);
    }
}
