//! Text recognition over consolidated regions.
//!
//! Recognition runs per region, on a crop taken from the chunk that contains
//! the region. Crop preparation fans out across the worker pool while the
//! recognizer call is serialized behind a mutex, mirroring the detection
//! driver. Regions whose recognition fails, comes back empty, or scores
//! under the configured threshold are dropped before translation.

use std::sync::Mutex;

use image::RgbImage;
use rayon::prelude::*;

use crate::core::config::OcrConfig;
use crate::core::errors::PipelineError;
use crate::core::parallel::ParallelPolicy;
use crate::domain::region::Region;
use crate::processors::segment::Chunk;
use crate::utils::crop::crop_region;

/// Recognizer noise token emitted on blank or undecipherable crops.
const ELLIPSIS_NOISE: &str = "．．．";

/// One recognition result.
#[derive(Debug, Clone)]
pub struct RecognizedText {
    /// The recognized text.
    pub text: String,
    /// Confidence for the whole crop.
    pub confidence: f32,
}

/// The text recognition (OCR) collaborator.
pub trait TextRecognizer: Send {
    /// Recognizes the text in one region crop.
    fn recognize(
        &mut self,
        crop: &RgbImage,
        source_language: &str,
    ) -> Result<RecognizedText, PipelineError>;
}

/// Recognizes every region assigned to `chunk`, filling `original_text` and
/// `text_confidence`. Returns the regions that produced usable text.
pub(crate) fn recognize_in_chunk<R: TextRecognizer>(
    recognizer: &Mutex<R>,
    chunk: &Chunk,
    regions: Vec<Region>,
    source_language: &str,
    config: &OcrConfig,
    policy: &ParallelPolicy,
) -> Vec<Region> {
    let upscale = config.upscale.effective_ratio();

    let run_region = |mut region: Region| -> Option<Region> {
        // Region boxes are page-space; the chunk starts at its top_offset.
        let local_bbox = region.bbox.translate(0, -(chunk.top_offset as i32));
        let crop = match crop_region(&chunk.image, &local_bbox, upscale) {
            Ok(crop) => crop,
            Err(error) => {
                tracing::warn!(
                    chunk = %region.image_name,
                    error = %error,
                    "failed to crop region, skipping"
                );
                return None;
            }
        };

        let outcome = {
            let mut session = recognizer
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            session.recognize(&crop, source_language)
        };

        let recognized = match outcome {
            Ok(recognized) => recognized,
            Err(error) => {
                tracing::warn!(
                    chunk = %region.image_name,
                    error = %error,
                    "recognition failed for region, skipping"
                );
                return None;
            }
        };

        let text = recognized.text.trim();
        if text.is_empty() || text == ELLIPSIS_NOISE {
            return None;
        }
        if recognized.confidence < config.confidence_threshold {
            tracing::debug!(
                confidence = recognized.confidence,
                "recognition below threshold, dropping region"
            );
            return None;
        }

        region.original_text = text.to_string();
        region.text_confidence = recognized.confidence;
        Some(region)
    };

    let recognized: Vec<Region> = if policy.should_parallelize(regions.len()) {
        regions.into_par_iter().filter_map(run_region).collect()
    } else {
        regions.into_iter().filter_map(run_region).collect()
    };

    tracing::debug!(texts = recognized.len(), "chunk recognized");
    recognized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::region::RegionLabel;
    use crate::processors::geometry::Quad;

    struct ScriptedRecognizer {
        per_call: Vec<Result<RecognizedText, PipelineError>>,
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn recognize(
            &mut self,
            _crop: &RgbImage,
            _source_language: &str,
        ) -> Result<RecognizedText, PipelineError> {
            self.per_call.remove(0)
        }
    }

    fn chunk(top_offset: u32) -> Chunk {
        Chunk {
            image: RgbImage::from_pixel(200, 200, image::Rgb([255, 255, 255])),
            top_offset,
        }
    }

    fn region(ymin: i32, ymax: i32) -> Region {
        Region::new(
            Quad::from_rect(10, ymin, 100, ymax),
            RegionLabel::TextBubble,
            0.9,
            "image_00",
            0,
        )
    }

    fn ok(text: &str, confidence: f32) -> Result<RecognizedText, PipelineError> {
        Ok(RecognizedText {
            text: text.to_string(),
            confidence,
        })
    }

    fn sequential() -> ParallelPolicy {
        ParallelPolicy::default().with_sequential_threshold(100)
    }

    #[test]
    fn test_fills_text_fields() {
        let recognizer = Mutex::new(ScriptedRecognizer {
            per_call: vec![ok("こんにちは", 0.92)],
        });
        let out = recognize_in_chunk(
            &recognizer,
            &chunk(100),
            vec![region(120, 160)],
            "ja",
            &OcrConfig::default(),
            &sequential(),
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].original_text, "こんにちは");
        assert_eq!(out[0].text_confidence, 0.92);
    }

    #[test]
    fn test_drops_noise_and_low_confidence() {
        let recognizer = Mutex::new(ScriptedRecognizer {
            per_call: vec![
                ok("．．．", 0.95),
                ok("  ", 0.95),
                ok("quiet", 0.2),
                ok("keep me", 0.95),
            ],
        });
        let regions = vec![
            region(0, 20),
            region(30, 50),
            region(60, 80),
            region(90, 110),
        ];
        let out = recognize_in_chunk(
            &recognizer,
            &chunk(0),
            regions,
            "ja",
            &OcrConfig::default(),
            &sequential(),
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].original_text, "keep me");
    }

    #[test]
    fn test_recognizer_error_skips_only_that_region() {
        let recognizer = Mutex::new(ScriptedRecognizer {
            per_call: vec![
                Err(PipelineError::invalid_input("model crashed")),
                ok("survivor", 0.9),
            ],
        });
        let out = recognize_in_chunk(
            &recognizer,
            &chunk(0),
            vec![region(0, 20), region(30, 50)],
            "ja",
            &OcrConfig::default(),
            &sequential(),
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].original_text, "survivor");
    }

    #[test]
    fn test_region_outside_chunk_is_skipped() {
        // Box far below the 200px chunk: the clamped crop is empty.
        let recognizer = Mutex::new(ScriptedRecognizer {
            per_call: vec![ok("unreachable", 0.9)],
        });
        let out = recognize_in_chunk(
            &recognizer,
            &chunk(0),
            vec![region(500, 550)],
            "ja",
            &OcrConfig::default(),
            &sequential(),
        );
        assert!(out.is_empty());
    }
}
