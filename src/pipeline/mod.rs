//! The page translation pipeline.
//!
//! [`ComicTranslator`] wires the geometry core to the three external
//! collaborators (detector, recognizer, translator) and drives one page
//! through the full flow: compose → tile → detect → consolidate → segment →
//! recognize → group → translate. Collaborators sit behind mutexes; only
//! per-unit preprocessing runs on the worker pool.

pub mod detect;
pub mod recognize;
pub mod result;
pub mod translate;

use std::sync::Mutex;

use image::RgbImage;

use crate::core::config::PipelineConfig;
use crate::core::errors::PipelineError;
use crate::domain::region::Region;
use crate::processors::compose::compose_vertical;
use crate::processors::consolidate::{
    merge_nearby_boxes, merge_overlapping_boxes, sort_reading_order,
};
use crate::processors::segment::segment_page;
use crate::processors::tiling::{Tile, TileGrid};

pub use detect::{RawDetection, TextAreaDetector};
pub use recognize::{RecognizedText, TextRecognizer};
pub use result::{PageResult, load_results, save_results};
pub use translate::Translator;

/// A configured translation pipeline.
///
/// The pipeline owns its collaborators for the duration of a run; each page's
/// region list is owned by the invocation processing that page and never
/// shared across pages.
pub struct ComicTranslator<D, R, T> {
    config: PipelineConfig,
    detector: Mutex<D>,
    recognizer: Mutex<R>,
    translator: Mutex<T>,
}

impl<D, R, T> ComicTranslator<D, R, T>
where
    D: TextAreaDetector,
    R: TextRecognizer,
    T: Translator,
{
    /// Creates a pipeline from validated configuration and collaborators.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when any config precondition fails.
    pub fn new(
        config: PipelineConfig,
        detector: D,
        recognizer: R,
        translator: T,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        if let Err(error) = config.parallel.install_global_thread_pool() {
            tracing::debug!(%error, "worker pool already installed");
        }

        Ok(Self {
            config,
            detector: Mutex::new(detector),
            recognizer: Mutex::new(recognizer),
            translator: Mutex::new(translator),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes one batch of consecutive source images.
    ///
    /// With page composition enabled the images are stacked into a single
    /// long page and one result is returned; otherwise each image is
    /// processed independently.
    pub fn run(
        &self,
        batch_name: &str,
        images: Vec<RgbImage>,
    ) -> Result<Vec<PageResult>, PipelineError> {
        if images.is_empty() {
            return Err(PipelineError::invalid_input(format!(
                "no images in batch '{batch_name}'"
            )));
        }

        if self.config.image_merge.enable {
            let page = compose_vertical(&images)?;
            Ok(vec![self.translate_page(batch_name, page)?])
        } else {
            images
                .into_iter()
                .enumerate()
                .map(|(i, image)| self.translate_page(&format!("{batch_name}_{i:02}"), image))
                .collect()
        }
    }

    /// Runs the full flow on one composite page.
    pub fn translate_page(
        &self,
        page_name: &str,
        page: RgbImage,
    ) -> Result<PageResult, PipelineError> {
        let (width, height) = page.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::invalid_input(format!(
                "page '{page_name}' has zero size ({width}x{height})"
            )));
        }

        tracing::info!(page = page_name, width, height, "translating page");

        let detection = &self.config.detection;
        let tile_width = detection.tile_width.resolve(width, detection.tile_height);
        let tiles: Vec<Tile> = TileGrid::new(
            &page,
            detection.tile_height,
            tile_width,
            detection.target_dim,
            detection.overlap_pixels(),
        )
        .collect();
        tracing::debug!(tiles = tiles.len(), "page tiled");

        let detections = detect::detect_on_tiles(
            &self.detector,
            &tiles,
            detection,
            &self.config.parallel,
            page_name,
        );
        drop(tiles);

        let regions = merge_overlapping_boxes(detections, detection.merge_threshold as f64);

        let segmentation = segment_page(
            &page,
            &regions,
            self.config.image_split.max_height,
            self.config.image_split.margin,
        )?;

        // Hand each region to the chunk that contains its vertical center.
        let mut by_chunk: Vec<Vec<Region>> = vec![Vec::new(); segmentation.chunks.len()];
        for mut region in regions {
            let chunk_index = segmentation
                .chunks
                .iter()
                .position(|chunk| chunk.contains_y(region.center_y))
                .unwrap_or(segmentation.chunks.len() - 1);
            region.image_name = format!("image_{chunk_index:02}");
            region.index = chunk_index;
            by_chunk[chunk_index].push(region);
        }

        let mut final_regions: Vec<Region> = Vec::new();
        for (chunk_index, chunk) in segmentation.chunks.iter().enumerate() {
            let assigned = std::mem::take(&mut by_chunk[chunk_index]);
            if assigned.is_empty() {
                continue;
            }

            let mut recognized = recognize::recognize_in_chunk(
                &self.recognizer,
                chunk,
                assigned,
                &detection.source_language,
                &self.config.ocr,
                &self.config.parallel,
            );

            sort_reading_order(&mut recognized);
            final_regions.extend(merge_nearby_boxes(
                recognized,
                self.config.ocr.merge_y_threshold,
                self.config.ocr.merge_x_threshold,
            ));
        }

        translate::translate_regions(
            &self.translator,
            &mut final_regions,
            &detection.source_language,
            &self.config.translation,
        );

        tracing::info!(
            page = page_name,
            regions = final_regions.len(),
            chunks = segmentation.chunks.len(),
            "page done"
        );

        Ok(PageResult {
            page_name: page_name.to_string(),
            regions: final_regions,
            chunks: segmentation.chunks,
            forced_splits: segmentation.forced_splits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PipelineConfig;
    use crate::processors::tiling::TileWidthSpec;
    use ndarray::Array4;

    /// Finds the bounding box of dark pixels in the tile tensor, the way a
    /// real detector would localize a text block.
    struct DarkBlockDetector;

    impl TextAreaDetector for DarkBlockDetector {
        fn detect(
            &mut self,
            input: &Array4<f32>,
            _target_size: (u32, u32),
        ) -> Result<Vec<RawDetection>, PipelineError> {
            let shape = input.shape();
            let (h, w) = (shape[2], shape[3]);

            let (mut xmin, mut ymin, mut xmax, mut ymax) = (w, h, 0usize, 0usize);
            for y in 0..h {
                for x in 0..w {
                    if input[[0, 0, y, x]] < 0.5 {
                        xmin = xmin.min(x);
                        ymin = ymin.min(y);
                        xmax = xmax.max(x);
                        ymax = ymax.max(y);
                    }
                }
            }

            if xmax < xmin {
                return Ok(Vec::new());
            }

            Ok(vec![
                RawDetection {
                    class_id: 1,
                    bbox: [xmin as f32, ymin as f32, xmax as f32 + 1.0, ymax as f32 + 1.0],
                    confidence: 0.95,
                },
                // Containing bubble outline, reported alongside the text.
                RawDetection {
                    class_id: 0,
                    bbox: [xmin as f32 - 2.0, ymin as f32 - 2.0, xmax as f32 + 3.0, ymax as f32 + 3.0],
                    confidence: 0.9,
                },
            ])
        }
    }

    struct FixedRecognizer(&'static str);

    impl TextRecognizer for FixedRecognizer {
        fn recognize(
            &mut self,
            _crop: &RgbImage,
            _source_language: &str,
        ) -> Result<RecognizedText, PipelineError> {
            Ok(RecognizedText {
                text: self.0.to_string(),
                confidence: 0.9,
            })
        }
    }

    struct EchoTranslator;

    impl Translator for EchoTranslator {
        fn translate(
            &mut self,
            texts: &[String],
            _source_language: &str,
            _target_language: &str,
            _model: &str,
        ) -> Result<Vec<String>, PipelineError> {
            Ok(texts.iter().map(|t| format!("[en] {t}")).collect())
        }
    }

    fn test_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.detection.tile_height = 640;
        config.detection.tile_width = TileWidthSpec::Pixels(640);
        config.detection.target_dim = 640;
        config.detection.overlap_ratio = 0.3;
        config.image_split.max_height = 400;
        config
    }

    /// A 640x1000 page with one dark text block at (100..200, 500..560).
    fn page_with_block() -> RgbImage {
        let mut page = RgbImage::from_pixel(640, 1000, image::Rgb([255, 255, 255]));
        for y in 500..560 {
            for x in 100..200 {
                page.put_pixel(x, y, image::Rgb([0, 0, 0]));
            }
        }
        page
    }

    #[test]
    fn test_full_page_flow() {
        let pipeline = ComicTranslator::new(
            test_config(),
            DarkBlockDetector,
            FixedRecognizer("こんにちは"),
            EchoTranslator,
        )
        .unwrap();

        let result = pipeline.translate_page("page_00", page_with_block()).unwrap();

        // Two overlapping tiles both saw the block; consolidation must leave
        // exactly one region with the page-space box.
        assert_eq!(result.regions.len(), 1);
        let region = &result.regions[0];
        assert_eq!(region.bbox.x_min(), 100);
        assert_eq!(region.bbox.y_min(), 500);
        assert_eq!(region.bbox.x_max(), 200);
        assert_eq!(region.bbox.y_max(), 560);
        assert_eq!(region.original_text, "こんにちは");
        assert_eq!(region.translated_text, "[en] こんにちは");

        // Chunks tile the page under the 400px cap without bisecting the
        // region (expanded extent 480..580).
        assert!(result.forced_splits.is_empty());
        let mut expected_top = 0;
        for chunk in &result.chunks {
            assert_eq!(chunk.top_offset, expected_top);
            assert!(chunk.height() <= 400);
            expected_top += chunk.height();

            let boundary = chunk.top_offset as i32;
            if boundary > 0 {
                assert!(boundary <= 480 || boundary >= 580);
            }
        }
        assert_eq!(expected_top, 1000);

        // The region belongs to the chunk that contains its center.
        let owner = &result.chunks[region.index];
        assert!(owner.contains_y(region.center_y));
        assert_eq!(region.image_name, format!("image_{:02}", region.index));
    }

    #[test]
    fn test_run_without_composition_processes_pages_independently() {
        let mut config = test_config();
        config.image_merge.enable = false;

        let pipeline = ComicTranslator::new(
            config,
            DarkBlockDetector,
            FixedRecognizer("テスト"),
            EchoTranslator,
        )
        .unwrap();

        let blank = RgbImage::from_pixel(320, 240, image::Rgb([255, 255, 255]));
        let results = pipeline.run("chapter_01", vec![blank.clone(), blank]).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].page_name, "chapter_01_00");
        assert!(results[0].regions.is_empty());
        assert_eq!(results[0].chunks.len(), 1);
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let pipeline = ComicTranslator::new(
            test_config(),
            DarkBlockDetector,
            FixedRecognizer("x"),
            EchoTranslator,
        )
        .unwrap();

        let err = pipeline.run("chapter_01", Vec::new()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
    }

    #[test]
    fn test_zero_sized_page_is_rejected() {
        let pipeline = ComicTranslator::new(
            test_config(),
            DarkBlockDetector,
            FixedRecognizer("x"),
            EchoTranslator,
        )
        .unwrap();

        let err = pipeline
            .translate_page("page_00", RgbImage::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let mut config = test_config();
        config.image_split.max_height = 0;

        let result = ComicTranslator::new(
            config,
            DarkBlockDetector,
            FixedRecognizer("x"),
            EchoTranslator,
        );
        assert!(result.is_err());
    }
}
