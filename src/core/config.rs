//! Pipeline configuration.
//!
//! Configuration is loaded from a JSON file whose sections mirror the
//! pipeline stages: page composition, detection, page splitting, recognition,
//! and translation. Every field has a default so a partial file (or `{}`)
//! is valid; [`PipelineConfig::validate`] rejects precondition violations
//! before the pipeline runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::PipelineError;
use crate::core::parallel::ParallelPolicy;
use crate::processors::segment::DEFAULT_SPLIT_MARGIN;
use crate::processors::tiling::TileWidthSpec;

/// Page composition options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMergeConfig {
    /// Whether consecutive source images are stacked into one page before
    /// detection. When disabled, each image is processed on its own.
    #[serde(default = "default_true")]
    pub enable: bool,
}

impl Default for ImageMergeConfig {
    fn default() -> Self {
        Self { enable: true }
    }
}

/// Text-area detection options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Source language hint passed to the recognition collaborator.
    #[serde(default = "DetectionConfig::default_source_language")]
    pub source_language: String,

    /// Detections scoring below this are dropped before consolidation.
    #[serde(default = "DetectionConfig::default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Detection tile height in pixels.
    #[serde(default = "DetectionConfig::default_tile_height")]
    pub tile_height: u32,

    /// Detection tile width: pixels, `"page"`, or `"square"`.
    #[serde(default)]
    pub tile_width: TileWidthSpec,

    /// The detection model's square input dimension.
    #[serde(default = "DetectionConfig::default_target_dim")]
    pub target_dim: u32,

    /// Tile overlap as a fraction of the tile height.
    #[serde(default = "DetectionConfig::default_overlap_ratio")]
    pub overlap_ratio: f32,

    /// IoU above which two detections are treated as the same region.
    #[serde(default = "DetectionConfig::default_merge_threshold")]
    pub merge_threshold: f32,
}

impl DetectionConfig {
    /// Tile overlap in pixels.
    pub fn overlap_pixels(&self) -> u32 {
        (self.tile_height as f32 * self.overlap_ratio) as u32
    }

    fn default_source_language() -> String {
        "ja".to_string()
    }

    fn default_confidence_threshold() -> f32 {
        0.4
    }

    fn default_tile_height() -> u32 {
        1024
    }

    fn default_target_dim() -> u32 {
        640
    }

    fn default_overlap_ratio() -> f32 {
        0.1
    }

    fn default_merge_threshold() -> f32 {
        0.3
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            source_language: Self::default_source_language(),
            confidence_threshold: Self::default_confidence_threshold(),
            tile_height: Self::default_tile_height(),
            tile_width: TileWidthSpec::default(),
            target_dim: Self::default_target_dim(),
            overlap_ratio: Self::default_overlap_ratio(),
            merge_threshold: Self::default_merge_threshold(),
        }
    }
}

/// Safe-segmentation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSplitConfig {
    /// Maximum chunk height in pixels.
    #[serde(default = "ImageSplitConfig::default_max_height")]
    pub max_height: u32,

    /// Clearance kept between a cut line and any region.
    #[serde(default = "ImageSplitConfig::default_margin")]
    pub margin: u32,
}

impl ImageSplitConfig {
    fn default_max_height() -> u32 {
        10_000
    }

    fn default_margin() -> u32 {
        DEFAULT_SPLIT_MARGIN
    }
}

impl Default for ImageSplitConfig {
    fn default() -> Self {
        Self {
            max_height: Self::default_max_height(),
            margin: Self::default_margin(),
        }
    }
}

/// Crop upscaling options for the recognition stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpscaleConfig {
    /// Whether region crops are enlarged before recognition.
    #[serde(default)]
    pub enable: bool,

    /// Enlargement ratio.
    #[serde(default = "UpscaleConfig::default_ratio")]
    pub ratio: f32,
}

impl UpscaleConfig {
    /// The ratio to apply, or None when upscaling is disabled.
    pub fn effective_ratio(&self) -> Option<f32> {
        self.enable.then_some(self.ratio)
    }

    fn default_ratio() -> f32 {
        2.0
    }
}

impl Default for UpscaleConfig {
    fn default() -> Self {
        Self {
            enable: false,
            ratio: Self::default_ratio(),
        }
    }
}

/// Recognition options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Recognized texts scoring below this never reach translation.
    #[serde(default = "OcrConfig::default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Maximum vertical gap between lines grouped into one paragraph.
    #[serde(default = "OcrConfig::default_merge_threshold_px")]
    pub merge_y_threshold: i32,

    /// Maximum horizontal distance between line extents grouped together.
    #[serde(default = "OcrConfig::default_merge_threshold_px")]
    pub merge_x_threshold: i32,

    /// Crop upscaling before recognition.
    #[serde(default)]
    pub upscale: UpscaleConfig,
}

impl OcrConfig {
    fn default_confidence_threshold() -> f32 {
        0.6
    }

    fn default_merge_threshold_px() -> i32 {
        30
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: Self::default_confidence_threshold(),
            merge_y_threshold: Self::default_merge_threshold_px(),
            merge_x_threshold: Self::default_merge_threshold_px(),
            upscale: UpscaleConfig::default(),
        }
    }
}

/// Translation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Target language code.
    #[serde(default = "TranslationConfig::default_target_language")]
    pub target_language: String,

    /// Backend model identifier, forwarded to the translator collaborator.
    #[serde(default = "TranslationConfig::default_model")]
    pub model: String,
}

impl TranslationConfig {
    fn default_target_language() -> String {
        "en".to_string()
    }

    fn default_model() -> String {
        "gemini-2.0-flash".to_string()
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: Self::default_target_language(),
            model: Self::default_model(),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Page composition options.
    #[serde(default)]
    pub image_merge: ImageMergeConfig,

    /// Text-area detection options.
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Safe-segmentation options.
    #[serde(default)]
    pub image_split: ImageSplitConfig,

    /// Recognition options.
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Translation options.
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Worker pool options.
    #[serde(default)]
    pub parallel: ParallelPolicy,
}

impl PipelineConfig {
    /// Loads configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Checks every precondition the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.detection.tile_height == 0 {
            return Err(PipelineError::invalid_field(
                "detection.tile_height",
                "a positive tile height",
                "0",
            ));
        }
        if let TileWidthSpec::Pixels(0) = self.detection.tile_width {
            return Err(PipelineError::invalid_field(
                "detection.tile_width",
                "a positive tile width",
                "0",
            ));
        }
        if self.detection.target_dim == 0 {
            return Err(PipelineError::invalid_field(
                "detection.target_dim",
                "a positive model input dimension",
                "0",
            ));
        }
        validate_unit_range(
            "detection.confidence_threshold",
            self.detection.confidence_threshold,
        )?;
        validate_unit_range("detection.merge_threshold", self.detection.merge_threshold)?;
        if !(0.0..1.0).contains(&self.detection.overlap_ratio) {
            return Err(PipelineError::invalid_field(
                "detection.overlap_ratio",
                "a fraction in [0, 1)",
                format!("{}", self.detection.overlap_ratio),
            ));
        }
        if self.image_split.max_height == 0 {
            return Err(PipelineError::invalid_field(
                "image_split.max_height",
                "a positive chunk height",
                "0",
            ));
        }
        validate_unit_range("ocr.confidence_threshold", self.ocr.confidence_threshold)?;
        if self.ocr.upscale.enable && self.ocr.upscale.ratio <= 0.0 {
            return Err(PipelineError::invalid_field(
                "ocr.upscale.ratio",
                "a positive ratio",
                format!("{}", self.ocr.upscale.ratio),
            ));
        }
        Ok(())
    }
}

fn validate_unit_range(field: &str, value: f32) -> Result<(), PipelineError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PipelineError::invalid_field(
            field,
            "a value in [0, 1]",
            format!("{value}"),
        ))
    }
}

fn default_true() -> bool {
    true
}
