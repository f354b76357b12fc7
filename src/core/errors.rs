//! Core error types for the translation pipeline.
//!
//! This module defines the crate-wide error enum and the stage discriminants
//! used to attribute failures to a pipeline phase or an external collaborator.

use thiserror::Error;

/// Enum representing different stages of processing in the translation pipeline.
///
/// This enum is used to identify which stage of the pipeline an error occurred
/// in, providing context for debugging and error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred while composing source images into one page.
    Composition,
    /// Error occurred while slicing the page into detection tiles.
    Tiling,
    /// Error occurred while remapping tile coordinates to page space.
    Remapping,
    /// Error occurred while consolidating detections into regions.
    Consolidation,
    /// Error occurred while splitting the page into chunks.
    Segmentation,
    /// Error occurred while cropping a region or chunk.
    Cropping,
    /// Error occurred while converting pixels to a model input tensor.
    TensorConversion,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Composition => write!(f, "page composition"),
            ProcessingStage::Tiling => write!(f, "tiling"),
            ProcessingStage::Remapping => write!(f, "coordinate remapping"),
            ProcessingStage::Consolidation => write!(f, "box consolidation"),
            ProcessingStage::Segmentation => write!(f, "safe segmentation"),
            ProcessingStage::Cropping => write!(f, "cropping"),
            ProcessingStage::TensorConversion => write!(f, "tensor conversion"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// External collaborators the pipeline delegates model work to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorStage {
    /// The text-area detection model.
    Detection,
    /// The text recognition (OCR) engine.
    Recognition,
    /// The translation backend.
    Translation,
}

impl std::fmt::Display for CollaboratorStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollaboratorStage::Detection => write!(f, "detection"),
            CollaboratorStage::Recognition => write!(f, "recognition"),
            CollaboratorStage::Translation => write!(f, "translation"),
        }
    }
}

/// Enum representing the errors that can occur in the translation pipeline.
///
/// Geometry operations never produce errors for degenerate input; the
/// variants here cover structural failures (unreadable images, zero-sized
/// pages), configuration problems, and collaborator call failures.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error occurred while loading or decoding an image.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Error occurred during a pipeline processing stage.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error reported by an external collaborator (detector/recognizer/translator).
    #[error("{stage} collaborator failed: {context}")]
    Collaborator {
        /// Which collaborator failed.
        stage: CollaboratorStage,
        /// Additional context about the failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization error.
    #[error("json")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Creates an invalid-input error from a message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error for invalid field values.
    ///
    /// # Arguments
    ///
    /// * `field` - The name of the field with an invalid value
    /// * `expected` - Description of what was expected
    /// * `actual` - Description of what was actually provided
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ConfigError {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual.into()
            ),
        }
    }

    /// Wraps an error that occurred during a processing stage.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Wraps an error reported by an external collaborator.
    pub fn collaborator(
        stage: CollaboratorStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Collaborator {
            stage,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a collaborator error from a bare message, for backends whose
    /// native errors do not implement `std::error::Error`.
    pub fn collaborator_msg(stage: CollaboratorStage, context: impl Into<String>) -> Self {
        Self::Collaborator {
            stage,
            context: context.into(),
            source: Box::new(std::io::Error::other("collaborator failure")),
        }
    }
}
