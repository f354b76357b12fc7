//! Utility functions for the translation pipeline.
//!
//! This module provides the image and tensor helpers used around the
//! pipeline core: region cropping for recognition, model input conversion,
//! and logging setup.

pub mod crop;
pub mod logging;
pub mod tensor;

pub use crop::crop_region;
pub use logging::init_tracing;
pub use tensor::image_to_nchw;
