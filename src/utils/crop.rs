//! Region cropping for the recognition stage.

use image::{RgbImage, imageops};

use crate::core::errors::{PipelineError, ProcessingStage};
use crate::processors::geometry::Quad;

/// Crops one region out of an image, clamping the box to the image bounds.
///
/// An optional `upscale` ratio resizes the crop before recognition; small
/// source text recognizes noticeably better when enlarged first.
///
/// # Errors
///
/// Returns a cropping error when the clamped box has no area inside the
/// image (fully outside, or degenerate).
pub fn crop_region(
    image: &RgbImage,
    quad: &Quad,
    upscale: Option<f32>,
) -> Result<RgbImage, PipelineError> {
    let x1 = quad.x_min().max(0) as u32;
    let y1 = quad.y_min().max(0) as u32;
    let x2 = (quad.x_max().max(0) as u32).min(image.width());
    let y2 = (quad.y_max().max(0) as u32).min(image.height());

    if x2 <= x1 || y2 <= y1 {
        return Err(PipelineError::processing(
            ProcessingStage::Cropping,
            format!("empty crop region ({x1}, {y1}) to ({x2}, {y2})"),
            std::io::Error::other("region outside image bounds"),
        ));
    }

    let mut cropped = imageops::crop_imm(image, x1, y1, x2 - x1, y2 - y1).to_image();

    if let Some(ratio) = upscale
        && ratio > 0.0
        && (ratio - 1.0).abs() > f32::EPSILON
    {
        let new_width = ((cropped.width() as f32 * ratio) as u32).max(1);
        let new_height = ((cropped.height() as f32 * ratio) as u32).max(1);
        let filter = if ratio > 1.0 {
            imageops::FilterType::Lanczos3
        } else {
            imageops::FilterType::Triangle
        };
        cropped = imageops::resize(&cropped, new_width, new_height, filter);
    }

    Ok(cropped)
}
