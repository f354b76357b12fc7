//! Vertical composition of source images into one page.
//!
//! Long-strip comics arrive as a directory of consecutive screens. They are
//! stacked into a single composite page so detection and segmentation can
//! reason about the whole strip at once. The page width is the most common
//! width among the inputs; odd-sized images are resized to it, preserving
//! aspect ratio.

use image::{Rgb, RgbImage, imageops};
use itertools::Itertools;

use crate::core::errors::PipelineError;

/// Stacks `images` vertically into a single white-backed page.
///
/// # Errors
///
/// Returns an invalid-input error when `images` is empty.
pub fn compose_vertical(images: &[RgbImage]) -> Result<RgbImage, PipelineError> {
    if images.is_empty() {
        return Err(PipelineError::invalid_input(
            "no images to compose into a page",
        ));
    }

    tracing::info!(count = images.len(), "composing images into one page");

    let counts = images.iter().map(|img| img.width()).counts();
    let page_width = counts
        .into_iter()
        .max_by_key(|&(width, count)| (count, width))
        .map(|(width, _)| width)
        .unwrap_or(0);

    if page_width == 0 {
        return Err(PipelineError::invalid_input("all images have zero width"));
    }

    // Resize stragglers to the page width before measuring total height.
    let mut scaled: Vec<std::borrow::Cow<'_, RgbImage>> = Vec::with_capacity(images.len());
    for img in images {
        if img.width() == page_width {
            scaled.push(std::borrow::Cow::Borrowed(img));
        } else {
            let new_height = ((img.height() as u64 * page_width as u64) / img.width() as u64)
                .max(1) as u32;
            let resized =
                imageops::resize(img, page_width, new_height, imageops::FilterType::Lanczos3);
            scaled.push(std::borrow::Cow::Owned(resized));
        }
    }

    let total_height: u32 = scaled.iter().map(|img| img.height()).sum();
    let mut page = RgbImage::from_pixel(page_width, total_height, Rgb([255, 255, 255]));

    let mut y_offset: i64 = 0;
    for img in &scaled {
        imageops::replace(&mut page, img.as_ref(), 0, y_offset);
        y_offset += img.height() as i64;
    }

    Ok(page)
}
