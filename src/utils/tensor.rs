//! Pixel to tensor conversion for the detection collaborator.

use image::RgbImage;
use ndarray::Array4;

/// Converts an RGB image to a normalized NCHW float tensor with a leading
/// batch axis of one.
///
/// Pixel values are scaled to `[0, 1]`. This is the input layout the
/// detection model expects.
pub fn image_to_nchw(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            tensor[[0, channel, y as usize, x as usize]] = value as f32 / 255.0;
        }
    }

    tensor
}
