//! Resizing helpers used to size and draw the preview surface.
//!
//! All functions return new `DecodedImage` instances without modifying the input.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for a zero target dimension and
/// `DecodeError::CorruptedFile` if the pixel buffer does not match the
/// declared dimensions.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba_image = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbaImage".to_string()))?;

    let resized = image::imageops::resize(&rgba_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgba_image(resized))
}

/// Size of the preview surface for a source shown in a display area.
///
/// The result keeps the source aspect ratio, fits inside the display area,
/// never upscales, and is never smaller than 1x1.
pub fn preview_dimensions(source: (u32, u32), display: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = display;

    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }
    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let width = (src_w as f64 * scale).round() as u32;
    let height = (src_h as f64 * scale).round() as u32;

    (width.clamp(1, src_w), height.clamp(1, src_h))
}
