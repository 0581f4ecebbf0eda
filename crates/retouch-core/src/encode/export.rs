//! Surface export to PNG and JPEG.
//!
//! Mirrors canvas `toBlob`: PNG keeps the alpha channel, JPEG composites
//! the surface onto black, and an unsupported MIME type falls back to PNG.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

use crate::decode::CHANNELS;
use crate::surface::Surface;

/// Errors that can occur while encoding a surface.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder itself failed
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed {
        format: &'static str,
        reason: String,
    },
}

/// Output formats the export service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    /// Pick a format for a MIME type. Unknown types fall back to PNG.
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => ExportFormat::Jpeg,
            _ => ExportFormat::Png,
        }
    }

    /// The MIME type actually produced.
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Serialize a surface.
///
/// Returns `Ok(None)` when there is no surface to export, matching the
/// empty result a host gets from a canvas without a rendering context.
pub fn export_surface(
    surface: Option<&Surface>,
    mime: &str,
    jpeg_quality: u8,
) -> Result<Option<Vec<u8>>, EncodeError> {
    let Some(surface) = surface else {
        return Ok(None);
    };

    let (width, height) = surface.dimensions();
    let bytes = match ExportFormat::from_mime(mime) {
        ExportFormat::Png => encode_png(surface.pixels(), width, height)?,
        ExportFormat::Jpeg => {
            let rgb = flatten_onto_black(surface.pixels());
            encode_jpeg(&rgb, width, height, jpeg_quality)?
        }
    };

    Ok(Some(bytes))
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, CHANNELS)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "PNG",
            reason: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Encode RGB pixel data (3 bytes per pixel) to JPEG bytes.
///
/// Quality is clamped to 1-100.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, 3)?;

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            reason: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

fn validate(pixels: &[u8], width: u32, height: u32, channels: usize) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * channels;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Drop alpha by compositing each pixel over opaque black.
fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / CHANNELS * 3);
    for px in rgba.chunks_exact(CHANNELS) {
        let alpha = px[3] as u32;
        for &channel in &px[..3] {
            rgb.push(((channel as u32 * alpha + 127) / 255) as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey_surface(width: u32, height: u32) -> Surface {
        Surface::from_pixels(width, height, [128, 128, 128, 255].repeat((width * height) as usize))
            .unwrap()
    }

    #[test]
    fn test_export_missing_surface_is_empty() {
        let result = export_surface(None, "image/png", 90).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_export_png_magic_and_round_trip() {
        let mut surface = grey_surface(4, 3);
        surface.set_pixel(1, 1, [10, 20, 30, 40]);

        let bytes = export_surface(Some(&surface), "image/png", 90).unwrap().unwrap();
        assert_eq!(&bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(1, 1).0, [10, 20, 30, 40]);
    }

    #[test]
    fn test_export_jpeg_markers() {
        let surface = grey_surface(16, 16);
        let bytes = export_surface(Some(&surface), "image/jpeg", 90).unwrap().unwrap();

        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_unknown_mime_falls_back_to_png() {
        assert_eq!(ExportFormat::from_mime("image/webp"), ExportFormat::Png);
        assert_eq!(ExportFormat::from_mime(" IMAGE/JPEG "), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_mime("image/jpg").mime(), "image/jpeg");

        let bytes = export_surface(Some(&grey_surface(2, 2)), "image/bmp", 90)
            .unwrap()
            .unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_flatten_onto_black() {
        let rgb = flatten_onto_black(&[200, 100, 50, 255, 200, 100, 50, 0, 255, 255, 255, 128]);
        assert_eq!(rgb, vec![200, 100, 50, 0, 0, 0, 128, 128, 128]);
    }

    #[test]
    fn test_encode_jpeg_quality_affects_size() {
        let pixels: Vec<u8> = (0..64 * 64 * 3).map(|i| (i * 7 % 256) as u8).collect();
        let low = encode_jpeg(&pixels, 64, 64, 10).unwrap();
        let high = encode_jpeg(&pixels, 64, 64, 100).unwrap();
        assert!(high.len() > low.len());
    }

    #[test]
    fn test_encode_invalid_pixel_data() {
        let result = encode_png(&[0; 10], 2, 2);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidPixelData {
                expected: 16,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_encode_zero_dimensions() {
        assert!(matches!(
            encode_jpeg(&[], 0, 10, 90),
            Err(EncodeError::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_encode_error_display() {
        let err = EncodeError::InvalidDimensions {
            width: 0,
            height: 100,
        };
        assert_eq!(
            err.to_string(),
            "Invalid dimensions: width (0) and height (100) must be non-zero"
        );
    }
}
