//! WASM-compatible wrapper types.
//!
//! This module provides JavaScript-friendly types that wrap the core Retouch
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use retouch_core::decode::DecodedImage;
use retouch_core::{SurfaceOutcome, SurfaceReport};
use wasm_bindgen::prelude::*;

/// An upright RGBA image decoded in WASM memory.
///
/// `pixels()` copies the buffer out to a `Uint8Array`; keep the handle
/// around instead of calling it repeatedly.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create a new JsDecodedImage from dimensions and RGBA pixel data
    /// (4 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array. This copies the buffer.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Release the buffer now instead of waiting for the finalizer.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }
}

/// Per-surface outcome of a session operation.
///
/// Outcomes are one of `applied`, `missing`, `no-reference`, `superseded`
/// or `failed`.
#[wasm_bindgen]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsSurfaceReport {
    inner: SurfaceReport,
}

#[wasm_bindgen]
impl JsSurfaceReport {
    /// Outcome for the full-resolution surface
    #[wasm_bindgen(getter)]
    pub fn full(&self) -> String {
        self.inner.full.as_str().to_string()
    }

    /// Outcome for the preview surface
    #[wasm_bindgen(getter)]
    pub fn preview(&self) -> String {
        self.inner.preview.as_str().to_string()
    }

    /// True if both surfaces were updated
    pub fn all_applied(&self) -> bool {
        self.inner.all_applied()
    }

    /// Failure messages, one per failed surface
    pub fn failures(&self) -> Vec<String> {
        [&self.inner.full, &self.inner.preview]
            .into_iter()
            .filter_map(|outcome| match outcome {
                SurfaceOutcome::Failed(reason) => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }
}

impl From<SurfaceReport> for JsSurfaceReport {
    fn from(inner: SurfaceReport) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_decoded_image_creation() {
        let img = JsDecodedImage::new(100, 50, vec![0u8; 100 * 50 * 4]);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
    }

    #[test]
    fn test_from_decoded() {
        let decoded = DecodedImage::new(20, 10, vec![7u8; 20 * 10 * 4]);
        let js_img = JsDecodedImage::from_decoded(decoded);
        assert_eq!(js_img.width(), 20);
        assert_eq!(js_img.height(), 10);
        assert!(js_img.pixels().iter().all(|&b| b == 7));
    }

    #[test]
    fn test_report_strings() {
        let report = JsSurfaceReport::from(SurfaceReport {
            full: SurfaceOutcome::Failed("network error".to_string()),
            preview: SurfaceOutcome::NoReference,
        });
        assert_eq!(report.full(), "failed");
        assert_eq!(report.preview(), "no-reference");
        assert!(!report.all_applied());
        assert_eq!(report.failures(), vec!["network error".to_string()]);
    }
}
