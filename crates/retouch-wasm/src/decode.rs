//! Source decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! const [w, h] = preview_dimensions(image.width, image.height, 800, 600);
//! ```

use retouch_core::decode;
use wasm_bindgen::prelude::*;

use crate::js_error;
use crate::types::JsDecodedImage;

/// Decode JPEG or PNG bytes to upright RGBA.
///
/// EXIF orientation is applied, so the result is displayed as-is.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the data is corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Size of the preview surface for a source shown in a display area.
///
/// Returns `[width, height]`. The aspect ratio is kept and the source is
/// never upscaled.
#[wasm_bindgen]
pub fn preview_dimensions(
    source_width: u32,
    source_height: u32,
    display_width: u32,
    display_height: u32,
) -> Vec<u32> {
    let (w, h) = decode::preview_dimensions(
        (source_width, source_height),
        (display_width, display_height),
    );
    vec![w, h]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![200u8; (width * height * 4) as usize];
        retouch_core::encode::encode_png(&pixels, width, height).unwrap()
    }

    #[test]
    fn test_decode_image_png() {
        let image = decode_image(&png_bytes(6, 4)).unwrap();
        assert_eq!(image.width(), 6);
        assert_eq!(image.height(), 4);
        assert_eq!(image.byte_length(), 6 * 4 * 4);
    }

    #[test]
    fn test_preview_dimensions() {
        assert_eq!(preview_dimensions(2000, 1000, 500, 400), vec![500, 250]);
        assert_eq!(preview_dimensions(100, 50, 800, 600), vec![100, 50]);
    }
}
