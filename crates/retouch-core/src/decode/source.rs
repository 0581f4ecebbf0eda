//! Source asset decoding with EXIF orientation handling.
//!
//! Browsers honour EXIF orientation when they load an image element, so the
//! source is decoded the same way: whatever format the bytes are in, the
//! result is upright RGBA.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{DecodeError, DecodedImage, Orientation};

/// Decode a source image (JPEG or PNG) from bytes, applying EXIF orientation.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognised.
/// Returns `DecodeError::CorruptedFile` if decoding fails part way.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = apply_orientation(img, orientation);
    Ok(DecodedImage::from_rgba_image(oriented.into_rgba8()))
}

/// Read the EXIF orientation tag. Missing or unreadable tags mean upright.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from_exif)
        .unwrap_or(Orientation::UPRIGHT)
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    let img = if orientation.is_mirrored() {
        img.fliph()
    } else {
        img
    };

    match orientation.quarter_turns() {
        1 => img.rotate90(),
        2 => img.rotate180(),
        3 => img.rotate270(),
        _ => img,
    }
}
