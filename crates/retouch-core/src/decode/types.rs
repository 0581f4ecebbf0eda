//! Types shared by the decoding functions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Why a source could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Neither JPEG nor PNG, or a zero target size.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// Recognised but unreadable (truncated, bad checksum, ...).
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// Resampling used when the source is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Smoothing disabled: every target pixel copies one source pixel.
    Nearest,
    #[default]
    Bilinear,
    Lanczos3,
}

impl FilterType {
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        use image::imageops::FilterType as Image;
        match self {
            FilterType::Nearest => Image::Nearest,
            FilterType::Bilinear => Image::Triangle,
            FilterType::Lanczos3 => Image::Lanczos3,
        }
    }
}

/// How stored pixels must be turned to appear upright, read from the EXIF
/// orientation tag.
///
/// Every one of the eight EXIF values is a horizontal mirror (or not)
/// followed by 0-3 clockwise quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    mirrored: bool,
    quarter_turns: u8,
}

impl Orientation {
    /// Already upright.
    pub const UPRIGHT: Orientation = Orientation {
        mirrored: false,
        quarter_turns: 0,
    };

    /// Map an EXIF orientation value. Out-of-range values are upright.
    pub fn from_exif(value: u32) -> Self {
        let (mirrored, quarter_turns) = match value {
            2 => (true, 0),
            3 => (false, 2),
            4 => (true, 2),
            5 => (true, 3),
            6 => (false, 1),
            7 => (true, 1),
            8 => (false, 3),
            _ => (false, 0),
        };
        Self {
            mirrored,
            quarter_turns,
        }
    }

    /// Mirror left to right before turning.
    pub fn is_mirrored(self) -> bool {
        self.mirrored
    }

    /// Clockwise quarter turns applied after the mirror.
    pub fn quarter_turns(self) -> u8 {
        self.quarter_turns
    }

    pub fn is_upright(self) -> bool {
        self == Self::UPRIGHT
    }
}

/// The decoded source asset: upright RGBA8 pixels.
///
/// Never mutated after decoding; every colour redraw reads from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * CHANNELS,
            "RGBA buffer does not match {width}x{height}"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Copy into an `image::RgbaImage`. `None` if the buffer length is wrong.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
