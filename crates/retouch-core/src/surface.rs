//! Drawing surfaces.
//!
//! A [`Surface`] is a mutable RGBA raster with canvas semantics: resizing it
//! discards its content, and any area nothing has been drawn on is
//! transparent black.

use serde::{Deserialize, Serialize};

use crate::decode::CHANNELS;

/// Which of the two session surfaces an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Sized to the source asset; used for export.
    Full,
    /// Sized to the on-screen display area; receives pointer input.
    Preview,
}

impl SurfaceKind {
    /// Processing order for operations that touch both surfaces.
    pub const ALL: [SurfaceKind; 2] = [SurfaceKind::Full, SurfaceKind::Preview];

    pub fn as_str(self) -> &'static str {
        match self {
            SurfaceKind::Full => "full",
            SurfaceKind::Preview => "preview",
        }
    }
}

impl std::str::FromStr for SurfaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(SurfaceKind::Full),
            "preview" => Ok(SurfaceKind::Preview),
            other => Err(format!("unknown surface: {other:?}")),
        }
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutable RGBA8 raster buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a transparent surface. Zero dimensions are raised to 1.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            pixels: vec![0; buffer_len(width, height)],
        }
    }

    /// Wrap an existing pixel buffer. Returns `None` if the buffer length does
    /// not match the dimensions or a dimension is zero.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != buffer_len(width, height) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// RGBA pixel data in row-major order.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Read one pixel. Out-of-bounds reads return `None`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[idx..idx + CHANNELS]);
        Some(px)
    }

    /// Write one pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.pixels[idx..idx + CHANNELS].copy_from_slice(&value);
    }

    /// Resize the surface, clearing it to transparent like a canvas does.
    pub fn resize_cleared(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.pixels.clear();
        self.pixels.resize(buffer_len(self.width, self.height), 0);
    }

    /// Copy the content out as an `image::RgbaImage`.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Build a surface from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Option<Self> {
        let (width, height) = img.dimensions();
        Self::from_pixels(width, height, img.into_raw())
    }

    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

#[inline]
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}
