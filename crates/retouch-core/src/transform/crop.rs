//! Surface cropping.
//!
//! Two region types exist:
//!
//! - [`CropRegion`] is in integer pixels of the surface it is applied to.
//! - [`PreviewRect`] is a fractional rectangle taken from pointer input on
//!   the preview surface. It has to be projected onto each surface before
//!   it can be applied, because the full and preview surfaces almost never
//!   share dimensions.
//!
//! Cropping copies pixel values exactly. No interpolation is involved.

use serde::{Deserialize, Serialize};

use crate::decode::CHANNELS;
use crate::surface::Surface;

/// A crop rectangle in the pixel space of one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamp the region into a `width x height` surface.
    ///
    /// The origin is pulled inside the surface, the far edge is cut at the
    /// surface edge, and the result is always at least 1x1.
    pub fn clamp_to(self, width: u32, height: u32) -> CropRegion {
        let (width, height) = (width.max(1), height.max(1));

        let x = self.x.min(width - 1);
        let y = self.y.min(height - 1);
        let right = x.saturating_add(self.width).min(width);
        let bottom = y.saturating_add(self.height).min(height);

        CropRegion {
            x,
            y,
            width: right.saturating_sub(x).max(1),
            height: bottom.saturating_sub(y).max(1),
        }
    }

    /// True if the region covers the whole `width x height` surface.
    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width && self.height == height
    }
}

/// A crop rectangle in preview-surface coordinates, as produced by a pointer
/// drag. Values may be fractional, negative, or reach outside the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PreviewRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Project the rectangle from a surface of size `from` onto a surface of
    /// size `to`, scaling each axis by `to / from`, and clamp the result.
    ///
    /// Edges are rounded independently so adjacent crops tile without gaps.
    /// Negative extents (a drag towards the origin) are normalized first.
    pub fn project(&self, from: (u32, u32), to: (u32, u32)) -> CropRegion {
        let sx = to.0 as f64 / from.0.max(1) as f64;
        let sy = to.1 as f64 / from.1.max(1) as f64;

        let (left, right) = scaled_span(self.x, self.width, sx, to.0);
        let (top, bottom) = scaled_span(self.y, self.height, sy, to.1);

        CropRegion::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top))
            .clamp_to(to.0, to.1)
    }
}

/// Scale a 1-D span and clamp both ends into `0..=limit`.
fn scaled_span(start: f64, extent: f64, scale: f64, limit: u32) -> (u32, u32) {
    let start = finite_or_zero(start);
    let extent = finite_or_zero(extent);
    let (lo, hi) = if extent < 0.0 {
        (start + extent, start)
    } else {
        (start, start + extent)
    };

    let to_px = |v: f64| (v * scale).round().clamp(0.0, limit as f64) as u32;
    (to_px(lo), to_px(hi))
}

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Crop a surface in place.
///
/// The region is clamped to the surface first. The surface is resized to the
/// region and the snapshot's sub-rectangle is copied to the origin.
///
/// Returns the region that was actually applied.
pub fn crop(surface: &mut Surface, region: CropRegion) -> CropRegion {
    let (src_w, src_h) = surface.dimensions();
    let region = region.clamp_to(src_w, src_h);

    if region.covers(src_w, src_h) {
        return region;
    }

    let snapshot = surface.clone();
    surface.resize_cleared(region.width, region.height);

    let row_len = region.width as usize * CHANNELS;
    for row in 0..region.height {
        let src = snapshot.index(region.x, region.y + row);
        let dst = surface.index(0, row);
        surface.pixels_mut()[dst..dst + row_len]
            .copy_from_slice(&snapshot.pixels()[src..src + row_len]);
    }

    region
}
