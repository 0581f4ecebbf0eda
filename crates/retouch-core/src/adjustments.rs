//! Colour adjustment filters.
//!
//! Implements the canvas filter chain used by the editor:
//!
//! ```text
//! brightness(B%) contrast(C%) blur(Rpx) saturate(S%) invert(I)
//! ```
//!
//! with CSS Filter Effects semantics:
//!
//! 1. Brightness: `v * B/100`
//! 2. Contrast: `(v - 0.5) * C/100 + 0.5`
//! 3. Blur: Gaussian with standard deviation `R`
//! 4. Saturate: the CSS saturate colour matrix with `s = S/100`
//! 5. Invert: `1 - v` when enabled
//!
//! Filters act on straight (non-premultiplied) RGB. Alpha passes through.
//! An identity descriptor touches no pixel, so default parameters give a
//! result identical to an unfiltered draw.

use std::fmt;

use image::RgbaImage;

use crate::AdjustmentParameters;

/// Rec. 709 luma weights used by the CSS saturate matrix.
const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

/// Blur radii below this are not worth a Gaussian pass.
const MIN_BLUR_RADIUS: f32 = 0.01;

/// The composite filter for one surface: adjustment percentages plus a blur
/// radius already scaled to that surface's resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterDescriptor {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    /// Gaussian standard deviation in pixels of the target surface.
    pub blur_radius: f32,
    pub invert: bool,
}

impl Default for FilterDescriptor {
    fn default() -> Self {
        Self::from_params(&AdjustmentParameters::default())
    }
}

impl FilterDescriptor {
    /// Descriptor for the preview surface itself (blur unscaled).
    pub fn from_params(params: &AdjustmentParameters) -> Self {
        let params = params.sanitized();
        Self {
            brightness: params.brightness,
            contrast: params.contrast,
            saturation: params.saturation,
            blur_radius: params.blur,
            invert: params.invert,
        }
    }

    /// Descriptor for a target surface, scaling blur from preview units.
    ///
    /// Dimensions are read on every call: surfaces change size after crops
    /// and rotations, so the ratio can never be cached.
    pub fn for_surface(
        params: &AdjustmentParameters,
        target: (u32, u32),
        preview: (u32, u32),
    ) -> Self {
        let mut descriptor = Self::from_params(params);
        descriptor.blur_radius =
            clamp_blur(descriptor.blur_radius * blur_scale(target, preview), target);
        descriptor
    }

    /// True if applying this descriptor would leave every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        self.is_tone_identity()
            && self.blur_radius < MIN_BLUR_RADIUS
            && self.saturation == 100.0
            && !self.invert
    }

    fn is_tone_identity(&self) -> bool {
        self.brightness == 100.0 && self.contrast == 100.0
    }

    fn is_colour_identity(&self) -> bool {
        self.saturation == 100.0 && !self.invert
    }
}

impl fmt::Display for FilterDescriptor {
    /// Renders the CSS `filter` string for this descriptor.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "brightness({}%) contrast({}%) blur({}px) saturate({}%) invert({})",
            self.brightness,
            self.contrast,
            self.blur_radius,
            self.saturation,
            u8::from(self.invert)
        )
    }
}

/// Ratio between the short edge of `target` and the short edge of `preview`.
///
/// A blur of `r` preview pixels must be rendered as `r * blur_scale` pixels on
/// the target to look the same once both are shown at the same size.
pub fn blur_scale(target: (u32, u32), preview: (u32, u32)) -> f32 {
    let preview_min = preview.0.min(preview.1);
    if preview_min == 0 {
        return 1.0;
    }
    target.0.min(target.1) as f32 / preview_min as f32
}

/// Limit a blur radius to what can be rendered on a surface of `dims`.
///
/// A Gaussian wider than the surface's long edge is already a flat average,
/// so larger radii are capped there. Non-finite radii disable the blur.
fn clamp_blur(radius: f32, dims: (u32, u32)) -> f32 {
    if !radius.is_finite() || radius <= 0.0 {
        return 0.0;
    }
    radius.min(dims.0.max(dims.1) as f32)
}

/// Apply a filter descriptor to an RGBA image in place.
pub fn apply_filter(image: &mut RgbaImage, descriptor: &FilterDescriptor) {
    if descriptor.is_identity() {
        return;
    }

    if !descriptor.is_tone_identity() {
        let lut = tone_lut(descriptor.brightness, descriptor.contrast);
        for px in image.pixels_mut() {
            px.0[0] = lut[px.0[0] as usize];
            px.0[1] = lut[px.0[1] as usize];
            px.0[2] = lut[px.0[2] as usize];
        }
    }

    let blur_radius = clamp_blur(descriptor.blur_radius, image.dimensions());
    if blur_radius >= MIN_BLUR_RADIUS {
        *image = image::imageops::blur(image, blur_radius);
    }

    if !descriptor.is_colour_identity() {
        let s = descriptor.saturation / 100.0;
        for px in image.pixels_mut() {
            let [r, g, b, a] = px.0;
            let (r, g, b) = saturate(to_unit(r), to_unit(g), to_unit(b), s);
            let (r, g, b) = if descriptor.invert {
                (1.0 - r, 1.0 - g, 1.0 - b)
            } else {
                (r, g, b)
            };
            px.0 = [to_byte(r), to_byte(g), to_byte(b), a];
        }
    }
}

/// Lookup table for brightness followed by contrast.
///
/// Both act on each channel independently, so the pair collapses into a
/// single 256-entry table.
fn tone_lut(brightness: f32, contrast: f32) -> [u8; 256] {
    let b = brightness / 100.0;
    let c = contrast / 100.0;
    let mut lut = [0u8; 256];
    for (i, out) in lut.iter_mut().enumerate() {
        let v = (to_unit(i as u8) * b).clamp(0.0, 1.0);
        *out = to_byte((v - 0.5) * c + 0.5);
    }
    lut
}

/// CSS `saturate()` colour matrix.
#[inline]
fn saturate(r: f32, g: f32, b: f32, s: f32) -> (f32, f32, f32) {
    (
        (LUMA_R + (1.0 - LUMA_R) * s) * r + (LUMA_G - LUMA_G * s) * g + (LUMA_B - LUMA_B * s) * b,
        (LUMA_R - LUMA_R * s) * r + (LUMA_G + (1.0 - LUMA_G) * s) * g + (LUMA_B - LUMA_B * s) * b,
        (LUMA_R - LUMA_R * s) * r + (LUMA_G - LUMA_G * s) * g + (LUMA_B + (1.0 - LUMA_B) * s) * b,
    )
}

#[inline]
fn to_unit(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
