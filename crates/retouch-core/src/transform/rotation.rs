//! Surface rotation.
//!
//! Multiples of 90° are exact pixel permutations: no resampling, no loss,
//! and four quarter turns restore the original surface. Any other angle
//! expands the surface to the rotated bounding box and resamples with one of
//! two interpolation methods:
//! - **Bilinear**: fast, the default for interactive editing
//! - **Lanczos3**: sharper, slower
//!
//! Angles are in degrees, positive = clockwise on screen (y axis pointing
//! down), matching canvas `rotate()`.
//!
//! # Algorithm
//!
//! Resampling uses inverse mapping: for each destination pixel centre we
//! find the source position it came from and interpolate there.
//!
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + src_cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + src_cy
//! ```
//!
//! Interpolation runs on premultiplied alpha so the transparent corners
//! introduced by the expanded canvas do not bleed dark fringes into the
//! image edges.

use serde::{Deserialize, Serialize};

use crate::surface::Surface;

/// Angles closer than this to a quarter turn are treated as exact.
const ANGLE_EPSILON: f64 = 0.001;

/// Interpolation filter for non-right-angle rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation.
    Lanczos3,
}

/// Normalize an angle into `[0, 360)`. Non-finite input becomes 0.
pub fn normalize_angle(angle_degrees: f64) -> f64 {
    if !angle_degrees.is_finite() {
        return 0.0;
    }
    let normalized = angle_degrees.rem_euclid(360.0);
    if (360.0 - normalized) < ANGLE_EPSILON {
        0.0
    } else {
        normalized
    }
}

/// If the angle is a multiple of 90°, the number of clockwise quarter turns
/// (0..=3) it represents.
pub fn quarter_turns(angle_degrees: f64) -> Option<u8> {
    let normalized = normalize_angle(angle_degrees);
    let turns = (normalized / 90.0).round();
    if (normalized - turns * 90.0).abs() < ANGLE_EPSILON {
        Some((turns as u8) % 4)
    } else {
        None
    }
}

/// Compute the dimensions of the bounding box for a rotated surface.
///
/// Quarter turns are exact (dimensions kept or swapped). Other angles use
/// `|w·cos| + |h·sin|` by `|w·sin| + |h·cos|`, rounded, at least 1x1.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match quarter_turns(angle_degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let angle_rad = normalize_angle(angle_degrees).to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate a surface in place about its centre.
///
/// Returns the normalized angle that was applied.
pub fn rotate(surface: &mut Surface, angle_degrees: f64, filter: InterpolationFilter) -> f64 {
    let angle = normalize_angle(angle_degrees);

    match quarter_turns(angle) {
        Some(0) => {}
        Some(turns) => rotate_quarter_turns(surface, turns),
        None => rotate_resampled(surface, angle, filter),
    }

    angle
}

/// Exact rotation by `turns` clockwise quarter turns.
fn rotate_quarter_turns(surface: &mut Surface, turns: u8) {
    let snapshot = surface.clone();
    let (w, h) = snapshot.dimensions();
    let (dst_w, dst_h) = if turns % 2 == 1 { (h, w) } else { (w, h) };

    surface.resize_cleared(dst_w, dst_h);

    for y in 0..h {
        for x in 0..w {
            let (dx, dy) = match turns {
                1 => (h - 1 - y, x),
                2 => (w - 1 - x, h - 1 - y),
                _ => (y, w - 1 - x),
            };
            if let Some(px) = snapshot.pixel(x, y) {
                surface.set_pixel(dx, dy, px);
            }
        }
    }
}

fn rotate_resampled(surface: &mut Surface, angle: f64, filter: InterpolationFilter) {
    let snapshot = surface.clone();
    let (src_w, src_h) = snapshot.dimensions();
    let (dst_w, dst_h) = compute_rotated_bounds(src_w, src_h, angle);

    let angle_rad = angle.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let src_cx = src_w as f64 / 2.0;
    let src_cy = src_h as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    surface.resize_cleared(dst_w, dst_h);

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            // Back to pixel-index space of the source.
            let src_x = dx * cos + dy * sin + src_cx - 0.5;
            let src_y = -dx * sin + dy * cos + src_cy - 0.5;

            let pixel = match filter {
                InterpolationFilter::Bilinear => sample_bilinear(&snapshot, src_x, src_y),
                InterpolationFilter::Lanczos3 => sample_lanczos3(&snapshot, src_x, src_y),
            };

            surface.set_pixel(dst_x, dst_y, pixel);
        }
    }
}

/// Premultiplied RGBA at integer coordinates; transparent outside the surface.
#[inline]
fn premultiplied(surface: &Surface, px: i64, py: i64) -> [f64; 4] {
    if px < 0 || py < 0 || px >= surface.width() as i64 || py >= surface.height() as i64 {
        return [0.0; 4];
    }
    match surface.pixel(px as u32, py as u32) {
        Some([r, g, b, a]) => {
            let alpha = a as f64 / 255.0;
            [r as f64 * alpha, g as f64 * alpha, b as f64 * alpha, a as f64]
        }
        None => [0.0; 4],
    }
}

/// Convert an accumulated premultiplied sample back to straight RGBA8.
fn unpremultiply(sum: [f64; 4]) -> [u8; 4] {
    let a = sum[3].clamp(0.0, 255.0);
    if a < 0.5 {
        return [0, 0, 0, 0];
    }
    let scale = 255.0 / a;
    [
        (sum[0] * scale).clamp(0.0, 255.0).round() as u8,
        (sum[1] * scale).clamp(0.0, 255.0).round() as u8,
        (sum[2] * scale).clamp(0.0, 255.0).round() as u8,
        a.round() as u8,
    ]
}

/// Sample a pixel using bilinear interpolation of the 4 nearest pixels.
fn sample_bilinear(surface: &Surface, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (surface.width() as f64, surface.height() as f64);
    if x <= -1.0 || y <= -1.0 || x >= w || y >= h {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = premultiplied(surface, x0, y0);
    let p10 = premultiplied(surface, x0 + 1, y0);
    let p01 = premultiplied(surface, x0, y0 + 1);
    let p11 = premultiplied(surface, x0 + 1, y0 + 1);

    let mut sum = [0.0f64; 4];
    for i in 0..4 {
        sum[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }

    unpremultiply(sum)
}

/// Sample a pixel using Lanczos3 interpolation over a 6x6 neighbourhood.
///
/// Falls back to bilinear within the kernel radius of the edges.
fn sample_lanczos3(surface: &Surface, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (surface.width() as i64, surface.height() as i64);

    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(surface, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;
            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);

            let pixel = premultiplied(surface, px, py);
            for i in 0..4 {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return [0, 0, 0, 0];
    }
    for v in sum.iter_mut() {
        *v /= weight_sum;
    }
    unpremultiply(sum)
}

/// Lanczos kernel: `sinc(x) * sinc(x/a)` for `|x| < a`, else 0.
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn create_surface(width: u32, height: u32, seed: u8) -> Surface {
        let pixels = (0..(width * height * 4) as usize)
            .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
            .collect();
        Surface::from_pixels(width, height, pixels).unwrap()
    }

    proptest! {
        /// Four quarter turns in either direction are the identity.
        #[test]
        fn prop_rotation_closure(
            (width, height) in (1u32..=24, 1u32..=24),
            seed in any::<u8>(),
            clockwise in any::<bool>(),
        ) {
            let original = create_surface(width, height, seed);
            let mut surface = original.clone();
            let step = if clockwise { 90.0 } else { -90.0 };
            for _ in 0..4 {
                rotate(&mut surface, step, InterpolationFilter::Bilinear);
            }
            prop_assert_eq!(surface, original);
        }

        /// A quarter turn followed by its inverse is the identity.
        #[test]
        fn prop_quarter_turn_inverse(
            (width, height) in (1u32..=24, 1u32..=24),
            seed in any::<u8>(),
            turns in 1u8..=3,
        ) {
            let original = create_surface(width, height, seed);
            let mut surface = original.clone();
            rotate(&mut surface, turns as f64 * 90.0, InterpolationFilter::Bilinear);
            rotate(&mut surface, -(turns as f64) * 90.0, InterpolationFilter::Bilinear);
            prop_assert_eq!(surface, original);
        }

        /// Resampled rotation always produces the computed bounds.
        #[test]
        fn prop_resampled_dimensions_match_bounds(
            (width, height) in (1u32..=30, 1u32..=30),
            angle in -720.0f64..720.0,
        ) {
            let mut surface = create_surface(width, height, 7);
            let expected = compute_rotated_bounds(width, height, angle);
            rotate(&mut surface, angle, InterpolationFilter::Bilinear);
            prop_assert_eq!(surface.dimensions(), expected);
        }
    }
}
