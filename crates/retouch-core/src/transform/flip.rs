//! Surface mirroring.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::CHANNELS;
use crate::surface::Surface;

/// Axis to mirror across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    /// Mirror left to right.
    Horizontal,
    /// Mirror top to bottom.
    Vertical,
}

impl FromStr for FlipAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(FlipAxis::Horizontal),
            "vertical" => Ok(FlipAxis::Vertical),
            other => Err(format!("unknown flip axis: {other:?}")),
        }
    }
}

/// Mirror a surface in place. Dimensions are unchanged.
pub fn flip(surface: &mut Surface, axis: FlipAxis) {
    let (width, height) = surface.dimensions();
    let row_len = width as usize * CHANNELS;
    let pixels = surface.pixels_mut();

    match axis {
        FlipAxis::Horizontal => {
            for row in pixels.chunks_exact_mut(row_len) {
                let (mut left, mut right) = (0usize, width as usize - 1);
                while left < right {
                    for c in 0..CHANNELS {
                        row.swap(left * CHANNELS + c, right * CHANNELS + c);
                    }
                    left += 1;
                    right -= 1;
                }
            }
        }
        FlipAxis::Vertical => {
            let height = height as usize;
            for top in 0..height / 2 {
                let bottom = height - 1 - top;
                let (upper, lower) = pixels.split_at_mut(bottom * row_len);
                upper[top * row_len..(top + 1) * row_len].swap_with_slice(&mut lower[..row_len]);
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Flipping twice along the same axis restores every pixel.
        #[test]
        fn prop_flip_involution(
            (width, height) in (1u32..=32, 1u32..=32),
            seed in any::<u8>(),
            horizontal in any::<bool>(),
        ) {
            let pixels = (0..(width * height * 4) as usize)
                .map(|i| (i as u8).wrapping_mul(17) ^ seed)
                .collect();
            let original = Surface::from_pixels(width, height, pixels).unwrap();
            let axis = if horizontal { FlipAxis::Horizontal } else { FlipAxis::Vertical };

            let mut surface = original.clone();
            flip(&mut surface, axis);
            flip(&mut surface, axis);

            prop_assert_eq!(surface, original);
        }
    }
}
