//! Geometry transform engine: crop, rotate and flip on a single surface.
//!
//! Every operation mutates the surface in place and may change its
//! dimensions. None of them suspend, so two transforms issued in sequence
//! are strictly ordered.
//!
//! # Composition
//!
//! - flip ∘ flip along the same axis is the identity
//! - four 90° rotations are the identity
//! - crop is one-way: pixels outside the region are gone
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downwards
//! - Rotation angles are in degrees, positive = clockwise
//! - Crop regions are in pixels of the surface they are applied to

mod crop;
mod flip;
mod rotation;

use serde::{Deserialize, Serialize};

use crate::surface::Surface;

pub use crop::{crop, CropRegion, PreviewRect};
pub use flip::{flip, FlipAxis};
pub use rotation::{
    compute_rotated_bounds, normalize_angle, quarter_turns, rotate, InterpolationFilter,
};

/// One committed geometric operation, in the pixel space of the surface it
/// was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum GeometryOp {
    Crop { region: CropRegion },
    Rotate { degrees: f64 },
    Flip { axis: FlipAxis },
}

impl GeometryOp {
    /// Apply the operation to a surface.
    pub fn apply(&self, surface: &mut Surface, filter: InterpolationFilter) {
        match *self {
            GeometryOp::Crop { region } => {
                crop(surface, region);
            }
            GeometryOp::Rotate { degrees } => {
                rotate(surface, degrees, filter);
            }
            GeometryOp::Flip { axis } => flip(surface, axis),
        }
    }
}
