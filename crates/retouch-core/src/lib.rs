//! Retouch Core - dual-surface photo editing pipeline
//!
//! This crate provides the transform and colour pipeline behind the Retouch
//! editor: geometric transforms kept in sync across a full-resolution and a
//! preview surface, and colour adjustments recomputed from the original
//! source asset without racing concurrent edits.

pub mod adjustments;
pub mod config;
pub mod decode;
pub mod encode;
pub mod pipeline;
pub mod session;
pub mod surface;
pub mod transform;

pub use adjustments::{apply_filter, blur_scale, FilterDescriptor};
pub use config::EditorConfig;
pub use pipeline::{apply_adjustments, reset, PipelineError, RedrawPlan, RedrawTicket, SourceLoader};
pub use session::{EditSession, SessionError, SurfaceOutcome, SurfaceReport};
pub use surface::{Surface, SurfaceKind};
pub use transform::{CropRegion, FlipAxis, GeometryOp, InterpolationFilter, PreviewRect};

/// Neutral value of the percentage adjustments.
pub const NEUTRAL_PERCENT: f32 = 100.0;

/// Colour adjustment parameters, the complete non-destructive edit state.
///
/// Always applied to the original source asset, never to an already filtered
/// surface, so repeated slider changes do not compound rounding error.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdjustmentParameters {
    /// Brightness percentage (100 = unchanged)
    pub brightness: f32,
    /// Contrast percentage (100 = unchanged)
    pub contrast: f32,
    /// Saturation percentage (100 = unchanged, 0 = greyscale)
    pub saturation: f32,
    /// Gaussian blur radius in preview pixels (0 = none)
    pub blur: f32,
    /// Invert all colour channels
    pub invert: bool,
}

impl Default for AdjustmentParameters {
    fn default() -> Self {
        Self {
            brightness: NEUTRAL_PERCENT,
            contrast: NEUTRAL_PERCENT,
            saturation: NEUTRAL_PERCENT,
            blur: 0.0,
            invert: false,
        }
    }
}

impl AdjustmentParameters {
    /// Create adjustment parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Copy with out-of-range input made safe.
    ///
    /// Non-finite values fall back to their default, negative percentages
    /// and radii become 0. Large values pass through.
    pub fn sanitized(&self) -> Self {
        fn percent(v: f32) -> f32 {
            if v.is_finite() {
                v.max(0.0)
            } else {
                NEUTRAL_PERCENT
            }
        }

        Self {
            brightness: percent(self.brightness),
            contrast: percent(self.contrast),
            saturation: percent(self.saturation),
            blur: if self.blur.is_finite() {
                self.blur.max(0.0)
            } else {
                0.0
            },
            invert: self.invert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_parameters_default() {
        let adj = AdjustmentParameters::new();
        assert!(adj.is_default());
        assert_eq!(adj.brightness, 100.0);
        assert_eq!(adj.contrast, 100.0);
        assert_eq!(adj.saturation, 100.0);
        assert_eq!(adj.blur, 0.0);
        assert!(!adj.invert);
    }

    #[test]
    fn test_adjustment_parameters_not_default() {
        let mut adj = AdjustmentParameters::new();
        adj.invert = true;
        assert!(!adj.is_default());
    }

    #[test]
    fn test_sanitized_passes_valid_values() {
        let adj = AdjustmentParameters {
            brightness: 250.0,
            contrast: 0.0,
            saturation: 42.5,
            blur: 10.0,
            invert: true,
        };
        assert_eq!(adj.sanitized(), adj);
    }

    #[test]
    fn test_sanitized_repairs_hostile_values() {
        let adj = AdjustmentParameters {
            brightness: -20.0,
            contrast: f32::NAN,
            saturation: f32::NEG_INFINITY,
            blur: f32::NAN,
            invert: false,
        };
        let clean = adj.sanitized();
        assert_eq!(clean.brightness, 0.0);
        assert_eq!(clean.contrast, 100.0);
        assert_eq!(clean.saturation, 100.0);
        assert_eq!(clean.blur, 0.0);
    }
}
