//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::transform::InterpolationFilter;

/// Default JPEG export quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Default export MIME type.
pub const DEFAULT_EXPORT_MIME: &str = "image/jpeg";

/// Settings for one editing session.
///
/// Every field has a default, so hosts can pass a partial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Resampling for rotations that are not multiples of 90°. The same
    /// filter is used on both surfaces.
    pub rotation_filter: InterpolationFilter,
    /// JPEG quality for export (1-100).
    pub jpeg_quality: u8,
    /// MIME type used when the host does not name one at export time.
    pub export_mime: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            rotation_filter: InterpolationFilter::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            export_mime: DEFAULT_EXPORT_MIME.to_string(),
        }
    }
}

impl EditorConfig {
    /// JPEG quality clamped to the encoder's accepted range.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.rotation_filter, InterpolationFilter::Bilinear);
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!(config.export_mime, "image/jpeg");
    }

    #[test]
    fn test_jpeg_quality_clamped() {
        let mut config = EditorConfig::default();
        config.jpeg_quality = 0;
        assert_eq!(config.jpeg_quality(), 1);
        config.jpeg_quality = 255;
        assert_eq!(config.jpeg_quality(), 100);
    }
}
