//! Source asset decoding.
//!
//! This module provides functionality for:
//! - Decoding the source asset (JPEG, PNG) to upright RGBA
//! - Sizing the preview surface to a display area
//! - Resizing decoded images
//!
//! Decoding is synchronous. The asynchronous part of loading a source, a
//! network fetch or a host-side read, belongs to the [`SourceLoader`]
//! implementation that calls into this module.
//!
//! [`SourceLoader`]: crate::pipeline::SourceLoader

mod resize;
mod source;
mod types;

pub use resize::{preview_dimensions, resize};
pub use source::decode_image;
pub use types::{DecodeError, DecodedImage, FilterType, Orientation, CHANNELS};
