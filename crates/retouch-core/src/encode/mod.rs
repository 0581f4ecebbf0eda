//! Export service.
//!
//! Serializes a surface to an output byte format chosen by MIME type:
//! - `image/png`, lossless with alpha
//! - `image/jpeg`, with configurable quality
//!
//! Encoding is a single synchronous call with no state of its own.

mod export;

pub use export::{encode_jpeg, encode_png, export_surface, EncodeError, ExportFormat};
