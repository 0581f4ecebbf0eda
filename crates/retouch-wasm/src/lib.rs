//! Retouch WASM - WebAssembly bindings for the Retouch editor
//!
//! This crate exposes retouch-core to JavaScript/TypeScript hosts.
//!
//! # Module Structure
//!
//! - `session` - The editing session: geometry, colour redraws, export
//! - `adjustments` - Colour adjustment parameters and CSS filter strings
//! - `decode` - Source decoding and preview sizing
//! - `types` - WASM-compatible wrapper types
//! - `logging` - Forwards core log events to the browser console
//!
//! # Colour redraws
//!
//! Loading the source is asynchronous on the host, so a redraw is split in
//! two calls. `begin_adjustment` returns a generation number; once the host
//! has the source bytes it passes them to `complete_adjustment` with that
//! generation. Results of superseded generations are discarded.
//!
//! ```typescript
//! import init, { JsEditSession, Adjustments } from '@retouch/wasm';
//!
//! await init();
//! const session = new JsEditSession(bytes, url, 800, 600);
//!
//! const adj = new Adjustments();
//! adj.brightness = 120;
//! const generation = session.begin_adjustment(adj);
//! const source = new Uint8Array(await (await fetch(url)).arrayBuffer());
//! session.complete_adjustment(generation, source);
//! ```

use wasm_bindgen::prelude::*;

/// Log to the browser console.
#[cfg(target_arch = "wasm32")]
macro_rules! console_log {
    ($($arg:tt)*) => {
        web_sys::console::log_1(&format!($($arg)*).into())
    };
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! console_log {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            eprintln!($($arg)*);
        }
    };
}

pub(crate) use console_log;

mod adjustments;
mod decode;
mod logging;
mod session;
mod types;

pub use adjustments::{css_filter, Adjustments};
pub use decode::{decode_image, preview_dimensions};
pub use session::JsEditSession;
pub use types::{JsDecodedImage, JsSurfaceReport};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::install();
    console_log!("retouch-wasm {} ready", version());
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Map any displayable error onto a JS exception value.
pub(crate) fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
