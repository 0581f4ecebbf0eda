//! Editing session WASM bindings.
//!
//! [`JsEditSession`] owns both surfaces in WASM memory. Geometry calls apply
//! synchronously. Colour redraws are split around the host's asynchronous
//! source fetch; see the crate docs.

use retouch_core::decode::{self, DecodedImage};
use retouch_core::{
    EditSession, EditorConfig, FlipAxis, PreviewRect, RedrawTicket, Surface, SurfaceKind,
    SurfaceOutcome, SurfaceReport,
};
use wasm_bindgen::prelude::*;

use crate::adjustments::Adjustments;
use crate::types::JsSurfaceReport;
use crate::{console_log, js_error};

/// An editing session over one source image.
#[wasm_bindgen]
pub struct JsEditSession {
    inner: EditSession,
    pending: Option<RedrawTicket>,
}

impl JsEditSession {
    fn open(
        source: &[u8],
        locator: String,
        display: (u32, u32),
        config: EditorConfig,
    ) -> Result<Self, String> {
        let decoded = decode::decode_image(source).map_err(|e| e.to_string())?;
        let inner =
            EditSession::open(config, locator, &decoded, display).map_err(|e| e.to_string())?;
        Ok(Self {
            inner,
            pending: None,
        })
    }

    fn surface(&self, kind: &str) -> Result<Option<&Surface>, String> {
        let kind: SurfaceKind = kind.parse()?;
        Ok(self.inner.surface(kind))
    }

    fn complete(&mut self, generation: u64, source: &[u8]) -> SurfaceReport {
        let Some(ticket) = self
            .pending
            .filter(|t| t.generation() == generation && self.inner.is_current(t))
        else {
            console_log!("discarding superseded redraw {}", generation);
            return SurfaceReport {
                full: SurfaceOutcome::Superseded,
                preview: SurfaceOutcome::Superseded,
            };
        };

        let decoded = match decode::decode_image(source) {
            Ok(decoded) => decoded,
            Err(e) => {
                console_log!("failed to decode source for redraw: {}", e);
                let outcome = SurfaceOutcome::Failed(e.to_string());
                return SurfaceReport {
                    full: outcome.clone(),
                    preview: outcome,
                };
            }
        };

        let mut report = SurfaceReport::default();
        for kind in SurfaceKind::ALL {
            report.set(kind, self.redraw(&ticket, kind, &decoded));
        }
        report
    }

    fn redraw(
        &mut self,
        ticket: &RedrawTicket,
        kind: SurfaceKind,
        source: &DecodedImage,
    ) -> SurfaceOutcome {
        let plan = match self.inner.plan_redraw(ticket, kind) {
            Ok(plan) => plan,
            Err(outcome) => return outcome,
        };
        match plan.render(source) {
            Ok(rendered) => self.inner.commit_redraw(&plan, rendered),
            Err(e) => SurfaceOutcome::Failed(e.to_string()),
        }
    }
}

#[wasm_bindgen]
impl JsEditSession {
    /// Open a session from encoded source bytes with the default settings.
    ///
    /// `locator` identifies the source (usually its URL) and is only used in
    /// diagnostics. The preview surface is fitted into the display area.
    #[wasm_bindgen(constructor)]
    pub fn new(
        source: &[u8],
        locator: String,
        display_width: u32,
        display_height: u32,
    ) -> Result<JsEditSession, JsValue> {
        Self::open(
            source,
            locator,
            (display_width, display_height),
            EditorConfig::default(),
        )
        .map_err(js_error)
    }

    /// Open a session with settings from a plain object, e.g.
    /// `{ rotationFilter: "lanczos3", jpegQuality: 85 }`.
    pub fn with_config(
        source: &[u8],
        locator: String,
        display_width: u32,
        display_height: u32,
        config: JsValue,
    ) -> Result<JsEditSession, JsValue> {
        let config: EditorConfig = serde_wasm_bindgen::from_value(config).map_err(js_error)?;
        Self::open(source, locator, (display_width, display_height), config).map_err(js_error)
    }

    /// Crop both surfaces to a rectangle in preview coordinates.
    pub fn crop_photo(&mut self, x: f64, y: f64, width: f64, height: f64) -> JsSurfaceReport {
        self.inner
            .crop_photo(PreviewRect::new(x, y, width, height))
            .into()
    }

    /// Rotate both surfaces clockwise by `degrees`.
    pub fn rotate_photo(&mut self, degrees: f64) -> JsSurfaceReport {
        self.inner.rotate_photo(degrees).into()
    }

    /// Mirror both surfaces. `axis` is `"horizontal"` or `"vertical"`.
    pub fn flip_photo(&mut self, axis: &str) -> Result<JsSurfaceReport, JsValue> {
        let axis: FlipAxis = axis.parse().map_err(js_error)?;
        Ok(self.inner.flip_photo(axis).into())
    }

    /// Start a colour redraw. Returns the generation to pass to
    /// `complete_adjustment`.
    pub fn begin_adjustment(&mut self, adjustments: &Adjustments) -> u64 {
        let ticket = self.inner.begin_adjustment(*adjustments.inner());
        self.pending = Some(ticket);
        ticket.generation()
    }

    /// Finish a colour redraw with freshly loaded source bytes.
    ///
    /// Stale generations are reported as `superseded` and change nothing.
    pub fn complete_adjustment(&mut self, generation: u64, source: &[u8]) -> JsSurfaceReport {
        self.complete(generation, source).into()
    }

    /// Drop all edits. Complete the returned generation to redraw both
    /// surfaces from the untouched source.
    pub fn reset(&mut self) -> u64 {
        let ticket = self.inner.reset();
        self.pending = Some(ticket);
        ticket.generation()
    }

    /// The latest adjustment generation
    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> u64 {
        self.inner.generation()
    }

    /// The most recently requested adjustments
    pub fn adjustments(&self) -> Adjustments {
        Adjustments::from(*self.inner.adjustments())
    }

    /// Width of a surface, or undefined if it is detached.
    pub fn surface_width(&self, kind: &str) -> Result<Option<u32>, JsValue> {
        Ok(self.surface(kind).map_err(js_error)?.map(Surface::width))
    }

    /// Height of a surface, or undefined if it is detached.
    pub fn surface_height(&self, kind: &str) -> Result<Option<u32>, JsValue> {
        Ok(self.surface(kind).map_err(js_error)?.map(Surface::height))
    }

    /// RGBA pixels of a surface. This copies the buffer.
    pub fn pixels(&self, kind: &str) -> Result<Option<Vec<u8>>, JsValue> {
        Ok(self
            .surface(kind)
            .map_err(js_error)?
            .map(|s| s.pixels().to_vec()))
    }

    /// RGBA pixels as a `Uint8ClampedArray`, ready for `new ImageData(...)`.
    pub fn image_data(&self, kind: &str) -> Result<Option<js_sys::Uint8ClampedArray>, JsValue> {
        Ok(self
            .surface(kind)
            .map_err(js_error)?
            .map(|s| js_sys::Uint8ClampedArray::from(s.pixels())))
    }

    /// Release a surface, e.g. when its canvas is unmounted. Later
    /// operations report it as `missing`.
    pub fn detach_surface(&mut self, kind: &str) -> Result<(), JsValue> {
        let kind: SurfaceKind = kind.parse().map_err(js_error)?;
        self.inner.detach(kind);
        Ok(())
    }

    /// Encode a surface. Uses the configured MIME type when `mime` is
    /// omitted; returns undefined for a detached surface.
    pub fn export(&self, kind: &str, mime: Option<String>) -> Result<Option<Vec<u8>>, JsValue> {
        let kind: SurfaceKind = kind.parse().map_err(js_error)?;
        self.inner.export(kind, mime.as_deref()).map_err(js_error)
    }

    /// MIME type `export` produces for `mime`, for labelling the Blob.
    /// Unsupported types report `image/png`.
    pub fn export_mime(&self, mime: Option<String>) -> String {
        self.inner.export_mime(mime.as_deref()).to_string()
    }
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png() -> Vec<u8> {
        retouch_core::encode::encode_png(&[90u8; 8 * 4 * 4], 8, 4).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_with_config_reads_partial_object() {
        let config = js_sys::Object::new();
        js_sys::Reflect::set(&config, &"exportMime".into(), &"image/png".into()).unwrap();

        let s = JsEditSession::with_config(&png(), "x".to_string(), 8, 8, config.into()).unwrap();
        let bytes = s.export("full", None).unwrap().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[wasm_bindgen_test]
    fn test_unknown_names_are_errors() {
        let mut s = JsEditSession::new(&png(), "x".to_string(), 8, 8).unwrap();
        assert!(s.flip_photo("diagonal").is_err());
        assert!(s.surface_width("thumbnail").is_err());
        assert!(s.image_data("full").unwrap().is_some());
    }
}
