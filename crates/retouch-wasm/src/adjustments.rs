//! Colour adjustment WASM bindings.
//!
//! This module provides JavaScript bindings for the adjustment parameters,
//! allowing slider state to be manipulated from TypeScript.

use retouch_core::{AdjustmentParameters, FilterDescriptor};
use wasm_bindgen::prelude::*;

use crate::js_error;

/// Colour adjustment parameters for JavaScript
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustments {
    inner: AdjustmentParameters,
}

#[wasm_bindgen]
impl Adjustments {
    /// Create adjustments with neutral values
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: AdjustmentParameters::new(),
        }
    }

    /// Brightness percentage (100 = unchanged)
    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.brightness
    }

    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.brightness = value;
    }

    /// Contrast percentage (100 = unchanged)
    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.contrast = value;
    }

    /// Saturation percentage (100 = unchanged)
    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.saturation = value;
    }

    /// Blur radius in preview pixels
    #[wasm_bindgen(getter)]
    pub fn blur(&self) -> f32 {
        self.inner.blur
    }

    #[wasm_bindgen(setter)]
    pub fn set_blur(&mut self, value: f32) {
        self.inner.blur = value;
    }

    #[wasm_bindgen(getter)]
    pub fn invert(&self) -> bool {
        self.inner.invert
    }

    #[wasm_bindgen(setter)]
    pub fn set_invert(&mut self, value: bool) {
        self.inner.invert = value;
    }

    /// Check if all adjustments are at default values
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// Serialize to a plain object for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(js_error)
    }

    /// Deserialize from a plain object. Missing fields take their defaults.
    pub fn from_json(value: JsValue) -> Result<Adjustments, JsValue> {
        let inner: AdjustmentParameters = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
        Ok(Self { inner })
    }
}

impl Default for Adjustments {
    fn default() -> Self {
        Self::new()
    }
}

impl Adjustments {
    pub(crate) fn inner(&self) -> &AdjustmentParameters {
        &self.inner
    }
}

impl From<AdjustmentParameters> for Adjustments {
    fn from(inner: AdjustmentParameters) -> Self {
        Self { inner }
    }
}

/// CSS `filter` string for a surface of `target` size, with blur scaled
/// from the preview's size.
///
/// Lets a host preview adjustments with a canvas filter before the redraw
/// completes.
///
/// # Example (TypeScript)
///
/// ```typescript
/// ctx.filter = css_filter(adj, full.width, full.height, preview.width, preview.height);
/// ```
#[wasm_bindgen]
pub fn css_filter(
    adjustments: &Adjustments,
    target_width: u32,
    target_height: u32,
    preview_width: u32,
    preview_height: u32,
) -> String {
    FilterDescriptor::for_surface(
        adjustments.inner(),
        (target_width, target_height),
        (preview_width, preview_height),
    )
    .to_string()
}
