//! The editing session: owner of both surfaces.
//!
//! [`EditSession`] is the dual-surface coordinator. It applies every
//! geometric operation to the full and the preview surface so they keep
//! showing the same edit, projects preview-space crop rectangles into each
//! surface's own pixel space, and records the geometry each surface has
//! received so colour redraws can replay it.
//!
//! # Processing order
//!
//! Operations visit the full surface first, then the preview. Crop
//! projection reads the preview dimensions before either surface changes.
//!
//! # Missing surfaces
//!
//! A detached surface is skipped and reported as
//! [`SurfaceOutcome::Missing`]; the other surface is still processed.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::decode::{preview_dimensions, DecodedImage};
use crate::encode::{export_surface, EncodeError, ExportFormat};
use crate::pipeline::{draw_source, RedrawPlan, RedrawTicket};
use crate::surface::{Surface, SurfaceKind};
use crate::transform::{
    crop, flip, normalize_angle, quarter_turns, rotate, FlipAxis, GeometryOp, PreviewRect,
};
use crate::AdjustmentParameters;

/// Errors that prevent a session from opening.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The decoded source has no pixels.
    #[error("Source image is empty")]
    EmptySource,

    /// The display area has a zero dimension.
    #[error("Invalid display area: {width}x{height}")]
    InvalidDisplay { width: u32, height: u32 },

    /// The initial draw of the source failed.
    #[error("Failed to draw source: {0}")]
    Draw(#[from] crate::pipeline::PipelineError),
}

/// What happened to one surface during an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SurfaceOutcome {
    /// The operation was applied and committed.
    Applied,
    /// The surface is detached; nothing was done to it.
    #[default]
    Missing,
    /// The preview surface, needed to interpret the request, is detached.
    NoReference,
    /// A newer request or a geometric edit made this result stale, so it
    /// was discarded.
    Superseded,
    /// The operation failed; the surface keeps its previous content.
    Failed(String),
}

impl SurfaceOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SurfaceOutcome::Applied)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceOutcome::Applied => "applied",
            SurfaceOutcome::Missing => "missing",
            SurfaceOutcome::NoReference => "no-reference",
            SurfaceOutcome::Superseded => "superseded",
            SurfaceOutcome::Failed(_) => "failed",
        }
    }
}

/// Per-surface outcomes of one session operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SurfaceReport {
    pub full: SurfaceOutcome,
    pub preview: SurfaceOutcome,
}

impl SurfaceReport {
    pub fn get(&self, kind: SurfaceKind) -> &SurfaceOutcome {
        match kind {
            SurfaceKind::Full => &self.full,
            SurfaceKind::Preview => &self.preview,
        }
    }

    pub fn set(&mut self, kind: SurfaceKind, outcome: SurfaceOutcome) {
        match kind {
            SurfaceKind::Full => self.full = outcome,
            SurfaceKind::Preview => self.preview = outcome,
        }
    }

    /// True if both surfaces were updated.
    pub fn all_applied(&self) -> bool {
        self.full.is_applied() && self.preview.is_applied()
    }
}

/// Geometry a surface has received since the session opened or was reset.
///
/// Crop regions are stored in the pixel space of this surface, so replaying
/// them needs no projection.
///
/// Every colour redraw replays the whole list. Adjacent quarter turns are
/// merged and a repeated flip cancels out when recorded; arbitrary-angle
/// rotations are kept one by one, since each of them resamples and grows
/// the canvas.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryState {
    ops: Vec<GeometryOp>,
    rotation: f64,
    flipped_horizontal: bool,
    flipped_vertical: bool,
}

impl GeometryState {
    /// The committed operations, oldest first.
    pub fn ops(&self) -> &[GeometryOp] {
        &self.ops
    }

    /// Accumulated rotation in degrees, in `[0, 360)`.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Parity of horizontal flips.
    pub fn flipped_horizontal(&self) -> bool {
        self.flipped_horizontal
    }

    /// Parity of vertical flips.
    pub fn flipped_vertical(&self) -> bool {
        self.flipped_vertical
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn record(&mut self, op: GeometryOp) {
        match op {
            GeometryOp::Rotate { degrees } => {
                self.rotation = normalize_angle(self.rotation + degrees);
            }
            GeometryOp::Flip {
                axis: FlipAxis::Horizontal,
            } => self.flipped_horizontal = !self.flipped_horizontal,
            GeometryOp::Flip {
                axis: FlipAxis::Vertical,
            } => self.flipped_vertical = !self.flipped_vertical,
            GeometryOp::Crop { .. } => {}
        }
        self.push_folded(op);
    }

    fn push_folded(&mut self, op: GeometryOp) {
        let op = match op {
            GeometryOp::Rotate { degrees } => match quarter_turns(degrees) {
                Some(0) => return,
                Some(turns) => {
                    let previous = match self.ops.last() {
                        Some(GeometryOp::Rotate { degrees }) => quarter_turns(*degrees),
                        _ => None,
                    };
                    let turns = match previous {
                        Some(previous) => {
                            self.ops.pop();
                            (previous + turns) % 4
                        }
                        None => turns,
                    };
                    if turns == 0 {
                        return;
                    }
                    GeometryOp::Rotate {
                        degrees: f64::from(turns) * 90.0,
                    }
                }
                None => op,
            },
            GeometryOp::Flip { .. } if self.ops.last() == Some(&op) => {
                self.ops.pop();
                return;
            }
            _ => op,
        };
        self.ops.push(op);
    }
}

#[derive(Debug)]
struct SurfaceSlot {
    surface: Option<Surface>,
    /// Size the source is drawn at before geometry is replayed.
    base_dims: (u32, u32),
    geometry: GeometryState,
    /// Bumped whenever the geometry or the surface handle changes.
    revision: u64,
    /// A reset was requested but no redraw has committed it yet. The
    /// recorded geometry still describes the pixels until then.
    reset_pending: bool,
}

impl SurfaceSlot {
    fn new(surface: Surface) -> Self {
        Self {
            base_dims: surface.dimensions(),
            surface: Some(surface),
            geometry: GeometryState::default(),
            revision: 0,
            reset_pending: false,
        }
    }

    /// Record an edit made to the current pixels. The edit was made on top
    /// of the old geometry, so a pending reset no longer applies.
    fn commit_geometry(&mut self, op: GeometryOp) {
        self.geometry.record(op);
        self.revision += 1;
        self.reset_pending = false;
    }
}

/// One editing session: a source asset, its two surfaces, and the current
/// adjustment state.
#[derive(Debug)]
pub struct EditSession {
    config: EditorConfig,
    source_locator: String,
    full: SurfaceSlot,
    preview: SurfaceSlot,
    adjustments: AdjustmentParameters,
    generation: u64,
}

impl EditSession {
    /// Open a session on a decoded source.
    ///
    /// The full surface gets the source's size; the preview is fitted into
    /// `display` (never upscaled). Both are drawn the same way a colour
    /// redraw with default parameters draws them.
    pub fn open(
        config: EditorConfig,
        source_locator: impl Into<String>,
        source: &DecodedImage,
        display: (u32, u32),
    ) -> Result<Self, SessionError> {
        if source.is_empty() {
            return Err(SessionError::EmptySource);
        }
        if display.0 == 0 || display.1 == 0 {
            return Err(SessionError::InvalidDisplay {
                width: display.0,
                height: display.1,
            });
        }

        let preview_dims = preview_dimensions(source.dimensions(), display);
        let full = draw_source(source, source.dimensions())?;
        let preview = draw_source(source, preview_dims)?;

        let source_locator = source_locator.into();
        info!(
            source = %source_locator,
            full = ?full.dimensions(),
            preview = ?preview.dimensions(),
            "opened edit session"
        );

        Ok(Self {
            config,
            source_locator,
            full: SurfaceSlot::new(full),
            preview: SurfaceSlot::new(preview),
            adjustments: AdjustmentParameters::default(),
            generation: 0,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn source_locator(&self) -> &str {
        &self.source_locator
    }

    /// The surface of the given kind, if attached.
    pub fn surface(&self, kind: SurfaceKind) -> Option<&Surface> {
        self.slot(kind).surface.as_ref()
    }

    /// Geometry the given surface has received.
    pub fn geometry(&self, kind: SurfaceKind) -> &GeometryState {
        &self.slot(kind).geometry
    }

    /// True if a reset is waiting for a redraw to reach this surface.
    pub fn is_reset_pending(&self, kind: SurfaceKind) -> bool {
        self.slot(kind).reset_pending
    }

    /// The most recently requested adjustment parameters.
    pub fn adjustments(&self) -> &AdjustmentParameters {
        &self.adjustments
    }

    /// The current adjustment generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tear down a surface handle. Later operations skip it.
    pub fn detach(&mut self, kind: SurfaceKind) -> Option<Surface> {
        let slot = self.slot_mut(kind);
        slot.revision += 1;
        slot.surface.take()
    }

    /// Hand a surface back to the session, replacing any attached one.
    ///
    /// The surface is taken as already showing the current edit.
    pub fn attach(&mut self, kind: SurfaceKind, surface: Surface) {
        let slot = self.slot_mut(kind);
        slot.revision += 1;
        slot.surface = Some(surface);
    }

    /// Crop both surfaces to a rectangle drawn on the preview surface.
    ///
    /// The rectangle is projected onto each surface by the ratio of that
    /// surface's dimensions to the preview's, then clamped.
    pub fn crop_photo(&mut self, rect: PreviewRect) -> SurfaceReport {
        let reference = self.surface(SurfaceKind::Preview).map(Surface::dimensions);

        self.for_each_surface("crop", |surface| {
            let Some(preview_dims) = reference else {
                return Err(SurfaceOutcome::NoReference);
            };
            let region = rect.project(preview_dims, surface.dimensions());
            let applied = crop(surface, region);
            Ok(GeometryOp::Crop { region: applied })
        })
    }

    /// Rotate both surfaces by `degrees` (positive = clockwise).
    pub fn rotate_photo(&mut self, degrees: f64) -> SurfaceReport {
        let filter = self.config.rotation_filter;
        self.for_each_surface("rotate", |surface| {
            let applied = rotate(surface, degrees, filter);
            Ok(GeometryOp::Rotate { degrees: applied })
        })
    }

    /// Mirror both surfaces along `axis`.
    pub fn flip_photo(&mut self, axis: FlipAxis) -> SurfaceReport {
        self.for_each_surface("flip", |surface| {
            flip(surface, axis);
            Ok(GeometryOp::Flip { axis })
        })
    }

    /// Drop all geometry and adjustments.
    ///
    /// Each surface keeps its pixels and its recorded geometry until a colour
    /// redraw commits on it; that redraw draws the untouched source at the
    /// surface's original size. A failed redraw leaves the reset pending, and
    /// a geometric edit made before then cancels it for that surface.
    /// In-flight redraws become stale.
    pub fn reset(&mut self) -> RedrawTicket {
        for kind in SurfaceKind::ALL {
            let slot = self.slot_mut(kind);
            slot.reset_pending = true;
            slot.revision += 1;
        }
        debug!("session reset");
        self.begin_adjustment(AdjustmentParameters::default())
    }

    /// Start a colour redraw request. Any request still in flight becomes
    /// stale from this point.
    pub fn begin_adjustment(&mut self, params: AdjustmentParameters) -> RedrawTicket {
        self.generation += 1;
        self.adjustments = params;
        RedrawTicket::new(self.generation, params)
    }

    /// True if `ticket` belongs to the latest request.
    pub fn is_current(&self, ticket: &RedrawTicket) -> bool {
        ticket.generation() == self.generation
    }

    /// Snapshot everything needed to render one surface for `ticket`.
    ///
    /// The plan is self-contained: rendering it reads no session state, so
    /// no other surface's redraw can interfere with it.
    pub fn plan_redraw(
        &self,
        ticket: &RedrawTicket,
        kind: SurfaceKind,
    ) -> Result<RedrawPlan, SurfaceOutcome> {
        if !self.is_current(ticket) {
            return Err(SurfaceOutcome::Superseded);
        }

        let slot = self.slot(kind);
        let Some(target) = slot.surface.as_ref() else {
            warn!(surface = %kind, "surface missing; skipping colour redraw");
            return Err(SurfaceOutcome::Missing);
        };
        // Blur is expressed in preview pixels; without a blur the reference
        // size does not matter.
        let preview_dims = match self.surface(SurfaceKind::Preview) {
            Some(preview) => preview.dimensions(),
            None if ticket.params().sanitized().blur == 0.0 => target.dimensions(),
            None => {
                warn!(surface = %kind, "preview surface missing; cannot scale blur");
                return Err(SurfaceOutcome::NoReference);
            }
        };

        let geometry = if slot.reset_pending {
            Vec::new()
        } else {
            slot.geometry.ops().to_vec()
        };
        let plan = RedrawPlan::new(
            ticket,
            kind,
            slot.revision,
            slot.base_dims,
            target.dimensions(),
            preview_dims,
            geometry,
            self.config.rotation_filter,
        );
        Ok(if slot.reset_pending {
            plan.clearing_geometry()
        } else {
            plan
        })
    }

    /// Commit a rendered surface if its plan is still current.
    ///
    /// A plan is stale if a newer adjustment was requested, or if the
    /// surface received geometry or was swapped since the plan was taken.
    pub fn commit_redraw(&mut self, plan: &RedrawPlan, rendered: Surface) -> SurfaceOutcome {
        if plan.generation() != self.generation {
            debug!(
                surface = %plan.kind(),
                stale = plan.generation(),
                current = self.generation,
                "discarding superseded colour redraw"
            );
            return SurfaceOutcome::Superseded;
        }

        let slot = self.slot_mut(plan.kind());
        if slot.revision != plan.revision() {
            debug!(surface = %plan.kind(), "geometry changed during redraw; discarding");
            return SurfaceOutcome::Superseded;
        }
        let Some(surface) = slot.surface.as_mut() else {
            warn!(surface = %plan.kind(), "surface detached during redraw");
            return SurfaceOutcome::Missing;
        };

        *surface = rendered;
        if plan.clears_geometry() {
            slot.geometry = GeometryState::default();
            slot.reset_pending = false;
            slot.revision += 1;
            debug!(surface = %plan.kind(), "reset committed");
        }
        debug!(surface = %plan.kind(), generation = plan.generation(), "committed colour redraw");
        SurfaceOutcome::Applied
    }

    /// Export a surface, using the configured MIME type when `mime` is `None`.
    pub fn export(
        &self,
        kind: SurfaceKind,
        mime: Option<&str>,
    ) -> Result<Option<Vec<u8>>, EncodeError> {
        let mime = mime.unwrap_or(&self.config.export_mime);
        export_surface(self.surface(kind), mime, self.config.jpeg_quality())
    }

    /// The MIME type [`export`](Self::export) produces for `mime`, after the
    /// configured default and the PNG fallback are applied.
    pub fn export_mime(&self, mime: Option<&str>) -> &'static str {
        ExportFormat::from_mime(mime.unwrap_or(&self.config.export_mime)).mime()
    }

    /// Run a geometric edit on each attached surface, full first.
    fn for_each_surface<F>(&mut self, op_name: &str, mut edit: F) -> SurfaceReport
    where
        F: FnMut(&mut Surface) -> Result<GeometryOp, SurfaceOutcome>,
    {
        let mut report = SurfaceReport::default();

        for kind in SurfaceKind::ALL {
            let slot = self.slot_mut(kind);
            let Some(surface) = slot.surface.as_mut() else {
                warn!(surface = %kind, op = op_name, "surface missing; skipping");
                report.set(kind, SurfaceOutcome::Missing);
                continue;
            };

            match edit(surface) {
                Ok(op) => {
                    slot.commit_geometry(op);
                    report.set(kind, SurfaceOutcome::Applied);
                }
                Err(outcome) => {
                    warn!(surface = %kind, op = op_name, ?outcome, "surface skipped");
                    report.set(kind, outcome);
                }
            }
        }

        report
    }

    fn slot(&self, kind: SurfaceKind) -> &SurfaceSlot {
        match kind {
            SurfaceKind::Full => &self.full,
            SurfaceKind::Preview => &self.preview,
        }
    }

    fn slot_mut(&mut self, kind: SurfaceKind) -> &mut SurfaceSlot {
        match kind {
            SurfaceKind::Full => &mut self.full,
            SurfaceKind::Preview => &mut self.preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{CropRegion, InterpolationFilter};

    /// Source where each pixel encodes its position at 1/8 resolution so
    /// nearest-neighbour downscales stay predictable.
    fn source(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x / 8) as u8, (y / 8) as u8, 50, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn session(width: u32, height: u32, display: (u32, u32)) -> EditSession {
        EditSession::open(EditorConfig::default(), "test://source", &source(width, height), display)
            .unwrap()
    }

    fn dims(session: &EditSession, kind: SurfaceKind) -> (u32, u32) {
        session.surface(kind).unwrap().dimensions()
    }

    #[test]
    fn test_open_sizes_surfaces() {
        let s = session(2000, 1000, (500, 400));
        assert_eq!(dims(&s, SurfaceKind::Full), (2000, 1000));
        assert_eq!(dims(&s, SurfaceKind::Preview), (500, 250));
        assert_eq!(s.generation(), 0);
        assert!(s.adjustments().is_default());
    }

    #[test]
    fn test_open_full_surface_matches_source() {
        let src = source(40, 20);
        let s = EditSession::open(EditorConfig::default(), "x", &src, (10, 10)).unwrap();
        assert_eq!(s.surface(SurfaceKind::Full).unwrap().pixels(), &src.pixels[..]);
    }

    #[test]
    fn test_open_rejects_empty_source() {
        let empty = DecodedImage::new(0, 0, vec![]);
        let result = EditSession::open(EditorConfig::default(), "x", &empty, (10, 10));
        assert!(matches!(result, Err(SessionError::EmptySource)));
    }

    #[test]
    fn test_open_rejects_zero_display() {
        let result = EditSession::open(EditorConfig::default(), "x", &source(8, 8), (0, 10));
        assert!(matches!(
            result,
            Err(SessionError::InvalidDisplay {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn test_crop_scales_region_per_surface() {
        let mut s = session(2000, 1000, (500, 400));
        let report = s.crop_photo(PreviewRect::new(50.0, 25.0, 100.0, 50.0));

        assert!(report.all_applied());
        assert_eq!(dims(&s, SurfaceKind::Full), (400, 200));
        assert_eq!(dims(&s, SurfaceKind::Preview), (100, 50));
        assert_eq!(
            s.geometry(SurfaceKind::Full).ops(),
            &[GeometryOp::Crop {
                region: CropRegion::new(200, 100, 400, 200)
            }]
        );
        assert_eq!(
            s.geometry(SurfaceKind::Preview).ops(),
            &[GeometryOp::Crop {
                region: CropRegion::new(50, 25, 100, 50)
            }]
        );
    }

    #[test]
    fn test_crop_full_corner_matches_source_position() {
        let mut s = session(2000, 1000, (500, 400));
        s.crop_photo(PreviewRect::new(50.0, 25.0, 100.0, 50.0));

        // Full-res (200, 100) encodes (200/8, 100/8).
        let full = s.surface(SurfaceKind::Full).unwrap();
        assert_eq!(full.pixel(0, 0), Some([25, 12, 50, 255]));
    }

    #[test]
    fn test_surfaces_stay_in_sync_after_mixed_geometry() {
        let mut s = session(800, 400, (200, 200));
        s.rotate_photo(90.0);
        s.flip_photo(FlipAxis::Horizontal);
        s.crop_photo(PreviewRect::new(10.0, 20.0, 30.0, 40.0));
        s.rotate_photo(-90.0);

        let (fw, fh) = dims(&s, SurfaceKind::Full);
        let (pw, ph) = dims(&s, SurfaceKind::Preview);
        assert_eq!((fw / 4, fh / 4), (pw, ph));
        assert_eq!(s.geometry(SurfaceKind::Full).rotation(), 0.0);
        assert!(s.geometry(SurfaceKind::Full).flipped_horizontal());
        assert_eq!(s.geometry(SurfaceKind::Preview).ops().len(), 4);
    }

    #[test]
    fn test_rotation_accumulates_mod_360() {
        let mut s = session(16, 8, (16, 8));
        for _ in 0..5 {
            s.rotate_photo(90.0);
        }
        assert_eq!(s.geometry(SurfaceKind::Preview).rotation(), 90.0);
        assert_eq!(dims(&s, SurfaceKind::Full), (8, 16));
    }

    #[test]
    fn test_flip_twice_restores_both_surfaces() {
        let mut s = session(64, 32, (32, 32));
        let full_before = s.surface(SurfaceKind::Full).cloned();
        let preview_before = s.surface(SurfaceKind::Preview).cloned();

        s.flip_photo(FlipAxis::Vertical);
        s.flip_photo(FlipAxis::Vertical);

        assert_eq!(s.surface(SurfaceKind::Full).cloned(), full_before);
        assert_eq!(s.surface(SurfaceKind::Preview).cloned(), preview_before);
        assert!(!s.geometry(SurfaceKind::Full).flipped_vertical());
        assert!(s.geometry(SurfaceKind::Full).is_empty());
    }

    #[test]
    fn test_quarter_turns_and_repeated_flips_are_folded() {
        let mut s = session(32, 16, (32, 16));
        s.rotate_photo(90.0);
        s.rotate_photo(90.0);
        assert_eq!(
            s.geometry(SurfaceKind::Full).ops(),
            &[GeometryOp::Rotate { degrees: 180.0 }]
        );

        s.rotate_photo(-180.0);
        s.flip_photo(FlipAxis::Horizontal);
        s.flip_photo(FlipAxis::Horizontal);
        assert!(s.geometry(SurfaceKind::Full).is_empty());

        s.rotate_photo(30.0);
        s.rotate_photo(30.0);
        assert_eq!(s.geometry(SurfaceKind::Full).ops().len(), 2);
        assert_eq!(s.geometry(SurfaceKind::Full).rotation(), 60.0);
    }

    #[test]
    fn test_folded_geometry_replays_to_same_pixels() {
        let mut s = session(32, 16, (32, 16));
        let src = source(32, 16);
        for _ in 0..3 {
            s.rotate_photo(90.0);
        }
        s.flip_photo(FlipAxis::Vertical);
        s.crop_photo(PreviewRect::new(2.0, 4.0, 8.0, 20.0));
        s.flip_photo(FlipAxis::Vertical);
        s.rotate_photo(-90.0);

        let ticket = s.begin_adjustment(AdjustmentParameters::default());
        let plan = s.plan_redraw(&ticket, SurfaceKind::Full).unwrap();
        assert_eq!(plan.geometry().len(), 5);
        assert_eq!(Some(&plan.render(&src).unwrap()), s.surface(SurfaceKind::Full));
    }

    #[test]
    fn test_missing_full_surface_does_not_block_preview() {
        let mut s = session(64, 32, (32, 32));
        s.detach(SurfaceKind::Full);

        let report = s.rotate_photo(90.0);
        assert_eq!(report.full, SurfaceOutcome::Missing);
        assert_eq!(report.preview, SurfaceOutcome::Applied);
        assert_eq!(dims(&s, SurfaceKind::Preview), (16, 32));
    }

    #[test]
    fn test_crop_without_preview_reference() {
        let mut s = session(64, 32, (32, 32));
        s.detach(SurfaceKind::Preview);

        let report = s.crop_photo(PreviewRect::new(0.0, 0.0, 8.0, 8.0));
        assert_eq!(report.full, SurfaceOutcome::NoReference);
        assert_eq!(report.preview, SurfaceOutcome::Missing);
        assert_eq!(dims(&s, SurfaceKind::Full), (64, 32));
        assert!(s.geometry(SurfaceKind::Full).is_empty());
    }

    #[test]
    fn test_attach_restores_surface() {
        let mut s = session(64, 32, (32, 32));
        let preview = s.detach(SurfaceKind::Preview).unwrap();
        assert!(s.surface(SurfaceKind::Preview).is_none());

        s.attach(SurfaceKind::Preview, preview);
        assert!(s.flip_photo(FlipAxis::Horizontal).all_applied());
    }

    #[test]
    fn test_generation_increments_per_request() {
        let mut s = session(8, 8, (8, 8));
        let a = s.begin_adjustment(AdjustmentParameters::default());
        let b = s.begin_adjustment(AdjustmentParameters::default());

        assert_eq!(a.generation() + 1, b.generation());
        assert!(!s.is_current(&a));
        assert!(s.is_current(&b));
    }

    #[test]
    fn test_plan_for_stale_ticket_is_superseded() {
        let mut s = session(8, 8, (8, 8));
        let stale = s.begin_adjustment(AdjustmentParameters::default());
        s.begin_adjustment(AdjustmentParameters::default());

        assert_eq!(
            s.plan_redraw(&stale, SurfaceKind::Full).unwrap_err(),
            SurfaceOutcome::Superseded
        );
    }

    #[test]
    fn test_commit_after_geometry_change_is_superseded() {
        let mut s = session(16, 16, (16, 16));
        let src = source(16, 16);
        let ticket = s.begin_adjustment(AdjustmentParameters::default());
        let plan = s.plan_redraw(&ticket, SurfaceKind::Preview).unwrap();
        let rendered = plan.render(&src).unwrap();

        s.rotate_photo(90.0);

        assert_eq!(s.commit_redraw(&plan, rendered), SurfaceOutcome::Superseded);
    }

    #[test]
    fn test_reset_clears_geometry_and_invalidates_requests() {
        let mut s = session(32, 16, (32, 16));
        let in_flight = s.begin_adjustment(AdjustmentParameters {
            invert: true,
            ..Default::default()
        });
        s.rotate_photo(90.0);

        let ticket = s.reset();

        assert!(!s.is_current(&in_flight));
        assert!(s.is_current(&ticket));
        assert!(ticket.params().is_default());
        assert!(s.is_reset_pending(SurfaceKind::Full));
        assert!(s.is_reset_pending(SurfaceKind::Preview));
        // Pixels are still rotated, so the geometry stays until a redraw.
        assert_eq!(s.geometry(SurfaceKind::Full).rotation(), 90.0);
    }

    #[test]
    fn test_reset_clears_geometry_on_commit() {
        let mut s = session(32, 16, (32, 16));
        let src = source(32, 16);
        s.rotate_photo(90.0);

        let ticket = s.reset();
        let plan = s.plan_redraw(&ticket, SurfaceKind::Full).unwrap();
        assert!(plan.geometry().is_empty());
        let rendered = plan.render(&src).unwrap();

        assert_eq!(s.commit_redraw(&plan, rendered), SurfaceOutcome::Applied);
        assert!(s.geometry(SurfaceKind::Full).is_empty());
        assert!(!s.is_reset_pending(SurfaceKind::Full));
        assert_eq!(dims(&s, SurfaceKind::Full), (32, 16));
        // The preview has not been redrawn yet.
        assert_eq!(s.geometry(SurfaceKind::Preview).rotation(), 90.0);
        assert!(s.is_reset_pending(SurfaceKind::Preview));
    }

    #[test]
    fn test_reset_survives_later_adjustment() {
        let mut s = session(32, 16, (32, 16));
        s.crop_photo(PreviewRect::new(0.0, 0.0, 8.0, 8.0));
        s.reset();

        let ticket = s.begin_adjustment(AdjustmentParameters {
            invert: true,
            ..Default::default()
        });
        let plan = s.plan_redraw(&ticket, SurfaceKind::Preview).unwrap();
        assert!(plan.geometry().is_empty());
    }

    #[test]
    fn test_geometry_edit_cancels_pending_reset() {
        let mut s = session(32, 16, (32, 16));
        s.crop_photo(PreviewRect::new(8.0, 4.0, 16.0, 8.0));
        s.reset();
        s.flip_photo(FlipAxis::Horizontal);

        assert!(!s.is_reset_pending(SurfaceKind::Full));
        assert_eq!(s.geometry(SurfaceKind::Full).ops().len(), 2);

        let ticket = s.begin_adjustment(AdjustmentParameters::default());
        let plan = s.plan_redraw(&ticket, SurfaceKind::Full).unwrap();
        assert_eq!(plan.geometry().len(), 2);
    }

    #[test]
    fn test_export_uses_configured_mime() {
        let mut config = EditorConfig::default();
        config.export_mime = "image/png".to_string();
        config.rotation_filter = InterpolationFilter::Lanczos3;
        let s = EditSession::open(config, "x", &source(8, 8), (8, 8)).unwrap();

        let png = s.export(SurfaceKind::Full, None).unwrap().unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let jpeg = s.export(SurfaceKind::Full, Some("image/jpeg")).unwrap().unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_export_mime_reports_fallback() {
        let s = session(8, 8, (8, 8));
        assert_eq!(s.export_mime(None), "image/jpeg");
        assert_eq!(s.export_mime(Some("image/JPG")), "image/jpeg");
        assert_eq!(s.export_mime(Some("image/webp")), "image/png");
    }

    #[test]
    fn test_export_missing_surface_is_empty() {
        let mut s = session(8, 8, (8, 8));
        s.detach(SurfaceKind::Full);
        assert!(s.export(SurfaceKind::Full, None).unwrap().is_none());
    }
}
