//! Colour adjustment pipeline.
//!
//! A colour redraw never filters a surface in place. For each surface it
//! reloads the source asset, draws it at the surface's base size, applies
//! the filter chain and then replays the surface's committed geometry.
//! Repeated slider changes therefore never compound.
//!
//! # Concurrency
//!
//! Loading the source is the only suspension point. Each request carries
//! the generation it was issued under; a result is committed only if no
//! newer request was issued and the surface received no geometry while it
//! was in flight. The last request issued wins, whatever order the loads
//! complete in.
//!
//! Surfaces are processed one after the other, full first, and no session
//! borrow is held across an `.await`.

use std::cell::RefCell;
use std::future::Future;

use thiserror::Error;
use tracing::{debug, warn};

use crate::adjustments::{apply_filter, FilterDescriptor};
use crate::decode::{resize, DecodeError, DecodedImage, FilterType};
use crate::session::{EditSession, SurfaceOutcome, SurfaceReport};
use crate::surface::{Surface, SurfaceKind};
use crate::transform::{GeometryOp, InterpolationFilter};
use crate::AdjustmentParameters;

/// Errors raised while loading or drawing the source asset.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The host could not fetch the source.
    #[error("Failed to load {locator}: {reason}")]
    Load { locator: String, reason: String },

    /// The fetched bytes could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The source has no pixels.
    #[error("Source image is empty")]
    EmptySource,
}

/// Fetches and decodes the source asset for a redraw.
///
/// Implementations may suspend (network, host reads). Every redraw calls
/// `load` again; caching is up to the implementation.
pub trait SourceLoader {
    fn load(&self, locator: &str) -> impl Future<Output = Result<DecodedImage, PipelineError>>;
}

/// A colour redraw request: the parameters plus the generation they were
/// issued under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedrawTicket {
    generation: u64,
    params: AdjustmentParameters,
}

impl RedrawTicket {
    pub(crate) fn new(generation: u64, params: AdjustmentParameters) -> Self {
        Self { generation, params }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn params(&self) -> &AdjustmentParameters {
        &self.params
    }
}

/// Everything needed to rebuild one surface from the source.
///
/// Taken from the session in one step, so rendering reads no shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct RedrawPlan {
    kind: SurfaceKind,
    generation: u64,
    revision: u64,
    base_dims: (u32, u32),
    descriptor: FilterDescriptor,
    geometry: Vec<GeometryOp>,
    filter: InterpolationFilter,
    clears_geometry: bool,
}

impl RedrawPlan {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        ticket: &RedrawTicket,
        kind: SurfaceKind,
        revision: u64,
        base_dims: (u32, u32),
        target_dims: (u32, u32),
        preview_dims: (u32, u32),
        geometry: Vec<GeometryOp>,
        filter: InterpolationFilter,
    ) -> Self {
        Self {
            kind,
            generation: ticket.generation(),
            revision,
            base_dims,
            descriptor: FilterDescriptor::for_surface(ticket.params(), target_dims, preview_dims),
            geometry,
            filter,
            clears_geometry: false,
        }
    }

    /// Mark this plan as completing a reset: committing it also drops the
    /// surface's recorded geometry.
    pub(crate) fn clearing_geometry(mut self) -> Self {
        self.clears_geometry = true;
        self
    }

    /// True if committing this plan completes a reset.
    pub fn clears_geometry(&self) -> bool {
        self.clears_geometry
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    /// The filter chain for this surface, blur already scaled.
    pub fn descriptor(&self) -> &FilterDescriptor {
        &self.descriptor
    }

    /// Geometry replayed after filtering.
    pub fn geometry(&self) -> &[GeometryOp] {
        &self.geometry
    }

    /// Draw the source, filter it and replay geometry.
    pub fn render(&self, source: &DecodedImage) -> Result<Surface, PipelineError> {
        let mut surface = draw_source(source, self.base_dims)?;

        if !self.descriptor.is_identity() {
            let mut image = surface.to_rgba_image().ok_or(PipelineError::EmptySource)?;
            apply_filter(&mut image, &self.descriptor);
            surface = Surface::from_rgba_image(image).ok_or(PipelineError::EmptySource)?;
        }

        for op in &self.geometry {
            op.apply(&mut surface, self.filter);
        }

        Ok(surface)
    }
}

/// Draw the source onto a fresh surface of the given size.
///
/// Scaling is nearest-neighbour, so a source drawn at its own size is copied
/// exactly.
pub(crate) fn draw_source(
    source: &DecodedImage,
    dims: (u32, u32),
) -> Result<Surface, PipelineError> {
    if source.is_empty() {
        return Err(PipelineError::EmptySource);
    }

    let drawn = resize(source, dims.0, dims.1, FilterType::Nearest)?;
    Surface::from_pixels(drawn.width, drawn.height, drawn.pixels).ok_or_else(|| {
        DecodeError::CorruptedFile("pixel buffer does not match dimensions".to_string()).into()
    })
}

/// Apply colour adjustments to both surfaces.
///
/// Issues a new request, so any redraw still in flight is discarded when it
/// completes.
pub async fn apply_adjustments<L: SourceLoader>(
    session: &RefCell<EditSession>,
    loader: &L,
    params: AdjustmentParameters,
) -> SurfaceReport {
    let ticket = session.borrow_mut().begin_adjustment(params);
    redraw(session, loader, &ticket).await
}

/// Drop all edits and redraw both surfaces from the untouched source.
pub async fn reset<L: SourceLoader>(session: &RefCell<EditSession>, loader: &L) -> SurfaceReport {
    let ticket = session.borrow_mut().reset();
    redraw(session, loader, &ticket).await
}

async fn redraw<L: SourceLoader>(
    session: &RefCell<EditSession>,
    loader: &L,
    ticket: &RedrawTicket,
) -> SurfaceReport {
    let mut report = SurfaceReport::default();
    for kind in SurfaceKind::ALL {
        let outcome = redraw_surface(session, loader, ticket, kind).await;
        report.set(kind, outcome);
    }
    report
}

async fn redraw_surface<L: SourceLoader>(
    session: &RefCell<EditSession>,
    loader: &L,
    ticket: &RedrawTicket,
    kind: SurfaceKind,
) -> SurfaceOutcome {
    let locator = {
        let session = session.borrow();
        // Cheap early exit before the load.
        if let Err(outcome) = session.plan_redraw(ticket, kind) {
            return outcome;
        }
        session.source_locator().to_string()
    };

    let source = match loader.load(&locator).await {
        Ok(source) => source,
        Err(e) => {
            warn!(surface = %kind, error = %e, "failed to load source for colour redraw");
            return SurfaceOutcome::Failed(e.to_string());
        }
    };

    // Re-plan after the load: geometry committed meanwhile must be replayed.
    let plan = match session.borrow().plan_redraw(ticket, kind) {
        Ok(plan) => plan,
        Err(outcome) => {
            debug!(surface = %kind, ?outcome, "colour redraw dropped after load");
            return outcome;
        }
    };

    match plan.render(&source) {
        Ok(rendered) => session.borrow_mut().commit_redraw(&plan, rendered),
        Err(e) => {
            warn!(surface = %kind, error = %e, "failed to render colour redraw");
            SurfaceOutcome::Failed(e.to_string())
        }
    }
}
