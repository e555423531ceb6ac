use std::sync::{Arc, Mutex};

use crate::config::DecoderOpts;
use crate::foundation::core::{FrameGeometry, Tick};
use crate::layout::LayoutEngine;
use crate::region::builder::build_regions;
use crate::region::raster::{RasterOpts, Region, draw_region};
use crate::session::lock_engine;

/// One render request from the display pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Display timestamp.
    pub pts: Tick,
    pub geometry: FrameGeometry,
}

/// What an update did to the unit's region set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing changed; the previous regions are still current.
    Unchanged,
    /// Rebuilt to an empty set (blank subtitle this frame).
    Cleared,
    /// Rebuilt with this many regions.
    Redrawn { regions: usize },
}

/// Presentation unit for one subtitle timestamp.
///
/// Holds a reference to the shared engine for as long as it lives, so it keeps rendering after
/// the decoder that produced it has been flushed or dropped. Starts idle (no geometry, no
/// regions); each [`OverlayUnit::update`] either keeps the current region set or rebuilds it.
pub struct OverlayUnit<E: LayoutEngine> {
    engine: Arc<Mutex<E>>,
    pts: Tick,
    start: Tick,
    stop: Tick,
    ephemeral: bool,
    max_regions: usize,
    raster: RasterOpts,

    geometry: Option<FrameGeometry>,
    original_size: Option<(u32, u32)>,
    regions: Vec<Region>,
}

impl<E: LayoutEngine> OverlayUnit<E> {
    pub(crate) fn new(engine: Arc<Mutex<E>>, pts: Tick, stop: Tick, opts: &DecoderOpts) -> Self {
        Self {
            engine,
            pts,
            start: pts,
            stop,
            ephemeral: true,
            max_regions: opts.effective_max_regions(),
            raster: RasterOpts {
                outline: opts.debug_outline,
            },
            geometry: None,
            original_size: None,
            regions: Vec::new(),
        }
    }

    pub fn start(&self) -> Tick {
        self.start
    }

    pub fn stop(&self) -> Tick {
        self.stop
    }

    /// Ephemeral units are replaced by the next unit rather than expiring at `stop`.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Current region set, positioned in absolute destination coordinates.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Destination visible size the regions were laid out for.
    pub fn original_size(&self) -> Option<(u32, u32)> {
        self.original_size
    }

    /// Bring the region set up to date for `req`.
    ///
    /// The engine lock is held for the whole call, region building and drawing included.
    #[tracing::instrument(level = "trace", skip(self), fields(pts = req.pts.0))]
    pub fn update(&mut self, req: &UpdateRequest) -> UpdateOutcome {
        let mut engine = lock_engine(&self.engine);

        let geometry_changed = req.geometry.differs_from(self.geometry.as_ref());
        if geometry_changed {
            let mapping = req.geometry.mapping();
            tracing::debug!(?mapping, "reconfiguring layout engine");
            engine.configure_frame(&mapping);
        }
        self.geometry = Some(req.geometry);

        let stream_time = self.pts + (req.pts - self.start);
        let frame = engine.render_frame(stream_time.as_millis());

        if !frame.change.is_changed()
            && !geometry_changed
            && frame.images.is_empty() == self.regions.is_empty()
        {
            return UpdateOutcome::Unchanged;
        }

        self.regions.clear();
        let dst = req.geometry.dst;
        self.original_size = Some((dst.visible_width, dst.visible_height));

        let rects = build_regions(&frame.images, self.max_regions, dst.width, dst.height);
        for rect in rects {
            let Some(mut region) = Region::alloc(rect) else {
                tracing::warn!(?rect, "cannot allocate region buffer, skipping remaining regions");
                break;
            };
            draw_region(&mut region, &frame.images, self.raster);
            self.regions.push(region);
        }

        if self.regions.is_empty() {
            UpdateOutcome::Cleared
        } else {
            UpdateOutcome::Redrawn {
                regions: self.regions.len(),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/overlay.rs"]
mod tests;
