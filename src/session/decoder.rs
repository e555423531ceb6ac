use std::sync::{Arc, Mutex};

use crate::config::{DecoderOpts, FontAttachment};
use crate::foundation::core::Tick;
use crate::foundation::error::{SubError, SubResult};
use crate::layout::compat::legacy_script_overrides;
use crate::layout::{EngineSetup, LayoutEngine};
use crate::session::lock_engine;
use crate::session::overlay::OverlayUnit;

/// Subtitle codec carried by a track.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SubtitleCodec {
    /// SubStation Alpha / Advanced SubStation Alpha.
    Ssa,
    Other(String),
}

/// Track description from the demuxer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackFormat {
    pub codec: SubtitleCodec,
    /// Codec private data (the script header).
    pub extra: Vec<u8>,
}

/// One chunk of subtitle track data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtitleBlock {
    pub data: Vec<u8>,
    pub pts: Tick,
    pub duration: Tick,
    /// Set by the demuxer when the data is known to be damaged.
    pub corrupted: bool,
}

impl SubtitleBlock {
    pub fn new(data: impl Into<Vec<u8>>, pts: Tick, duration: Tick) -> Self {
        Self {
            data: data.into(),
            pts,
            duration,
            corrupted: false,
        }
    }
}

/// Feeding side of the compositor: owns the timing state and hands out [`OverlayUnit`]s that
/// share its layout engine.
pub struct SubtitleDecoder<E: LayoutEngine> {
    engine: Arc<Mutex<E>>,
    opts: DecoderOpts,
    last_pts: Option<Tick>,
    max_stop: Option<Tick>,
}

impl<E: LayoutEngine> SubtitleDecoder<E> {
    /// Create the layout engine for `format` and prime it with the track header.
    ///
    /// Fails with [`SubError::Unsupported`] for non-SSA tracks and [`SubError::Setup`] when the
    /// engine factory fails.
    pub fn open<F>(
        format: &TrackFormat,
        opts: DecoderOpts,
        attachments: &[FontAttachment],
        factory: F,
    ) -> SubResult<Self>
    where
        F: FnOnce(&EngineSetup) -> anyhow::Result<E>,
    {
        if format.codec != SubtitleCodec::Ssa {
            return Err(SubError::unsupported(format!("{:?}", format.codec)));
        }

        let setup = opts.engine_setup(attachments);
        let mut engine = factory(&setup).map_err(|e| {
            tracing::warn!(error = %e, "layout engine creation failed");
            SubError::setup(format!("{e:#}"))
        })?;

        engine.process_codec_private(&format.extra);
        if let Some(overrides) = legacy_script_overrides(&format.extra) {
            tracing::debug!(?overrides, "patching script info for legacy renderer");
            engine.apply_overrides(&overrides);
        }

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            opts,
            last_pts: None,
            max_stop: None,
        })
    }

    /// Feed one block. Returns a new presentation unit when the block starts a new timestamp.
    ///
    /// Corrupted blocks reset timing state; empty blocks are ignored.
    pub fn decode(&mut self, block: SubtitleBlock) -> Option<OverlayUnit<E>> {
        if block.corrupted {
            tracing::warn!(pts = block.pts.0, "discarding corrupted block");
            self.flush();
            return None;
        }
        if block.data.first().is_none_or(|&b| b == 0) {
            return None;
        }

        let unit = if self.last_pts != Some(block.pts) {
            let end = block.pts + block.duration;
            let stop = self.max_stop.map_or(end, |m| m.max(end));
            self.max_stop = Some(stop);
            Some(OverlayUnit::new(
                Arc::clone(&self.engine),
                block.pts,
                stop,
                &self.opts,
            ))
        } else {
            None
        };
        self.last_pts = Some(block.pts);

        lock_engine(&self.engine).process_chunk(
            &block.data,
            block.pts.as_millis(),
            block.duration.as_millis(),
        );
        unit
    }

    /// Forget timing state after a seek. Units already handed out keep working.
    pub fn flush(&mut self) {
        self.last_pts = None;
        self.max_stop = None;
    }

    /// Run `f` against the engine under the shared lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        f(&mut lock_engine(&self.engine))
    }

    /// Number of live owners of the shared engine (this decoder plus outstanding units).
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.engine)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/decoder.rs"]
mod tests;
