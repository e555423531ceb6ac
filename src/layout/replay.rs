//! Layout engine that replays pre-rasterized bitmaps.
//!
//! Each chunk is a JSON [`ReplayChunk`]; its bitmaps are shown on `[start, start + duration)`.
//! Used to drive the compositor from fixtures without a font stack.

use std::path::Path;

use crate::foundation::core::{FrameGeometry, FrameMapping, Tick};
use crate::foundation::error::{SubError, SubResult};
use crate::layout::{
    Bitmap, EngineSetup, ImageChange, LayoutEngine, PackedColor, RenderedFrame, ScriptOverrides,
};
use crate::session::decoder::SubtitleBlock;

/// Serialized form of one bitmap.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BitmapSpec {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Packed `0xRRGGBBAA`, alpha inverted.
    pub color: PackedColor,
    /// Row-major coverage, `w * h` bytes. Full coverage when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Vec<u8>>,
}

impl BitmapSpec {
    fn to_bitmap(&self) -> SubResult<Bitmap> {
        match &self.coverage {
            None => Ok(Bitmap::solid(self.x, self.y, self.w, self.h, self.color)),
            Some(cov) => {
                let w = self.w.max(0) as usize;
                let expected = w * self.h.max(0) as usize;
                if cov.len() != expected {
                    return Err(SubError::validation(format!(
                        "bitmap coverage has {} bytes, expected {expected}",
                        cov.len()
                    )));
                }
                Ok(Bitmap::new(
                    self.x,
                    self.y,
                    self.w,
                    self.h,
                    w,
                    cov.clone(),
                    self.color,
                ))
            }
        }
    }
}

/// Payload of one replay chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReplayChunk {
    pub bitmaps: Vec<BitmapSpec>,
}

impl ReplayChunk {
    pub fn to_bytes(&self) -> SubResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| SubError::serde(e.to_string()))
    }

    pub fn from_bytes(data: &[u8]) -> SubResult<Self> {
        serde_json::from_slice(data).map_err(|e| SubError::serde(e.to_string()))
    }
}

/// One timed chunk in a [`ReplayScript`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScriptEvent {
    pub start_ms: i64,
    pub duration_ms: i64,
    pub bitmaps: Vec<BitmapSpec>,
}

/// Fixture describing a whole replay track: header, display geometry and timed chunks.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReplayScript {
    /// Codec private data handed to the engine before any event.
    #[serde(default)]
    pub header: String,
    pub geometry: FrameGeometry,
    pub events: Vec<ScriptEvent>,
}

impl ReplayScript {
    pub fn from_path(path: impl AsRef<Path>) -> SubResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| SubError::validation(format!("read '{}': {e}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(|e| SubError::serde(e.to_string()))
    }

    /// Events encoded as decoder input, in script order.
    pub fn blocks(&self) -> SubResult<Vec<SubtitleBlock>> {
        self.events
            .iter()
            .map(|ev| {
                let data = ReplayChunk {
                    bitmaps: ev.bitmaps.clone(),
                }
                .to_bytes()?;
                Ok(SubtitleBlock::new(
                    data,
                    Tick::from_millis(ev.start_ms),
                    Tick::from_millis(ev.duration_ms),
                ))
            })
            .collect()
    }
}

#[derive(Debug)]
struct ReplayEvent {
    start_ms: i64,
    end_ms: i64,
    bitmaps: Vec<Bitmap>,
}

impl ReplayEvent {
    fn is_active(&self, now_ms: i64) -> bool {
        self.start_ms <= now_ms && now_ms < self.end_ms
    }
}

/// Deterministic [`LayoutEngine`] backed by JSON chunks.
///
/// `render_frame` reports [`ImageChange::Content`] when the set of active events changed,
/// [`ImageChange::Position`] when only the frame mapping changed, and `None` otherwise.
#[derive(Debug)]
pub struct ReplayEngine {
    setup: EngineSetup,
    header: Vec<u8>,
    overrides: Option<ScriptOverrides>,
    events: Vec<ReplayEvent>,
    mapping: Option<FrameMapping>,
    mapping_dirty: bool,
    last_active: Option<Vec<usize>>,
}

impl ReplayEngine {
    pub fn new(setup: EngineSetup) -> Self {
        Self {
            setup,
            header: Vec::new(),
            overrides: None,
            events: Vec::new(),
            mapping: None,
            mapping_dirty: false,
            last_active: None,
        }
    }

    pub fn setup(&self) -> &EngineSetup {
        &self.setup
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn overrides(&self) -> Option<&ScriptOverrides> {
        self.overrides.as_ref()
    }

    pub fn mapping(&self) -> Option<&FrameMapping> {
        self.mapping.as_ref()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl LayoutEngine for ReplayEngine {
    fn process_codec_private(&mut self, data: &[u8]) {
        self.header = data.to_vec();
    }

    fn apply_overrides(&mut self, overrides: &ScriptOverrides) {
        self.overrides = Some(*overrides);
    }

    fn process_chunk(&mut self, data: &[u8], start_ms: i64, duration_ms: i64) {
        let bitmaps = ReplayChunk::from_bytes(data).and_then(|chunk| {
            chunk
                .bitmaps
                .iter()
                .map(BitmapSpec::to_bitmap)
                .collect::<SubResult<Vec<_>>>()
        });
        let bitmaps = match bitmaps {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(start_ms, %err, "discarding undecodable replay chunk");
                return;
            }
        };

        let end_ms = start_ms.saturating_add(duration_ms.max(0));
        let duplicate = self
            .events
            .iter()
            .any(|e| e.start_ms == start_ms && e.end_ms == end_ms && e.bitmaps == bitmaps);
        if duplicate {
            return;
        }
        self.events.push(ReplayEvent {
            start_ms,
            end_ms,
            bitmaps,
        });
    }

    fn configure_frame(&mut self, mapping: &FrameMapping) {
        if self.mapping.as_ref() != Some(mapping) {
            self.mapping = Some(*mapping);
            self.mapping_dirty = true;
        }
    }

    fn render_frame(&mut self, now_ms: i64) -> RenderedFrame {
        let active: Vec<usize> = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_active(now_ms))
            .map(|(i, _)| i)
            .collect();

        let change = if self.last_active.as_ref() != Some(&active) {
            ImageChange::Content
        } else if self.mapping_dirty {
            ImageChange::Position
        } else {
            ImageChange::None
        };
        self.mapping_dirty = false;

        let images = active
            .iter()
            .flat_map(|&i| self.events[i].bitmaps.iter().cloned())
            .collect();
        self.last_active = Some(active);
        RenderedFrame { images, change }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/replay.rs"]
mod tests;
