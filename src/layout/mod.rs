//! Interface to the text-layout engine that turns styled subtitle events into positioned bitmaps.
//!
//! The compositor never looks inside the engine: it feeds it codec data, pushes frame geometry,
//! and asks for the image list at a timestamp.

pub(crate) mod compat;
pub(crate) mod replay;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::FontAttachment;
use crate::foundation::core::FrameMapping;
use crate::region::rect::IntRect;

pub use compat::{ScriptOverrides, YCbCrMatrix};

/// Single packed color shared by a whole bitmap: `0xRRGGBBAA`, where `AA` is inverted
/// (0 = opaque, 255 = transparent).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PackedColor(pub u32);

impl PackedColor {
    /// Pack straight (non-inverted) RGBA components.
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, 255 - a]))
    }

    pub fn rgb(self) -> [u8; 3] {
        let [r, g, b, _] = self.0.to_be_bytes();
        [r, g, b]
    }

    /// Opacity with the inversion undone (255 = opaque).
    pub fn alpha(self) -> u8 {
        !(self.0 as u8)
    }
}

/// One positioned, single-colored, variable-coverage raster fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    /// Left edge in destination pixels.
    pub x: i32,
    /// Top edge in destination pixels.
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Bytes between the starts of two coverage rows.
    pub stride: usize,
    /// One coverage byte per pixel, row-major.
    pub coverage: Arc<[u8]>,
    pub color: PackedColor,
}

impl Bitmap {
    pub fn new(
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        stride: usize,
        coverage: impl Into<Arc<[u8]>>,
        color: PackedColor,
    ) -> Self {
        Self {
            x,
            y,
            w,
            h,
            stride,
            coverage: coverage.into(),
            color,
        }
    }

    /// Fully covered `w`x`h` bitmap.
    pub fn solid(x: i32, y: i32, w: i32, h: i32, color: PackedColor) -> Self {
        let len = (w.max(0) as usize) * (h.max(0) as usize);
        Self::new(x, y, w, h, w.max(0) as usize, vec![255u8; len], color)
    }

    pub fn rect(&self) -> IntRect {
        IntRect::from_origin_size(self.x, self.y, self.w, self.h)
    }

    pub fn has_area(&self) -> bool {
        self.w > 0 && self.h > 0
    }

    /// Coverage buffer is large enough for every row the bitmap claims.
    pub(crate) fn is_well_formed(&self) -> bool {
        if !self.has_area() {
            return false;
        }
        let (w, h) = (self.w as usize, self.h as usize);
        self.stride >= w
            && (h - 1)
                .checked_mul(self.stride)
                .and_then(|v| v.checked_add(w))
                .is_some_and(|need| need <= self.coverage.len())
    }

    pub(crate) fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.coverage[start..start + self.w as usize]
    }
}

/// How the engine's output moved since the previous `render_frame` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageChange {
    /// Identical to the previous call.
    #[default]
    None,
    /// Same glyphs, different positions.
    Position,
    /// Different content.
    Content,
}

impl ImageChange {
    pub fn is_changed(self) -> bool {
        self != ImageChange::None
    }
}

/// Image list produced for one timestamp, in drawing order.
#[derive(Clone, Debug, Default)]
pub struct RenderedFrame {
    pub images: Vec<Bitmap>,
    pub change: ImageChange,
}

/// Glyph hinting mode requested from the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Hinting {
    /// Required for smooth incremental image updates.
    #[default]
    None,
    Light,
    Normal,
}

/// One-shot configuration handed to the engine factory.
#[derive(Clone, Debug)]
pub struct EngineSetup {
    /// Embedded fonts that passed the font filter.
    pub fonts: Vec<FontAttachment>,
    /// Additional directory to scan for fonts.
    pub fonts_dir: Option<PathBuf>,
    /// Fallback font file, if the platform ships a known one.
    pub default_font: Option<PathBuf>,
    /// Fallback font family.
    pub default_family: String,
    pub extract_fonts: bool,
    pub use_margins: bool,
    pub font_scale: f64,
    pub line_spacing: f64,
    pub hinting: Hinting,
}

/// Text-layout engine contract.
///
/// Implementations live behind the shared lock; every method is called with the lock held.
pub trait LayoutEngine: Send + 'static {
    /// Feed the track header (codec private data). Called once, before any chunk.
    fn process_codec_private(&mut self, data: &[u8]);

    /// Apply header compatibility overrides. Called at most once, before any chunk.
    fn apply_overrides(&mut self, overrides: &ScriptOverrides);

    /// Feed one event chunk.
    fn process_chunk(&mut self, data: &[u8], start_ms: i64, duration_ms: i64);

    /// Push new frame geometry.
    fn configure_frame(&mut self, mapping: &FrameMapping);

    /// Image list at `now_ms`.
    fn render_frame(&mut self, now_ms: i64) -> RenderedFrame;
}

#[cfg(test)]
#[path = "../../tests/unit/layout/mod.rs"]
mod tests;
