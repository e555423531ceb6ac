//! subrast composites subtitle overlays.
//!
//! A text-layout engine turns styled subtitle events into many small single-colored coverage
//! bitmaps per video frame. subrast clusters those into a few rectangular regions and rasterizes
//! each region into an RGBA8 buffer the display pipeline can blend over video.
//!
//! - [`build_regions`] groups bitmaps into at most `K` rectangles, growing clusters with
//!   frame-relative margins and merging the cheapest pair whenever the bound is exceeded.
//! - [`draw_region`] composites every fully contained bitmap into a region buffer with
//!   bit-reproducible integer blending.
//! - [`SubtitleDecoder`] feeds track data into a shared [`LayoutEngine`] and hands out
//!   [`OverlayUnit`]s; [`OverlayUnit::update`] only rebuilds regions when the engine output or
//!   the frame geometry changed.
#![forbid(unsafe_code)]

mod config;
mod foundation;
mod layout;
mod region;
mod session;

pub use crate::config::{DecoderOpts, FontAttachment};
pub use crate::foundation::core::{FrameGeometry, FrameMapping, Tick, VideoFormat};
pub use crate::foundation::error::{SubError, SubResult};
pub use crate::layout::compat::{LEGACY_PRODUCER_SIGNATURE, legacy_script_overrides};
pub use crate::layout::replay::{
    BitmapSpec, ReplayChunk, ReplayEngine, ReplayScript, ScriptEvent,
};
pub use crate::layout::{
    Bitmap, EngineSetup, Hinting, ImageChange, LayoutEngine, PackedColor, RenderedFrame,
    ScriptOverrides, YCbCrMatrix,
};
pub use crate::region::builder::{DEFAULT_MAX_REGIONS, RegionMargins, build_regions, merge_cost};
pub use crate::region::raster::{RasterOpts, Region, blend_pixel, draw_region};
pub use crate::region::rect::IntRect;
pub use crate::session::decoder::{SubtitleBlock, SubtitleCodec, SubtitleDecoder, TrackFormat};
pub use crate::session::overlay::{OverlayUnit, UpdateOutcome, UpdateRequest};
