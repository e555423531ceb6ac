use std::ops::{Add, Sub};

/// Presentation timestamp in microseconds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Tick(pub i64);

impl Tick {
    /// Build a timestamp from milliseconds.
    pub fn from_millis(ms: i64) -> Self {
        Self(ms.saturating_mul(1000))
    }

    /// Truncating conversion to milliseconds, the unit the layout engine works in.
    pub fn as_millis(self) -> i64 {
        self.0 / 1000
    }
}

impl Add for Tick {
    type Output = Tick;

    fn add(self, rhs: Tick) -> Tick {
        Tick(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Tick {
    type Output = Tick;

    fn sub(self, rhs: Tick) -> Tick {
        Tick(self.0.saturating_sub(rhs.0))
    }
}

/// Video plane description as negotiated by the display pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoFormat {
    /// Full (storage) width in pixels.
    pub width: u32,
    /// Full (storage) height in pixels.
    pub height: u32,
    /// Visible width in pixels.
    pub visible_width: u32,
    /// Visible height in pixels.
    pub visible_height: u32,
    /// Horizontal offset of the visible area.
    #[serde(default)]
    pub x_offset: u32,
    /// Vertical offset of the visible area.
    #[serde(default)]
    pub y_offset: u32,
    /// Sample aspect ratio numerator.
    #[serde(default = "one")]
    pub sar_num: u32,
    /// Sample aspect ratio denominator.
    #[serde(default = "one")]
    pub sar_den: u32,
}

fn one() -> u32 {
    1
}

impl VideoFormat {
    /// Square-pixel format whose visible area covers the whole plane.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            visible_width: width,
            visible_height: height,
            x_offset: 0,
            y_offset: 0,
            sar_num: 1,
            sar_den: 1,
        }
    }

    /// Two formats are similar when a surface laid out for one is valid for the other.
    pub fn is_similar(&self, other: &VideoFormat) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.visible_width == other.visible_width
            && self.visible_height == other.visible_height
            && self.x_offset == other.x_offset
            && self.y_offset == other.y_offset
            && u64::from(self.sar_num) * u64::from(other.sar_den)
                == u64::from(other.sar_num) * u64::from(self.sar_den)
    }

    fn visible_ratio(&self) -> f64 {
        f64::from(self.visible_width) / f64::from(self.visible_height)
    }
}

/// Source and destination geometry for one render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameGeometry {
    /// Geometry the subtitle track was authored against (the decoded video).
    pub src: VideoFormat,
    /// Geometry of the surface the regions are composited onto.
    pub dst: VideoFormat,
}

impl FrameGeometry {
    /// Same format on both sides.
    pub fn uniform(width: u32, height: u32) -> Self {
        Self {
            src: VideoFormat::new(width, height),
            dst: VideoFormat::new(width, height),
        }
    }

    /// Whether the layout engine must be reconfigured when moving from `prev` to `self`.
    pub fn differs_from(&self, prev: Option<&FrameGeometry>) -> bool {
        let Some(prev) = prev else {
            return true;
        };
        let src_changed = self.src.visible_width != prev.src.visible_width
            || self.src.visible_height != prev.src.visible_height;
        src_changed || !prev.dst.is_similar(&self.dst)
    }

    /// Coordinate mapping pushed into the layout engine.
    pub fn mapping(&self) -> FrameMapping {
        let ratio = self.dst.visible_ratio() / self.src.visible_ratio();
        FrameMapping {
            frame_width: self.dst.visible_width,
            frame_height: self.dst.visible_height,
            storage_width: self.src.visible_width,
            storage_height: self.src.visible_height,
            pixel_aspect: if ratio.is_finite() && ratio > 0.0 {
                ratio
            } else {
                1.0
            },
        }
    }
}

/// Frame size, storage size and pixel aspect ratio for the layout engine.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameMapping {
    /// Output frame width.
    pub frame_width: u32,
    /// Output frame height.
    pub frame_height: u32,
    /// Width of the video the script was authored against.
    pub storage_width: u32,
    /// Height of the video the script was authored against.
    pub storage_height: u32,
    /// `(dst_w / dst_h) / (src_w / src_h)`.
    pub pixel_aspect: f64,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
