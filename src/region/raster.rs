use crate::layout::Bitmap;
use crate::region::rect::IntRect;

/// Rectangular RGBA8 surface positioned in absolute destination coordinates.
///
/// Color channels hold straight color; the alpha channel is the coverage the compositor blends
/// with downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub rect: IntRect,
    /// Bytes per row.
    pub stride: usize,
    pub data: Vec<u8>,
}

impl Region {
    /// Allocate a zeroed surface for `rect`. Returns `None` when the buffer cannot be allocated.
    pub fn alloc(rect: IntRect) -> Option<Self> {
        let stride = usize::try_from(rect.width()).ok()?.checked_mul(4)?;
        let len = stride.checked_mul(usize::try_from(rect.height()).ok()?)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).ok()?;
        data.resize(len, 0);
        Some(Self { rect, stride, data })
    }

    pub fn width(&self) -> u32 {
        self.rect.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.rect.height() as u32
    }

    /// Pixel at region-local coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = y as usize * self.stride + x as usize * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// Drawing options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterOpts {
    /// Frame the region with opaque black, for inspecting region layout.
    pub outline: bool,
}

/// Clear `region` and composite every bitmap that lies entirely inside it, in list order.
///
/// Bitmaps that are only partially inside are skipped, not clipped: the builder grows regions to
/// cover every bitmap it assigns, so a partial overlap belongs to another region.
pub fn draw_region(region: &mut Region, images: &[Bitmap], opts: RasterOpts) {
    region.data.fill(0);

    for img in images {
        if !img.is_well_formed() {
            continue;
        }
        let Some((dx, dy)) = placement(region.rect, img) else {
            continue;
        };
        let alpha = img.color.alpha();
        if alpha == 0 {
            continue;
        }
        let rgb = img.color.rgb();

        for y in 0..img.h as usize {
            let row_start = (dy + y) * region.stride + dx * 4;
            let dst_row = &mut region.data[row_start..row_start + img.w as usize * 4];
            for (dst, &coverage) in dst_row.chunks_exact_mut(4).zip(img.row(y)) {
                if coverage == 0 {
                    continue;
                }
                let out = blend_pixel([dst[0], dst[1], dst[2], dst[3]], rgb, alpha, coverage);
                dst.copy_from_slice(&out);
            }
        }
    }

    if opts.outline {
        draw_outline(region);
    }
}

/// Offset of `img` inside `rect`, or `None` unless its full extent fits. Extents are measured in
/// `i64` so bitmaps running past the edge of the `i32` plane are rejected.
fn placement(rect: IntRect, img: &Bitmap) -> Option<(usize, usize)> {
    let (x, y) = (i64::from(img.x), i64::from(img.y));
    let fits = x >= i64::from(rect.x0)
        && y >= i64::from(rect.y0)
        && x + i64::from(img.w) <= i64::from(rect.x1)
        && y + i64::from(img.h) <= i64::from(rect.y1);
    if !fits {
        return None;
    }
    let dx = usize::try_from(x - i64::from(rect.x0)).ok()?;
    let dy = usize::try_from(y - i64::from(rect.y0)).ok()?;
    Some((dx, dy))
}

/// Composite one source sample over `dst`.
///
/// `alpha` is the bitmap's opacity (inversion already undone), `coverage` the bitmap's byte for
/// this pixel. All arithmetic is truncating integer math in a fixed order so output is
/// bit-reproducible.
pub fn blend_pixel(dst: [u8; 4], rgb: [u8; 3], alpha: u8, coverage: u8) -> [u8; 4] {
    if coverage == 0 {
        return dst;
    }
    let an = u32::from(alpha) * u32::from(coverage) / 255;
    let ao = u32::from(dst[3]);
    if ao == 0 {
        return [rgb[0], rgb[1], rgb[2], an as u8];
    }

    let ani = 255 - an;
    let a_new = 255 - (255 - ao) * ani / 255;
    let mut out = dst;
    out[3] = a_new as u8;
    if a_new != 0 {
        let aoni = ao * ani / 255;
        for c in 0..3 {
            out[c] = ((u32::from(dst[c]) * aoni + u32::from(rgb[c]) * an) / a_new) as u8;
        }
    }
    out
}

fn draw_outline(region: &mut Region) {
    const BLACK: [u8; 4] = [0, 0, 0, 255];
    let (w, h) = (region.width() as usize, region.height() as usize);
    if w == 0 || h == 0 {
        return;
    }
    let stride = region.stride;
    let mut put = |x: usize, y: usize| {
        let i = y * stride + x * 4;
        region.data[i..i + 4].copy_from_slice(&BLACK);
    };
    for y in 0..h {
        put(0, y);
        put(w - 1, y);
    }
    for x in 0..w {
        put(x, 0);
        put(x, h - 1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/region/raster.rs"]
mod tests;
