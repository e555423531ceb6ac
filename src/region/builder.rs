//! Clusters one frame's bitmaps into a bounded set of update regions.
//!
//! The layout engine emits many small fragments (one per glyph, border, shadow). Every region
//! costs a buffer allocation and a scaler setup downstream, so fragments close to each other
//! are grown into a shared rectangle, and when more than `max_regions` rectangles exist the
//! pair whose union wastes the least area is merged.

use smallvec::SmallVec;

use crate::layout::Bitmap;
use crate::region::rect::IntRect;

/// Region count bound used when none is configured.
pub const DEFAULT_MAX_REGIONS: usize = 4;

const MIN_MARGIN: i32 = 32;

/// Adjacency margins used by the growth step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionMargins {
    /// Horizontal inflation: `max(ceil(width / 50), 32)`.
    pub dx: i32,
    /// Vertical inflation: `max(ceil(height / 100), 32)`.
    pub dy: i32,
}

impl RegionMargins {
    pub fn for_frame(width: u32, height: u32) -> Self {
        let ceil_div = |v: u32, d: u32| i32::try_from(v.div_ceil(d)).unwrap_or(i32::MAX);
        Self {
            dx: ceil_div(width, 50).max(MIN_MARGIN),
            dy: ceil_div(height, 100).max(MIN_MARGIN),
        }
    }
}

type Working = SmallVec<[IntRect; DEFAULT_MAX_REGIONS + 1]>;

/// Build at most `max_regions` rectangles covering every bitmap with positive area.
///
/// `frame_width`/`frame_height` are the full destination plane size and only drive the margins.
/// Returns an empty list when no bitmap has area, or when scratch space cannot be allocated.
pub fn build_regions(
    images: &[Bitmap],
    max_regions: usize,
    frame_width: u32,
    frame_height: u32,
) -> Vec<IntRect> {
    let max_regions = max_regions.max(1);

    let count = images.iter().filter(|b| b.has_area()).count();
    if count == 0 {
        return Vec::new();
    }

    let mut pending: Vec<Option<IntRect>> = Vec::new();
    if pending.try_reserve_exact(count).is_err() {
        tracing::warn!(count, "cannot allocate region scratch space, dropping frame");
        return Vec::new();
    }
    pending.extend(
        images
            .iter()
            .filter(|b| b.has_area())
            .map(|b| Some(b.rect())),
    );

    let margins = RegionMargins::for_frame(frame_width, frame_height);
    let mut regions = Working::new();

    let mut used = 0;
    while used < count {
        let Some(seed) = pending.iter_mut().find_map(Option::take) else {
            break;
        };
        regions.push(seed);
        used += 1;

        used += absorb_neighbors(&mut regions, &mut pending, margins);

        if regions.len() > max_regions {
            merge_cheapest_pair(&mut regions);
        }
    }

    tracing::debug!(
        bitmaps = count,
        regions = regions.len(),
        dx = margins.dx,
        dy = margins.dy,
        "built regions"
    );
    regions.into_vec()
}

/// Sweep pending rectangles into the first region they touch under the margins, until a full
/// sweep absorbs nothing. Returns how many were absorbed.
fn absorb_neighbors(
    regions: &mut Working,
    pending: &mut [Option<IntRect>],
    margins: RegionMargins,
) -> usize {
    let mut absorbed = 0;
    loop {
        let mut grew = false;
        for slot in pending.iter_mut() {
            let Some(r) = *slot else {
                continue;
            };
            if let Some(region) = regions
                .iter_mut()
                .find(|region| region.overlaps(r, margins.dx, margins.dy))
            {
                *region = region.union(r);
                *slot = None;
                absorbed += 1;
                grew = true;
            }
        }
        if !grew {
            return absorbed;
        }
    }
}

/// Merge the pair whose union adds the least area. Ties go to the first pair in `(i, j)` scan
/// order; the merged rectangle takes slot `i` and later regions shift down.
fn merge_cheapest_pair(regions: &mut Working) {
    let mut best: Option<(usize, usize, i64)> = None;
    for i in 0..regions.len() {
        for j in i + 1..regions.len() {
            let growth = merge_cost(regions[i], regions[j]);
            if best.is_none_or(|(_, _, b)| growth < b) {
                best = Some((i, j, growth));
            }
        }
    }
    if let Some((i, j, _)) = best {
        regions[i] = regions[i].union(regions[j]);
        regions.remove(j);
    }
}

/// Area added by replacing `a` and `b` with their union. Negative when they already overlap.
pub fn merge_cost(a: IntRect, b: IntRect) -> i64 {
    a.union(b).area().saturating_sub(a.area()).saturating_sub(b.area())
}

#[cfg(test)]
#[path = "../../tests/unit/region/builder.rs"]
mod tests;
