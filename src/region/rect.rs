/// Half-open axis-aligned integer rectangle `[x0, x1) x [y0, y1)`.
///
/// Always normalized: `x0 <= x1` and `y0 <= y1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IntRect {
    /// Left edge (inclusive).
    pub x0: i32,
    /// Top edge (inclusive).
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl IntRect {
    /// Build a rectangle from two corners, normalizing their order.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Rectangle anchored at `(x, y)` with the given size. Negative sizes collapse to empty.
    pub fn from_origin_size(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add(w.max(0)),
            y1: y.saturating_add(h.max(0)),
        }
    }

    /// Horizontal extent, widened so the full `i32` span fits.
    pub fn width(self) -> i64 {
        i64::from(self.x1) - i64::from(self.x0)
    }

    pub fn height(self) -> i64 {
        i64::from(self.y1) - i64::from(self.y0)
    }

    /// Smallest rectangle containing both.
    pub fn union(self, other: IntRect) -> IntRect {
        IntRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Saturates at `i64::MAX` for spans covering most of the `i32` plane.
    pub fn area(self) -> i64 {
        self.width().saturating_mul(self.height())
    }

    /// True iff `self` grown by `dx`/`dy` on every side intersects `other` with non-zero extent
    /// on both axes. Touching edges do not count.
    pub fn overlaps(self, other: IntRect, dx: i32, dy: i32) -> bool {
        let (dx, dy) = (i64::from(dx), i64::from(dy));
        let axis = |a0: i32, a1: i32, b0: i32, b1: i32, d: i64| {
            (i64::from(a0) - d).max(i64::from(b0)) < (i64::from(a1) + d).min(i64::from(b1))
        };
        axis(self.x0, self.x1, other.x0, other.x1, dx)
            && axis(self.y0, self.y1, other.y0, other.y1, dy)
    }

    /// True iff `other` lies entirely inside `self`.
    pub fn contains_rect(self, other: IntRect) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }
}

#[cfg(test)]
#[path = "../../tests/unit/region/rect.rs"]
mod tests;
