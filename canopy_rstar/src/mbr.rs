// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimum-bounding-rectangle helpers over [`kurbo::Rect`].
//!
//! A node with no descendants carries the all-NaN [`EMPTY`] rectangle. Every
//! predicate here is written so that `EMPTY` never intersects or contains
//! anything, while [`union`] treats it as the identity element. Caller-supplied
//! rectangles are assumed finite; only node MBRs may be empty.

use kurbo::{Point, Rect};

/// The empty MBR: the bound of zero rectangles.
pub(crate) const EMPTY: Rect = Rect::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN);

/// Whether `r` is the empty MBR.
#[inline]
pub(crate) fn is_empty(r: &Rect) -> bool {
    r.x0.is_nan()
}

/// Tight bound of two rectangles. `EMPTY` is the identity on either side:
/// `f64::min`/`f64::max` ignore the NaN operand.
#[inline]
pub(crate) fn union(a: Rect, b: Rect) -> Rect {
    Rect::new(
        a.x0.min(b.x0),
        a.y0.min(b.y0),
        a.x1.max(b.x1),
        a.y1.max(b.y1),
    )
}

/// Tight bound of a sequence of rectangles, `EMPTY` if the sequence is empty.
#[inline]
pub(crate) fn union_all(rects: impl Iterator<Item = Rect>) -> Rect {
    rects.fold(EMPTY, union)
}

/// Closed-boundary intersection test; false whenever either side is `EMPTY`
/// (NaN comparisons are false).
#[inline]
pub(crate) fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Whether `outer` fully contains `inner`; false whenever either is `EMPTY`.
#[inline]
pub(crate) fn contains(outer: &Rect, inner: &Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Area of the intersection of two rectangles, 0 when disjoint or empty.
#[inline]
pub(crate) fn overlap_area(a: &Rect, b: &Rect) -> f64 {
    if is_empty(a) || is_empty(b) {
        return 0.0;
    }
    let w = (a.x1.min(b.x1) - a.x0.max(b.x0)).max(0.0);
    let h = (a.y1.min(b.y1) - a.y0.max(b.y0)).max(0.0);
    w * h
}

/// Perimeter of a rectangle, 0 for `EMPTY`.
#[inline]
pub(crate) fn perimeter(r: &Rect) -> f64 {
    if is_empty(r) {
        return 0.0;
    }
    2.0 * (r.width() + r.height())
}

/// Squared distance between two points. Comparing squared distances avoids
/// `sqrt`, which keeps the crate free of `libm` in no_std builds.
#[inline]
pub(crate) fn dist_sq(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}
