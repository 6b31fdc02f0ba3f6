// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public entry type and internal node handles.

use kurbo::Rect;

/// An indexed item: an axis-aligned boundary paired with an opaque payload.
///
/// Entries are supplied by the caller and never mutated by the tree. The
/// payload is what [`delete`](crate::RStarTree::delete) matches on; the tree
/// itself only ever reads `bounds`. Boundaries are assumed finite (no NaN or
/// infinite coordinates) with `x0 <= x1` and `y0 <= y1`; the tree does not
/// validate this.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Entry<P> {
    /// Axis-aligned bounding box of the item.
    pub bounds: Rect,
    /// Caller-meaningful identifier carried through queries.
    pub payload: P,
}

impl<P> Entry<P> {
    /// Create an entry from a boundary and payload.
    pub const fn new(bounds: Rect, payload: P) -> Self {
        Self { bounds, payload }
    }
}

/// Index of a node slot in the tree's arena.
///
/// Plain (non-generational) because it never crosses the crate boundary: the
/// tree rewrites every stored `NodeIdx` in the same step that restructures
/// the slots they point at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(u32);

impl NodeIdx {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Node slots are intentionally 32-bit indices."
    )]
    pub(crate) const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Coordinate axis considered by split planning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
}
