// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena node: the Leaf/Branch tagged union with shared geometry fields.

use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::Rect;

use crate::mbr;
use crate::types::{Entry, NodeIdx};

/// The variant-specific contents of a node.
#[derive(Debug)]
pub(crate) enum NodeKind<P> {
    /// Terminal node holding caller entries.
    Leaf(Vec<Entry<P>>),
    /// Interior node holding arena indices of its children.
    Branch(Vec<NodeIdx>),
}

/// A tree node. Owned by exactly one parent branch (or by the tree when it is
/// the root); `parent` is an advisory back-reference used to walk upward
/// during condensation and is rewritten together with the owning child list.
#[derive(Debug)]
pub(crate) struct Node<P> {
    /// Cached tight bound of everything beneath this node, [`mbr::EMPTY`]
    /// when the node holds nothing.
    pub(crate) mbr: Rect,
    pub(crate) parent: Option<NodeIdx>,
    pub(crate) kind: NodeKind<P>,
}

impl<P: Copy + Debug> Node<P> {
    /// Leaf node over `entries`, MBR computed from their bounds.
    pub(crate) fn leaf(entries: Vec<Entry<P>>) -> Self {
        let mbr = mbr::union_all(entries.iter().map(|e| e.bounds));
        Self {
            mbr,
            parent: None,
            kind: NodeKind::Leaf(entries),
        }
    }

    /// Branch node over `children`. The MBR starts empty; the tree recomputes
    /// it once the children are linked, since child bounds live in the arena.
    pub(crate) fn branch(children: Vec<NodeIdx>) -> Self {
        Self {
            mbr: mbr::EMPTY,
            parent: None,
            kind: NodeKind::Branch(children),
        }
    }

    /// Number of entries (leaf) or children (branch).
    pub(crate) fn element_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(entries) => entries.len(),
            NodeKind::Branch(children) => children.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    pub(crate) fn is_branch(&self) -> bool {
        matches!(self.kind, NodeKind::Branch(_))
    }
}
