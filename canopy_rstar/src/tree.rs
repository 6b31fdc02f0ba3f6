// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The R*-tree: arena storage, insertion with forced reinsertion, deletion
//! with condensation, and pruned range search.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Point, Rect};

use crate::mbr;
use crate::node::{Node, NodeKind};
use crate::split;
use crate::types::{Entry, NodeIdx};

/// Fraction of the larger MBR dimension beyond which an element counts as an
/// outlier during forced reinsertion.
const REINSERT_RADIUS_FACTOR: f64 = 0.3;

/// An in-memory R*-tree over 2D axis-aligned bounding boxes.
///
/// Nodes live in a slot arena owned by the tree; child lists hold arena
/// indices and every node keeps an advisory index of its parent for the
/// upward walk during condensation. The tree is single-threaded: callers
/// needing shared access must serialize externally.
pub struct RStarTree<P: Copy + Debug> {
    nodes: Vec<Option<Node<P>>>,
    free_list: Vec<usize>,
    root: Option<NodeIdx>,
    max_elements: usize,
    len: usize,
}

impl<P: Copy + Debug> Default for RStarTree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy + Debug> Debug for RStarTree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("RStarTree")
            .field("len", &self.len)
            .field("max_elements", &self.max_elements)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("has_root", &self.root.is_some())
            .finish_non_exhaustive()
    }
}

impl<P: Copy + Debug> RStarTree<P> {
    /// Default fan-out bound.
    pub const DEFAULT_MAX_ELEMENTS: usize = 8;

    /// Create an empty tree with the default fan-out bound.
    pub fn new() -> Self {
        Self::with_max_elements(Self::DEFAULT_MAX_ELEMENTS)
    }

    /// Create an empty tree holding at most `max_elements` entries per leaf
    /// and children per branch.
    ///
    /// Panics if `max_elements < 4`; smaller bounds leave the split planner
    /// no candidate range.
    pub fn with_max_elements(max_elements: usize) -> Self {
        assert!(max_elements >= 4, "fan-out bound must be at least 4");
        Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            root: None,
            max_elements,
            len: 0,
        }
    }

    /// Number of entries currently indexed.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The fan-out bound supplied at construction.
    pub fn max_elements(&self) -> usize {
        self.max_elements
    }

    /// Remove every entry and release all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.root = None;
        self.len = 0;
    }

    /// Insert an entry.
    ///
    /// Never fails for finite, well-formed boundaries. NaN or infinite
    /// coordinates in `entry.bounds` are a caller contract violation.
    pub fn insert(&mut self, entry: Entry<P>) {
        self.len += 1;
        self.insert_impl(entry, true);
    }

    /// Remove the first entry whose payload equals `entry.payload`, looking
    /// only inside subtrees whose MBR intersects `entry.bounds`. Returns
    /// whether an entry was removed; deleting an absent entry is a no-op.
    pub fn delete(&mut self, entry: &Entry<P>) -> bool
    where
        P: PartialEq,
    {
        let Some(root) = self.root else {
            return false;
        };
        let Some(leaf) = self.delete_at(root, entry) else {
            return false;
        };
        self.len -= 1;
        // Structural condensation first; displaced entries go back in only
        // once the ancestor chain has settled.
        let mut orphans = Vec::new();
        self.trim_from(leaf, &mut orphans);
        self.collapse_root();
        for e in orphans {
            self.insert_impl(e, true);
        }
        true
    }

    /// Append every entry whose bounds intersect `query` to `out`.
    ///
    /// This is a bounding-box test, not an exact geometry test: callers
    /// needing exact intersection must re-test the payloads.
    pub fn search(&self, query: Rect, out: &mut Vec<Entry<P>>) {
        if let Some(root) = self.root {
            self.search_at(root, &query, out);
        }
    }

    /// Entries whose bounds intersect the given rectangle.
    pub fn query_rect(&self, rect: Rect) -> impl Iterator<Item = Entry<P>> + '_ {
        let mut out = Vec::new();
        self.search(rect, &mut out);
        out.into_iter()
    }

    /// Entries whose bounds contain the given point.
    pub fn query_point(&self, pt: Point) -> impl Iterator<Item = Entry<P>> + '_ {
        self.query_rect(Rect::new(pt.x, pt.y, pt.x, pt.y))
    }

    // --- arena ---

    fn node(&self, idx: NodeIdx) -> &Node<P> {
        self.nodes[idx.idx()].as_ref().expect("dangling NodeIdx")
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<P> {
        self.nodes[idx.idx()].as_mut().expect("dangling NodeIdx")
    }

    fn alloc(&mut self, node: Node<P>) -> NodeIdx {
        if let Some(slot) = self.free_list.pop() {
            self.nodes[slot] = Some(node);
            NodeIdx::new(slot)
        } else {
            self.nodes.push(Some(node));
            NodeIdx::new(self.nodes.len() - 1)
        }
    }

    fn free(&mut self, idx: NodeIdx) {
        let slot = self.nodes.get_mut(idx.idx()).expect("NodeIdx within arena");
        debug_assert!(slot.is_some(), "double free of a node slot");
        *slot = None;
        self.free_list.push(idx.idx());
    }

    /// Recompute the cached MBR of `idx` from its current elements.
    fn recompute_mbr(&mut self, idx: NodeIdx) {
        let bound = match &self.node(idx).kind {
            NodeKind::Leaf(entries) => mbr::union_all(entries.iter().map(|e| e.bounds)),
            NodeKind::Branch(children) => {
                mbr::union_all(children.iter().map(|&c| self.node(c).mbr))
            }
        };
        self.node_mut(idx).mbr = bound;
    }

    /// Point every child of the branch `idx` back at it.
    fn adopt_children(&mut self, idx: NodeIdx) {
        let kids: Vec<NodeIdx> = match &self.node(idx).kind {
            NodeKind::Branch(children) => children.clone(),
            NodeKind::Leaf(_) => return,
        };
        for k in kids {
            self.node_mut(k).parent = Some(idx);
        }
    }

    // --- insert ---

    fn insert_impl(&mut self, entry: Entry<P>, allow_reinsert: bool) {
        if let Some(root) = self.root {
            if !self.node(root).is_empty() {
                // Entries displaced by overflow treatment re-enter from the
                // root only after the descent has fully unwound: a reinsertion
                // started mid-descent could split and free nodes the suspended
                // frames still hold indices of.
                let mut displaced = Vec::new();
                self.insert_at(root, entry, allow_reinsert, &mut displaced);
                self.resolve_root_overflow();
                for e in displaced {
                    self.insert_impl(e, false);
                }
                return;
            }
            // Empty shell left behind by condensation: start over.
            self.free(root);
        }
        let leaf = self.alloc(Node::leaf(vec![entry]));
        self.root = Some(leaf);
    }

    fn insert_at(
        &mut self,
        idx: NodeIdx,
        entry: Entry<P>,
        allow_reinsert: bool,
        displaced: &mut Vec<Entry<P>>,
    ) {
        if !self.node(idx).is_branch() {
            {
                let node = self.node_mut(idx);
                node.mbr = mbr::union(node.mbr, entry.bounds);
                let NodeKind::Leaf(entries) = &mut node.kind else {
                    unreachable!("checked leaf above")
                };
                entries.push(entry);
            }
            if allow_reinsert && self.node(idx).element_count() > self.max_elements {
                self.displace_leaf_outliers(idx, displaced);
            }
            return;
        }

        let chosen = self.choose_subtree(idx, entry.bounds);
        self.insert_at(chosen, entry, allow_reinsert, displaced);

        // Overflow of self: forced reinsertion before any split.
        if allow_reinsert && self.node(idx).element_count() > self.max_elements {
            self.reinsert_branch_outliers(idx);
        }

        // Split overflowing children. Re-read the child list: the reinsertion
        // pass above may have restructured it.
        let overfull: Vec<NodeIdx> = {
            let NodeKind::Branch(children) = &self.node(idx).kind else {
                unreachable!("checked branch above")
            };
            children
                .iter()
                .copied()
                .filter(|&c| self.node(c).element_count() > self.max_elements)
                .collect()
        };
        for child in overfull {
            self.split_child(idx, child);
        }

        // Self overflow persists: the split halves become the only children,
        // growing the tree downward at this node.
        if self.node(idx).element_count() > self.max_elements {
            let (a, b) = self.split_node(idx);
            self.node_mut(a).parent = Some(idx);
            self.node_mut(b).parent = Some(idx);
            let NodeKind::Branch(children) = &mut self.node_mut(idx).kind else {
                unreachable!("checked branch above")
            };
            debug_assert!(children.is_empty(), "split_node drains the children");
            children.push(a);
            children.push(b);
        }

        self.recompute_mbr(idx);
    }

    /// A leaf root has no parent to split it; wrap the halves in a fresh
    /// branch root. Branch roots resolve their own overflow on the way up,
    /// and outlier displacement has already run in the descent, so all that
    /// is left here is the split.
    fn resolve_root_overflow(&mut self) {
        let Some(root) = self.root else { return };
        if self.node(root).element_count() <= self.max_elements {
            return;
        }
        let (a, b) = self.split_node(root);
        self.free(root);
        let branch = self.alloc(Node::branch(vec![a, b]));
        self.node_mut(a).parent = Some(branch);
        self.node_mut(b).parent = Some(branch);
        self.recompute_mbr(branch);
        self.root = Some(branch);
    }

    /// Pick the child of `idx` to receive an entry with the given bounds:
    /// the first child whose MBR already contains them, otherwise the child
    /// whose enlarged MBR overlaps the remaining siblings least, ties broken
    /// by fewest elements, first minimum wins.
    fn choose_subtree(&self, idx: NodeIdx, bounds: Rect) -> NodeIdx {
        let NodeKind::Branch(children) = &self.node(idx).kind else {
            unreachable!("choose_subtree runs on branches")
        };
        for &c in children {
            if mbr::contains(&self.node(c).mbr, &bounds) {
                return c;
            }
        }
        let mut best: Option<(f64, usize, NodeIdx)> = None;
        for &c in children {
            let enlarged = mbr::union(self.node(c).mbr, bounds);
            let mut cost = 0.0;
            for &other in children {
                if other != c {
                    cost += mbr::overlap_area(&enlarged, &self.node(other).mbr);
                }
            }
            let count = self.node(c).element_count();
            let better = match best {
                None => true,
                Some((best_cost, best_count, _)) => {
                    cost < best_cost || (cost == best_cost && count < best_count)
                }
            };
            if better {
                best = Some((cost, count, c));
            }
        }
        best.expect("branch holds at least one child").2
    }

    /// Split the elements of `idx` into two fresh sibling nodes of the same
    /// variant. `idx` itself is left drained; the caller reuses or frees it.
    fn split_node(&mut self, idx: NodeIdx) -> (NodeIdx, NodeIdx) {
        if self.node(idx).is_branch() {
            let children = {
                let NodeKind::Branch(children) = &mut self.node_mut(idx).kind else {
                    unreachable!("checked branch above")
                };
                core::mem::take(children)
            };
            let rects: Vec<Rect> = children.iter().map(|&c| self.node(c).mbr).collect();
            let plan = split::plan_split(&rects, self.max_elements);
            let (left, right) = plan.partition(children);
            let a = self.alloc(Node::branch(left));
            let b = self.alloc(Node::branch(right));
            self.adopt_children(a);
            self.adopt_children(b);
            self.recompute_mbr(a);
            self.recompute_mbr(b);
            (a, b)
        } else {
            let entries = {
                let NodeKind::Leaf(entries) = &mut self.node_mut(idx).kind else {
                    unreachable!("checked leaf above")
                };
                core::mem::take(entries)
            };
            let rects: Vec<Rect> = entries.iter().map(|e| e.bounds).collect();
            let plan = split::plan_split(&rects, self.max_elements);
            let (left, right) = plan.partition(entries);
            let a = self.alloc(Node::leaf(left));
            let b = self.alloc(Node::leaf(right));
            (a, b)
        }
    }

    /// Replace an overflowing child with its two split halves.
    fn split_child(&mut self, parent: NodeIdx, child: NodeIdx) {
        let (a, b) = self.split_node(child);
        self.node_mut(a).parent = Some(parent);
        self.node_mut(b).parent = Some(parent);
        let NodeKind::Branch(children) = &mut self.node_mut(parent).kind else {
            unreachable!("split_child runs on branches")
        };
        let pos = children
            .iter()
            .position(|&c| c == child)
            .expect("child belongs to parent");
        children[pos] = a;
        children.insert(pos + 1, b);
        self.free(child);
    }

    // --- forced reinsertion ---

    /// Eviction zone for forced reinsertion: elements whose centroid lies
    /// farther than 30% of the larger MBR dimension from the MBR centroid.
    fn eviction_zone(bound: Rect) -> (Point, f64) {
        let radius = REINSERT_RADIUS_FACTOR * bound.width().max(bound.height());
        (bound.center(), radius * radius)
    }

    /// Remove outlier entries from an overflowing leaf into `displaced`,
    /// giving them a chance to land in a better subtree when the caller
    /// reinserts them from the root. Displaced entries re-enter with
    /// reinsertion disabled, so one public insert triggers at most one
    /// displacement pass.
    fn displace_leaf_outliers(&mut self, idx: NodeIdx, displaced: &mut Vec<Entry<P>>) {
        let (center, radius_sq) = Self::eviction_zone(self.node(idx).mbr);
        {
            let NodeKind::Leaf(entries) = &mut self.node_mut(idx).kind else {
                unreachable!("leaf displacement runs on leaves")
            };
            let mut outliers = Vec::new();
            let mut kept = Vec::with_capacity(entries.len());
            for e in entries.drain(..) {
                if mbr::dist_sq(e.bounds.center(), center) > radius_sq {
                    outliers.push(e);
                } else {
                    kept.push(e);
                }
            }
            if kept.is_empty() || outliers.is_empty() {
                // Nothing to relocate, or relocation would empty the node;
                // fall through to a split instead.
                kept.append(&mut outliers);
                *entries = kept;
                return;
            }
            *entries = kept;
            displaced.append(&mut outliers);
        }
        self.recompute_mbr(idx);
    }

    /// Branch analogue of forced reinsertion: evicted subtrees are drained to
    /// bare entries, which re-enter from this node rather than the root.
    fn reinsert_branch_outliers(&mut self, idx: NodeIdx) {
        let (center, radius_sq) = Self::eviction_zone(self.node(idx).mbr);
        let (kept, evicted): (Vec<NodeIdx>, Vec<NodeIdx>) = {
            let NodeKind::Branch(children) = &self.node(idx).kind else {
                unreachable!("branch reinsertion runs on branches")
            };
            children
                .iter()
                .copied()
                .partition(|&c| mbr::dist_sq(self.node(c).mbr.center(), center) <= radius_sq)
        };
        if kept.is_empty() || evicted.is_empty() {
            return;
        }
        {
            let NodeKind::Branch(children) = &mut self.node_mut(idx).kind else {
                unreachable!("branch reinsertion runs on branches")
            };
            *children = kept;
        }
        self.recompute_mbr(idx);
        let mut displaced = Vec::new();
        for c in evicted {
            self.drain_entries(c, &mut displaced);
        }
        let mut scratch = Vec::new();
        for e in displaced {
            self.insert_at(idx, e, false, &mut scratch);
        }
        debug_assert!(scratch.is_empty(), "reinsertion passes never displace");
    }

    // --- delete / trim ---

    /// Remove the first payload match beneath `idx`, pruning subtrees whose
    /// MBR misses the target bounds. Returns the leaf that shrank.
    fn delete_at(&mut self, idx: NodeIdx, entry: &Entry<P>) -> Option<NodeIdx>
    where
        P: PartialEq,
    {
        if !mbr::intersects(&self.node(idx).mbr, &entry.bounds) {
            return None;
        }
        if self.node(idx).is_branch() {
            let children: Vec<NodeIdx> = {
                let NodeKind::Branch(children) = &self.node(idx).kind else {
                    unreachable!("checked branch above")
                };
                children.clone()
            };
            for c in children {
                if let Some(leaf) = self.delete_at(c, entry) {
                    return Some(leaf);
                }
            }
            return None;
        }
        let NodeKind::Leaf(entries) = &mut self.node_mut(idx).kind else {
            unreachable!("checked leaf above")
        };
        let pos = entries.iter().position(|e| e.payload == entry.payload)?;
        entries.remove(pos);
        Some(idx)
    }

    /// Condense upward from the leaf a delete shrank: drop emptied children,
    /// collapse lone branch children, rebuild underfull nodes through root
    /// reinsertion, and repair cached bounds up to the root.
    fn trim_from(&mut self, start: NodeIdx, orphans: &mut Vec<Entry<P>>) {
        let mut cur = start;
        loop {
            let parent = self.node(cur).parent;
            let emptied = self.trim_node(cur, orphans);
            match parent {
                Some(p) if emptied => cur = p,
                _ => break,
            }
        }
        let mut up = self.node(cur).parent;
        while let Some(p) = up {
            self.recompute_mbr(p);
            up = self.node(p).parent;
        }
    }

    /// One condensation step. Returns whether `idx` ended up empty (which
    /// propagates the trim to its parent).
    fn trim_node(&mut self, idx: NodeIdx, orphans: &mut Vec<Entry<P>>) -> bool {
        if self.node(idx).is_branch() {
            // Drop children that have become empty.
            let empties: Vec<NodeIdx> = {
                let NodeKind::Branch(children) = &self.node(idx).kind else {
                    unreachable!("checked branch above")
                };
                children
                    .iter()
                    .copied()
                    .filter(|&c| self.node(c).is_empty())
                    .collect()
            };
            if !empties.is_empty() {
                {
                    let NodeKind::Branch(children) = &mut self.node_mut(idx).kind else {
                        unreachable!("checked branch above")
                    };
                    children.retain(|c| !empties.contains(c));
                }
                for c in empties {
                    self.free(c);
                }
            }

            // A lone branch child is spliced away to keep the tree shallow.
            let lone_branch = {
                let NodeKind::Branch(children) = &self.node(idx).kind else {
                    unreachable!("checked branch above")
                };
                match children[..] {
                    [only] if self.node(only).is_branch() => Some(only),
                    _ => None,
                }
            };
            if let Some(child) = lone_branch {
                let grandchildren = {
                    let NodeKind::Branch(kids) = &mut self.node_mut(child).kind else {
                        unreachable!("lone_branch checked the variant")
                    };
                    core::mem::take(kids)
                };
                {
                    let NodeKind::Branch(children) = &mut self.node_mut(idx).kind else {
                        unreachable!("checked branch above")
                    };
                    *children = grandchildren;
                }
                self.adopt_children(idx);
                self.free(child);
            }
        }

        // Underflow: trade local merging for a global rebuild of this
        // subtree's entries.
        if self.node(idx).element_count() <= self.max_elements / 3 {
            self.condense(idx, orphans);
        }

        self.recompute_mbr(idx);
        self.node(idx).is_empty()
    }

    /// Empty `idx`, collecting every descendant entry for reinsertion.
    fn condense(&mut self, idx: NodeIdx, orphans: &mut Vec<Entry<P>>) {
        if self.node(idx).is_branch() {
            let children = {
                let NodeKind::Branch(children) = &mut self.node_mut(idx).kind else {
                    unreachable!("checked branch above")
                };
                core::mem::take(children)
            };
            for c in children {
                self.drain_entries(c, orphans);
            }
        } else {
            let NodeKind::Leaf(entries) = &mut self.node_mut(idx).kind else {
                unreachable!("checked leaf above")
            };
            let mut entries = core::mem::take(entries);
            orphans.append(&mut entries);
        }
    }

    /// Free the subtree rooted at `idx`, appending its entries to `out`.
    fn drain_entries(&mut self, idx: NodeIdx, out: &mut Vec<Entry<P>>) {
        let node = self
            .nodes
            .get_mut(idx.idx())
            .and_then(|slot| slot.take())
            .expect("dangling NodeIdx");
        self.free_list.push(idx.idx());
        match node.kind {
            NodeKind::Leaf(mut entries) => out.append(&mut entries),
            NodeKind::Branch(children) => {
                for c in children {
                    self.drain_entries(c, out);
                }
            }
        }
    }

    /// Promote the sole child of a single-child branch root, collapsing one
    /// level.
    fn collapse_root(&mut self) {
        while let Some(root) = self.root {
            let lone = match &self.node(root).kind {
                NodeKind::Branch(children) if children.len() == 1 => Some(children[0]),
                _ => None,
            };
            let Some(child) = lone else { break };
            self.node_mut(child).parent = None;
            self.free(root);
            self.root = Some(child);
        }
    }

    // --- search ---

    fn search_at(&self, idx: NodeIdx, query: &Rect, out: &mut Vec<Entry<P>>) {
        let node = self.node(idx);
        if !mbr::intersects(&node.mbr, query) {
            return;
        }
        match &node.kind {
            NodeKind::Leaf(entries) => {
                for e in entries {
                    if mbr::intersects(&e.bounds, query) {
                        out.push(*e);
                    }
                }
            }
            NodeKind::Branch(children) => {
                for &c in children {
                    self.search_at(c, query, out);
                }
            }
        }
    }
}
