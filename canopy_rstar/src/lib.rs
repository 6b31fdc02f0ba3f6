// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_rstar --heading-base-level=0

//! Canopy R*: a Kurbo-native, in-memory R*-tree over 2D AABBs.
//!
//! Canopy R* is a reusable building block for range queries over axis-aligned
//! bounding boxes with user payloads.
//!
//! - Insert and delete entries (an AABB plus an opaque payload).
//! - Search by intersecting rectangle or containing point.
//! - Balanced maintenance in the R* style: subtree choice by least sibling
//!   overlap, splits choosing an axis by perimeter and a cut by overlap, and
//!   forced reinsertion of outliers before a node is split.
//! - Deletion condenses underfull nodes by reinserting their entries from the
//!   root, keeping the tree tight under churn.
//!
//! The index is memory-resident and single-threaded: there is no paging, no
//! internal locking, and no bulk-load path. Callers needing shared access
//! must serialize externally.
//!
//! # Example
//!
//! ```rust
//! use canopy_rstar::{Entry, RStarTree};
//! use kurbo::Rect;
//!
//! let mut tree = RStarTree::with_max_elements(4);
//! tree.insert(Entry::new(Rect::new(0.0, 0.0, 10.0, 10.0), 1_u32));
//! tree.insert(Entry::new(Rect::new(20.0, 0.0, 30.0, 10.0), 2));
//! tree.insert(Entry::new(Rect::new(0.0, 20.0, 10.0, 30.0), 3));
//!
//! // Range search appends every entry whose bounds intersect the query.
//! let mut hits = Vec::new();
//! tree.search(Rect::new(5.0, 5.0, 25.0, 8.0), &mut hits);
//! assert_eq!(hits.len(), 2);
//!
//! // Deletion matches on payload within subtrees touching the bounds.
//! assert!(tree.delete(&Entry::new(Rect::new(20.0, 0.0, 30.0, 10.0), 2)));
//! assert_eq!(tree.query_rect(Rect::new(0.0, 0.0, 40.0, 40.0)).count(), 2);
//! ```
//!
//! # Queries are index tests
//!
//! [`RStarTree::search`] performs bounding-box intersection only. Callers
//! whose payloads carry exact geometry must re-test the returned candidates
//! themselves; this crate is the acceleration structure, not the filter.
//!
//! # Float semantics
//!
//! Coordinates are finite `f64`; entry boundaries with NaN or infinite
//! coordinates are a caller contract violation and are not validated. The
//! all-NaN rectangle is reserved for the bound of an empty node and never
//! escapes through the public API.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod mbr;
mod node;
mod split;
mod tree;
mod types;

pub use tree::RStarTree;
pub use types::Entry;
