// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R*-tree basics.
//!
//! Build a small index, search a window, and delete an entry.
//!
//! Run:
//! - `cargo run -p canopy_demos --example rstar_basics`

use canopy_rstar::{Entry, RStarTree};
use kurbo::Rect;

fn main() {
    let mut tree = RStarTree::with_max_elements(4);

    // A handful of features: two near the origin, two far away.
    tree.insert(Entry::new(Rect::new(0.0, 0.0, 1.0, 1.0), "pond"));
    tree.insert(Entry::new(Rect::new(2.0, 2.0, 3.0, 3.0), "meadow"));
    tree.insert(Entry::new(Rect::new(10.0, 10.0, 11.0, 11.0), "ridge"));
    tree.insert(Entry::new(Rect::new(12.0, 12.0, 13.0, 13.0), "summit"));
    tree.insert(Entry::new(Rect::new(0.5, 0.5, 0.6, 0.6), "spring"));

    println!("indexed {} features: {tree:?}", tree.len());

    // Everything touching the unit square near the origin.
    let window = Rect::new(0.0, 0.0, 1.0, 1.0);
    let mut hits = Vec::new();
    tree.search(window, &mut hits);
    let names: Vec<&str> = hits.iter().map(|e| e.payload).collect();
    println!("features in {window:?}: {names:?}");
    assert_eq!(hits.len(), 2, "pond and spring intersect the window");

    // Remove the spring and search again.
    let removed = tree.delete(&Entry::new(Rect::new(0.5, 0.5, 0.6, 0.6), "spring"));
    assert!(removed, "the spring was indexed");
    hits.clear();
    tree.search(window, &mut hits);
    println!("after deletion: {:?}", hits.iter().map(|e| e.payload).collect::<Vec<_>>());
    assert_eq!(hits.len(), 1, "only the pond remains in the window");
}
