// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region queries over a larger index.
//!
//! Index a parcel grid, then sweep a viewport across it and probe single
//! points, the building blocks of map-style virtualization.
//!
//! Run:
//! - `cargo run -p canopy_demos --example rstar_region_queries`

use canopy_rstar::{Entry, RStarTree};
use kurbo::{Point, Rect};

fn main() {
    let mut tree = RStarTree::new();

    // A 40x40 grid of parcels, 25 units apart, each 20x20.
    for row in 0..40_u32 {
        for col in 0..40_u32 {
            let x = f64::from(col) * 25.0;
            let y = f64::from(row) * 25.0;
            tree.insert(Entry::new(
                Rect::new(x, y, x + 20.0, y + 20.0),
                row * 40 + col,
            ));
        }
    }
    println!("indexed {} parcels: {tree:?}", tree.len());

    // Sweep a fixed-size viewport left to right.
    let mut out = Vec::new();
    for step in 0..5 {
        let x0 = f64::from(step) * 180.0;
        let viewport = Rect::new(x0, 300.0, x0 + 200.0, 500.0);
        out.clear();
        tree.search(viewport, &mut out);
        println!("viewport {viewport:?} sees {} parcels", out.len());
        assert!(!out.is_empty(), "the viewport always overlaps the grid");
    }

    // Point probes hit exactly the parcel under the cursor (parcels do not
    // overlap, and the gaps between them hit nothing).
    let on_parcel: Vec<Entry<u32>> = tree.query_point(Point::new(10.0, 10.0)).collect();
    assert_eq!(on_parcel.len(), 1, "one parcel covers (10, 10)");
    println!("cursor parcel: {}", on_parcel[0].payload);

    let in_gap: Vec<Entry<u32>> = tree.query_point(Point::new(22.0, 10.0)).collect();
    assert!(in_gap.is_empty(), "the gap between parcels is uncovered");
}
