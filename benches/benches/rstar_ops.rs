// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_rstar::{Entry, RStarTree};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Rect;

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Rect> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Rect::new(x0, y0, x0 + cell, y0 + cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        ((self.next_u64() >> 40) as f64) / ((1_u64 << 24) as f64)
    }
}

fn gen_random_rects(count: usize, span: f64, rect_w: f64, rect_h: f64) -> Vec<Rect> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f64() * (span - rect_w).max(1.0);
        let y0 = rng.next_f64() * (span - rect_h).max(1.0);
        out.push(Rect::new(x0, y0, x0 + rect_w, y0 + rect_h));
    }
    out
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Rect> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Rect::new(cx + dx, cy + dy, cx + dx + 12.0, cy + dy + 12.0));
        }
    }
    out
}

fn build(rects: &[Rect]) -> RStarTree<u32> {
    let mut tree = RStarTree::new();
    for (i, r) in rects.iter().copied().enumerate() {
        tree.insert(Entry::new(r, i as u32));
    }
    tree
}

fn bench_build_and_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_build_query");
    for &n in &[32_usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        let query = Rect::new(100.0, 100.0, 500.0, 500.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                || rects.clone(),
                |rects| {
                    let tree = build(&rects);
                    let hits = tree.query_rect(query).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }

    let rects = gen_random_rects(4096, 2000.0, 15.0, 15.0);
    let query = Rect::new(500.0, 500.0, 900.0, 900.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("random_4096", |b| {
        b.iter_batched(
            || rects.clone(),
            |rects| {
                let tree = build(&rects);
                let hits = tree.query_rect(query).count();
                black_box(hits);
            },
            BatchSize::SmallInput,
        )
    });

    let rects = gen_clustered_rects(32, 128, 120.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("clustered_32x128", |b| {
        b.iter_batched(
            || rects.clone(),
            |rects| {
                let tree = build(&rects);
                let hits = tree.query_rect(query).count();
                black_box(hits);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_query_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_query");
    let rects = gen_random_rects(8192, 2000.0, 15.0, 15.0);
    let tree = build(&rects);
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let queries: Vec<Rect> = (0..256)
        .map(|_| {
            let x0 = rng.next_f64() * 1800.0;
            let y0 = rng.next_f64() * 1800.0;
            Rect::new(x0, y0, x0 + 200.0, y0 + 200.0)
        })
        .collect();
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("rect_256_of_8192", |b| {
        b.iter(|| {
            let mut total = 0_usize;
            let mut out = Vec::new();
            for &q in &queries {
                out.clear();
                tree.search(q, &mut out);
                total += out.len();
            }
            black_box(total);
        })
    });
    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_delete");
    let rects = gen_random_rects(4096, 2000.0, 15.0, 15.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("delete_half_of_4096", |b| {
        b.iter_batched(
            || build(&rects),
            |mut tree| {
                for (i, r) in rects.iter().copied().enumerate().step_by(2) {
                    let removed = tree.delete(&Entry::new(r, i as u32));
                    black_box(removed);
                }
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_build_and_query, bench_query_only, bench_delete);
criterion_main!(benches);
