// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use understory_sector::{SectorTree, SectorTreeConfig};

const WORLD: Rect = Rect::new(0.0, 0.0, 2000.0, 2000.0);

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
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_uniform_points(count: usize) -> Vec<Point> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| Point::new(rng.next_f64() * WORLD.width(), rng.next_f64() * WORLD.height()))
        .collect()
}

fn gen_clustered_points(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Point> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for _ in 0..n_clusters {
        let cx = spread + rng.next_f64() * (WORLD.width() - 2.0 * spread);
        let cy = spread + rng.next_f64() * (WORLD.height() - 2.0 * spread);
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Point::new(cx + dx, cy + dy));
        }
    }
    out
}

fn build_tree(points: &[Point], capacity: usize) -> SectorTree<u32> {
    let mut tree = SectorTree::new(SectorTreeConfig::new(WORLD).with_capacity(capacity)).unwrap();
    for (i, p) in points.iter().copied().enumerate() {
        tree.add_or_update(i as u32, p).unwrap();
    }
    tree
}

fn linear_scan(points: &[Point], radius: f64, center: Point) -> usize {
    points.iter().filter(|p| p.distance(center) <= radius).count()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sector_insert");
    for &n in &[1_000usize, 10_000, 50_000] {
        let points = gen_uniform_points(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("uniform_n{}", n), |b| {
            b.iter_batched(
                || points.clone(),
                |pts| black_box(build_tree(&pts, 8).node_count()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("sector_move");
    let points = gen_uniform_points(10_000);
    let tree = build_tree(&points, 8);
    let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
    let moves: Vec<(u32, Point)> = (0..1_000)
        .map(|_| {
            let id = (rng.next_u64() % points.len() as u64) as u32;
            let p = points[id as usize];
            let dx = (rng.next_f64() - 0.5) * 20.0;
            let dy = (rng.next_f64() - 0.5) * 20.0;
            let moved = Point::new(
                (p.x + dx).clamp(WORLD.x0, WORLD.x1),
                (p.y + dy).clamp(WORLD.y0, WORLD.y1),
            );
            (id, moved)
        })
        .collect();
    group.throughput(Throughput::Elements(moves.len() as u64));
    group.bench_function("jitter_1000_of_10000", |b| {
        b.iter_batched(
            || tree.clone(),
            |mut t| {
                for &(id, p) in &moves {
                    t.add_or_update(id, p).unwrap();
                }
                black_box(t.len());
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

fn bench_nearby(c: &mut Criterion) {
    let mut group = c.benchmark_group("sector_nearby");
    for (name, points) in [
        ("uniform", gen_uniform_points(20_000)),
        ("clustered", gen_clustered_points(40, 500, 120.0)),
    ] {
        let tree = build_tree(&points, 8);
        for &radius in &[25.0_f64, 150.0, 600.0] {
            let center = Point::new(1000.0, 1000.0);
            group.bench_function(format!("{name}_tree_r{radius}"), |b| {
                b.iter(|| {
                    let mut hits = 0_usize;
                    tree.visit_nearby(black_box(radius), black_box(center), |_, _| hits += 1);
                    black_box(hits)
                })
            });
            group.bench_function(format!("{name}_scan_r{radius}"), |b| {
                b.iter(|| black_box(linear_scan(&points, black_box(radius), black_box(center))))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_move, bench_nearby);
criterion_main!(benches);
