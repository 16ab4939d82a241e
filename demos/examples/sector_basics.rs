// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracking wandering clients with a sector tree.
//!
//! This example shows how to:
//! - build a [`SectorTree`] from a [`SectorTreeConfig`],
//! - move clients every tick with `add_or_update`,
//! - ask for everyone within a radius of a point,
//! - inspect the subdivided cells, and
//! - remove clients and watch subtrees get pruned.
//!
//! Run:
//! - `cargo run -p understory_demos --example sector_basics`
//! - `RUST_LOG=understory_sector=debug cargo run -p understory_demos --example sector_basics`

use kurbo::{Point, Rect, Vec2};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use understory_sector::{SectorTree, SectorTreeConfig};

const MAP: Rect = Rect::new(0.0, 0.0, 1000.0, 1000.0);
const CLIENTS: u32 = 400;
const TICKS: usize = 5;
const VIEW_RADIUS: f64 = 120.0;

/// Xorshift generator so every run wanders the same way.
struct Rng(u64);

impl Rng {
    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        ((x >> 11) as f64) / ((1_u64 << 53) as f64)
    }
}

fn clamp_to_map(p: Point) -> Point {
    Point::new(p.x.clamp(MAP.x0, MAP.x1), p.y.clamp(MAP.y0, MAP.y1))
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sector_basics=info,understory_sector=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true).compact())
        .init();

    let config = SectorTreeConfig::new(MAP)
        .with_shape(3, 3)
        .with_capacity(6)
        .with_max_levels(Some(5));
    let mut tree = match SectorTree::new(config) {
        Ok(tree) => tree,
        Err(err) => {
            warn!(%err, "invalid sector configuration");
            return;
        }
    };

    // Half of the clients start in a tight cluster so that region subdivides.
    let mut rng = Rng(0x5EC7_0A11_D00D_F00D);
    let mut positions: Vec<Point> = (0..CLIENTS)
        .map(|i| {
            if i % 2 == 0 {
                Point::new(200.0 + rng.next_f64() * 60.0, 700.0 + rng.next_f64() * 60.0)
            } else {
                Point::new(rng.next_f64() * MAP.width(), rng.next_f64() * MAP.height())
            }
        })
        .collect();
    for (id, &p) in (0..CLIENTS).zip(&positions) {
        if let Err(err) = tree.add_or_update(id, p) {
            warn!(id, %err, "client rejected");
        }
    }
    info!(
        clients = tree.len(),
        nodes = tree.node_count(),
        depth = tree.depth(),
        "initial placement"
    );

    for tick in 0..TICKS {
        for (id, p) in (0..CLIENTS).zip(positions.iter_mut()) {
            let step = Vec2::new(rng.next_f64() - 0.5, rng.next_f64() - 0.5) * 40.0;
            *p = clamp_to_map(*p + step);
            if let Err(err) = tree.add_or_update(id, *p) {
                warn!(id, %err, "client rejected");
            }
        }
        let watcher = positions[0];
        let visible = tree.nearby(VIEW_RADIUS, watcher);
        info!(
            tick,
            visible = visible.len(),
            nodes = tree.node_count(),
            depth = tree.depth(),
            "client 0 at ({:.1}, {:.1})",
            watcher.x,
            watcher.y
        );
    }

    let mut per_level = Vec::new();
    tree.visit_cells(|_, level| {
        if per_level.len() <= level {
            per_level.resize(level + 1, 0_usize);
        }
        per_level[level] += 1;
    });
    for (level, cells) in per_level.iter().enumerate() {
        info!(level, cells, "cell rectangles");
    }

    // A position off the map is reported, not clamped.
    if let Err(err) = tree.add_or_update(CLIENTS, Point::new(-5.0, 10.0)) {
        info!(%err, "out-of-bounds insert refused");
    }

    for id in (0..CLIENTS).filter(|id| id % 2 == 0) {
        tree.remove(&id);
    }
    info!(
        clients = tree.len(),
        nodes = tree.node_count(),
        depth = tree.depth(),
        "after removing the cluster"
    );
}
