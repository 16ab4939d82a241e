// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capacity-adaptive sector tree.
//!
//! Every node partitions its area with a [`SectorGrid`]. When a cell holds
//! more than `capacity` distinct positions, the node grows a child over that
//! cell's rectangle and keeps forwarding the cell's clients into it. When the
//! cell drains back to `capacity` or fewer distinct positions, the child and
//! its whole subtree are dropped.
//!
//! Each node records every client of its subtree, so a cell that lies fully
//! inside a query circle is answered from the node's own maps without
//! descending.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::{self, Debug};
use core::hash::Hash;

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::SectorTreeConfig;
use crate::error::{BoundaryViolation, ConfigError};
use crate::grid::SectorGrid;
use crate::types::{CellIndex, GridShape, PositionKey, bounding_radius, corners};

/// Where a client sits at one level of the tree.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Placement {
    pos: Point,
    cell: CellIndex,
}

/// Clients of one cell, plus the multiset of their positions.
#[derive(Clone, Debug)]
struct Sector<K> {
    clients: HashSet<K>,
    positions: HashMap<PositionKey, usize>,
}

impl<K: Eq + Hash> Sector<K> {
    fn new() -> Self {
        Self {
            clients: HashSet::new(),
            positions: HashMap::new(),
        }
    }

    fn insert(&mut self, client: K, pos: Point) {
        if self.clients.insert(client) {
            *self.positions.entry(pos.into()).or_insert(0) += 1;
        }
    }

    fn remove(&mut self, client: &K, pos: Point) {
        if !self.clients.remove(client) {
            return;
        }
        let key = PositionKey::from(pos);
        match self.positions.get_mut(&key) {
            Some(n) if *n > 1 => *n -= 1,
            Some(_) => {
                self.positions.remove(&key);
            }
            None => debug_assert!(false, "sector invariant violated: untracked position"),
        }
    }

    /// Number of distinct positions.
    fn population(&self) -> usize {
        self.positions.len()
    }

    fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// A hierarchical, capacity-adaptive grid over a rectangular area.
///
/// `K` is the client identity. The tree clones identities into every level
/// that tracks them and never creates or drops them otherwise.
///
/// See the [crate documentation](crate) for an overview.
#[derive(Clone)]
pub struct SectorTree<K> {
    grid: SectorGrid,
    capacity: usize,
    level: usize,
    max_levels: Option<usize>,
    min_cell: Size,
    sectors: HashMap<CellIndex, Sector<K>>,
    clients: HashMap<K, Placement>,
    children: HashMap<CellIndex, Box<SectorTree<K>>>,
}

impl<K> Debug for SectorTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectorTree")
            .field("area", &self.grid.area())
            .field("shape", &self.grid.shape())
            .field("capacity", &self.capacity)
            .field("level", &self.level)
            .field("max_levels", &self.max_levels)
            .field("clients", &self.clients.len())
            .field("occupied_cells", &self.sectors.len())
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl<K: Clone + Eq + Hash> SectorTree<K> {
    /// Create an empty root from a validated configuration.
    pub fn new(config: SectorTreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let min_cell = Size::new(
            config.area.width() * MIN_CELL_FRACTION,
            config.area.height() * MIN_CELL_FRACTION,
        );
        Ok(Self::node(
            config.area,
            config.shape,
            config.capacity,
            0,
            config.max_levels,
            min_cell,
        ))
    }

    fn node(
        area: Rect,
        shape: GridShape,
        capacity: usize,
        level: usize,
        max_levels: Option<usize>,
        min_cell: Size,
    ) -> Self {
        Self {
            grid: SectorGrid::new(area, shape),
            capacity,
            level,
            max_levels,
            min_cell,
            sectors: HashMap::new(),
            clients: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// Insert `client` at `pos`, or move it there if it is already tracked.
    ///
    /// Returns [`BoundaryViolation`] without touching the tree if `pos` lies
    /// outside this tree's area. Re-inserting a client at its current
    /// position is a no-op.
    pub fn add_or_update(&mut self, client: K, pos: Point) -> Result<(), BoundaryViolation> {
        if self.clients.get(&client).is_some_and(|p| p.pos == pos) {
            return Ok(());
        }
        let Some(cell) = self.grid.cell_of(pos) else {
            trace!(
                depth = self.level,
                x = pos.x,
                y = pos.y,
                "rejected position outside sector area"
            );
            return Err(BoundaryViolation {
                position: pos,
                area: self.grid.area(),
            });
        };
        self.place(client, pos, cell);
        Ok(())
    }

    /// Record `client` at `pos` in `cell`, which the caller has resolved.
    fn place(&mut self, client: K, pos: Point, cell: CellIndex) {
        if let Some(old) = self.clients.get(&client).copied() {
            if old.pos == pos {
                return;
            }
            self.detach(&client, old);
            if old.cell != cell {
                self.evict_from_child(&client, old.cell);
            }
        }
        self.sectors
            .entry(cell)
            .or_insert_with(Sector::new)
            .insert(client.clone(), pos);
        self.clients.insert(client.clone(), Placement { pos, cell });
        self.refine(cell, client, pos);
    }

    /// Create, feed, or prune the child of `cell` after `client` landed there.
    fn refine(&mut self, cell: CellIndex, client: K, pos: Point) {
        let population = self.population(cell);
        if population <= self.capacity {
            self.prune_if_underfull(cell);
            return;
        }
        if !self.can_subdivide(cell) {
            return;
        }
        match self.children.entry(cell) {
            Entry::Occupied(child) => {
                let child = child.into_mut();
                let child_cell = child.grid.cell_of_clamped(pos);
                child.place(client, pos, child_cell);
            }
            Entry::Vacant(slot) => {
                let mut child = Box::new(Self::node(
                    self.grid.rect_of(cell),
                    self.grid.shape(),
                    self.capacity,
                    self.level + 1,
                    self.max_levels,
                    self.min_cell,
                ));
                // One-time backfill; `client` is among the members.
                let members: SmallVec<[(K, Point); 16]> = self
                    .sectors
                    .get(&cell)
                    .into_iter()
                    .flat_map(|s| s.clients.iter())
                    .filter_map(|k| self.clients.get(k).map(|p| (k.clone(), p.pos)))
                    .collect();
                for (k, p) in members {
                    let child_cell = child.grid.cell_of_clamped(p);
                    child.place(k, p, child_cell);
                }
                debug!(
                    depth = self.level,
                    row = cell.row,
                    col = cell.col,
                    population,
                    "subdivided sector"
                );
                slot.insert(child);
            }
        }
    }

    /// Whether `cell` may grow a child.
    ///
    /// Besides the level cap, at least one axis must still split into cells
    /// no smaller than `min_cell` that are strictly smaller at `f64`
    /// precision. Nearly identical positions therefore stop subdividing after
    /// a bounded number of levels even without a cap.
    fn can_subdivide(&self, cell: CellIndex) -> bool {
        if self.max_levels.is_some_and(|m| self.level + 1 >= m) {
            return false;
        }
        let rect = self.grid.rect_of(cell);
        let shape = self.grid.shape();
        splits(rect.x0, rect.x1, shape.cols, self.min_cell.width)
            || splits(rect.y0, rect.y1, shape.rows, self.min_cell.height)
    }

    fn detach(&mut self, client: &K, old: Placement) {
        if let Some(sector) = self.sectors.get_mut(&old.cell) {
            sector.remove(client, old.pos);
            if sector.is_empty() {
                self.sectors.remove(&old.cell);
            }
        }
    }

    fn evict_from_child(&mut self, client: &K, cell: CellIndex) {
        if let Some(child) = self.children.get_mut(&cell) {
            child.remove(client);
        }
        self.prune_if_underfull(cell);
    }

    fn prune_if_underfull(&mut self, cell: CellIndex) {
        if !self.children.contains_key(&cell) {
            return;
        }
        let population = self.population(cell);
        if population <= self.capacity {
            self.children.remove(&cell);
            debug!(
                depth = self.level,
                row = cell.row,
                col = cell.col,
                population,
                "pruned sector"
            );
        }
    }

    /// Stop tracking `client` at every level.
    ///
    /// Returns its last position, or `None` if it was not tracked. Children
    /// whose cell drops to `capacity` or fewer distinct positions are
    /// discarded together with their subtrees.
    pub fn remove(&mut self, client: &K) -> Option<Point> {
        let placement = self.clients.remove(client)?;
        self.detach(client, placement);
        self.evict_from_child(client, placement.cell);
        Some(placement.pos)
    }

    /// Forget every client and drop all children.
    pub fn clear(&mut self) {
        self.sectors.clear();
        self.clients.clear();
        self.children.clear();
    }

    /// Every client within `radius` of `point`, with its position.
    ///
    /// A negative or NaN radius matches nothing; an infinite radius matches
    /// every client.
    pub fn nearby(&self, radius: f64, point: Point) -> HashMap<K, Point> {
        let mut out = HashMap::new();
        self.visit_nearby(radius, point, |k, p| {
            out.insert(k.clone(), p);
        });
        out
    }

    /// Visit every client within `radius` of `point` (does not allocate result storage).
    ///
    /// Calls `f(client, position)` once per match, in no particular order.
    pub fn visit_nearby<F: FnMut(&K, Point)>(&self, radius: f64, point: Point, mut f: F) {
        if radius.is_nan() || radius < 0.0 {
            return;
        }
        self.visit_nearby_in(radius, point, &mut f);
    }

    fn visit_nearby_in<F: FnMut(&K, Point)>(&self, radius: f64, point: Point, f: &mut F) {
        for (&cell, sector) in &self.sectors {
            let rect = self.grid.rect_of(cell);
            // Rounding in the center and both hypotenuses grows with the
            // coordinates, so the slack does too. A client on a cell corner
            // must never be culled here.
            let center = rect.center();
            let reach = bounding_radius(rect) + radius;
            let magnitude = reach + center.x.abs() + center.y.abs() + point.x.abs() + point.y.abs();
            if reach + magnitude * CULL_SLACK < center.distance(point) {
                continue;
            }
            if corners(rect).iter().all(|c| c.distance(point) <= radius) {
                for k in &sector.clients {
                    if let Some(p) = self.clients.get(k) {
                        f(k, p.pos);
                    }
                }
                continue;
            }
            if let Some(child) = self.children.get(&cell) {
                child.visit_nearby_in(radius, point, f);
                continue;
            }
            for k in &sector.clients {
                if let Some(p) = self.clients.get(k)
                    && p.pos.distance(point) <= radius
                {
                    f(k, p.pos);
                }
            }
        }
    }
}

impl<K: Eq + Hash> SectorTree<K> {
    /// The area covered by this node.
    #[inline]
    pub fn area(&self) -> Rect {
        self.grid.area()
    }

    /// The partition shape used by this node and all of its descendants.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.grid.shape()
    }

    /// This node's grid.
    #[inline]
    pub fn grid(&self) -> &SectorGrid {
        &self.grid
    }

    /// Distinct positions a cell holds before it subdivides.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Depth of this node; the root is level 0.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// The level cap shared by the whole tree.
    #[inline]
    pub fn max_levels(&self) -> Option<usize> {
        self.max_levels
    }

    /// Number of clients tracked in this subtree.
    #[inline]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no client is tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Whether `client` is tracked in this subtree.
    pub fn contains(&self, client: &K) -> bool {
        self.clients.contains_key(client)
    }

    /// Last recorded position of `client`.
    pub fn position(&self, client: &K) -> Option<Point> {
        self.clients.get(client).map(|p| p.pos)
    }

    /// Every client tracked in this subtree with its position.
    pub fn clients(&self) -> impl Iterator<Item = (&K, Point)> + '_ {
        self.clients.iter().map(|(k, p)| (k, p.pos))
    }

    /// Clients mapped to `cell` at this node.
    pub fn clients_in_cell(&self, cell: CellIndex) -> impl Iterator<Item = &K> + '_ {
        self.sectors
            .get(&cell)
            .into_iter()
            .flat_map(|s| s.clients.iter())
    }

    /// Number of distinct positions in `cell` at this node.
    pub fn population(&self, cell: CellIndex) -> usize {
        self.sectors.get(&cell).map_or(0, Sector::population)
    }

    /// The child covering `cell`, if that cell has subdivided.
    pub fn child(&self, cell: CellIndex) -> Option<&Self> {
        self.children.get(&cell).map(|c| &**c)
    }

    /// Every child with the cell it covers, in no particular order.
    pub fn children(&self) -> impl Iterator<Item = (CellIndex, &Self)> + '_ {
        self.children.iter().map(|(&cell, c)| (cell, &**c))
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(|c| c.node_count())
            .sum::<usize>()
    }

    /// Number of levels in this subtree, including this one.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .values()
            .map(|c| c.depth())
            .max()
            .unwrap_or(0)
    }

    /// Visit every cell rectangle of this subtree with the level it belongs to.
    ///
    /// A node reports all of its cells, occupied or not, before its children.
    pub fn visit_cells<F: FnMut(Rect, usize)>(&self, mut f: F) {
        self.visit_cells_in(&mut f);
    }

    fn visit_cells_in<F: FnMut(Rect, usize)>(&self, f: &mut F) {
        for (_, rect) in self.grid.cell_rects() {
            f(rect, self.level);
        }
        for child in self.children.values() {
            child.visit_cells_in(f);
        }
    }

    /// Every `(cell_rectangle, level)` pair of this subtree.
    pub fn cell_rects(&self) -> Vec<(Rect, usize)> {
        let mut out = Vec::new();
        self.visit_cells(|r, l| out.push((r, l)));
        out
    }
}

/// Widening of the broad-phase reach, relative to the magnitudes involved.
const CULL_SLACK: f64 = 8.0 * f64::EPSILON;

/// Smallest cell extent, as a fraction of the root area's extent on that axis.
const MIN_CELL_FRACTION: f64 = 16.0 * f64::EPSILON;

/// Whether `[min, max]` divides into `count` strictly smaller spans of at
/// least `floor` each.
#[inline]
fn splits(min: f64, max: f64, count: usize, floor: f64) -> bool {
    if count < 2 {
        return false;
    }
    let step = (max - min) / count as f64;
    let first = min + step;
    step >= floor && min < first && first < max
}
