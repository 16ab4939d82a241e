// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index types and small geometry helpers shared by the grid and the tree.

use kurbo::{Point, Rect, Vec2};

/// Partition shape of a sector: `rows` × `cols` equally sized cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridShape {
    /// Number of rows (along y).
    pub rows: usize,
    /// Number of columns (along x).
    pub cols: usize,
}

impl GridShape {
    /// Create a new shape.
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells, saturating on overflow.
    #[inline]
    pub const fn cell_count(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Whether either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self::new(2, 2)
    }
}

/// One cell of a sector's partition.
///
/// Ordering is row-major, which is also the order [`Cells`](crate::Cells)
/// produces them in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellIndex {
    /// Row, counted from the area's minimum y.
    pub row: usize,
    /// Column, counted from the area's minimum x.
    pub col: usize,
}

impl CellIndex {
    /// Create a new cell index.
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Half the diagonal of `rect`.
///
/// Every point of the rectangle lies within this distance of its center.
#[inline]
pub fn bounding_radius(rect: Rect) -> f64 {
    0.5 * Vec2::new(rect.width(), rect.height()).hypot()
}

/// The four corners of `rect`.
#[inline]
pub fn corners(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x1, rect.y1),
    ]
}

/// Hashable form of a position, used to count distinct positions.
///
/// Both zeroes map to the same key so that `-0.0` and `0.0` count as one
/// position, matching `==` on `f64`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PositionKey(u64, u64);

impl From<Point> for PositionKey {
    #[inline]
    fn from(p: Point) -> Self {
        Self((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
    }
}
