// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed partition of a rectangular area into `rows` × `cols` cells.
//!
//! [`SectorGrid`] is pure geometry: it maps points to cells and cells back to
//! their sub-rectangles. It holds no clients and never changes after
//! construction.

use core::iter::FusedIterator;

use kurbo::{Point, Rect, Size};

use crate::types::{CellIndex, GridShape};

/// Uniform partition of an area.
///
/// The area is closed on all four sides: points on the far edges belong to
/// the last row or column. Cells are otherwise half-open, so a point on a
/// shared edge belongs to the cell with the larger index.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SectorGrid {
    area: Rect,
    shape: GridShape,
    cell_w: f64,
    cell_h: f64,
}

impl SectorGrid {
    /// Create a grid over `area` with the given shape.
    ///
    /// The shape must not have a zero dimension and the area must not be
    /// inverted; [`SectorTreeConfig::validate`](crate::SectorTreeConfig::validate)
    /// checks both before a tree builds any grid.
    pub fn new(area: Rect, shape: GridShape) -> Self {
        debug_assert!(!shape.is_empty(), "grid shape must have non-zero rows and cols");
        debug_assert!(
            area.width() >= 0.0 && area.height() >= 0.0,
            "grid area must not be inverted"
        );
        Self {
            area,
            shape,
            cell_w: area.width() / shape.cols as f64,
            cell_h: area.height() / shape.rows as f64,
        }
    }

    /// The partitioned area.
    #[inline]
    pub fn area(&self) -> Rect {
        self.area
    }

    /// The partition shape.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Size of a single cell.
    #[inline]
    pub fn cell_size(&self) -> Size {
        Size::new(self.cell_w, self.cell_h)
    }

    /// Number of cells in the partition.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.shape.cell_count()
    }

    /// The cell containing `point`, or `None` if it lies outside the area.
    ///
    /// Non-finite coordinates are never contained.
    pub fn cell_of(&self, point: Point) -> Option<CellIndex> {
        let lx = point.x - self.area.x0;
        let ly = point.y - self.area.y0;
        if !(0.0..=self.area.width()).contains(&lx) || !(0.0..=self.area.height()).contains(&ly) {
            return None;
        }
        Some(self.cell_of_inside(point))
    }

    /// Like [`cell_of`](Self::cell_of), but snaps outside points onto the
    /// nearest cell.
    ///
    /// Only used for points an enclosing sector has already accepted, where
    /// rounding at a shared edge may land a hair outside this area.
    pub(crate) fn cell_of_clamped(&self, point: Point) -> CellIndex {
        let x = point.x.clamp(self.area.x0, self.area.x1);
        let y = point.y.clamp(self.area.y0, self.area.y1);
        self.cell_of_inside(Point::new(x, y))
    }

    /// Cell lookup for a point already known to lie inside the area.
    ///
    /// The result always agrees with [`rect_of`](Self::rect_of): the point
    /// lies inside the returned cell's rectangle.
    fn cell_of_inside(&self, point: Point) -> CellIndex {
        CellIndex::new(
            axis_cell(point.y, self.area.y0, self.cell_h, self.shape.rows),
            axis_cell(point.x, self.area.x0, self.cell_w, self.shape.cols),
        )
    }

    /// The sub-rectangle covered by `cell`.
    ///
    /// The last row and column end exactly on the area's far edges, so the
    /// cells tile the area without gaps.
    pub fn rect_of(&self, cell: CellIndex) -> Rect {
        debug_assert!(
            cell.row < self.shape.rows && cell.col < self.shape.cols,
            "cell {cell:?} out of range for shape {:?}",
            self.shape
        );
        let (x0, x1) = axis_span(
            self.area.x0,
            self.area.x1,
            self.cell_w,
            cell.col,
            self.shape.cols,
        );
        let (y0, y1) = axis_span(
            self.area.y0,
            self.area.y1,
            self.cell_h,
            cell.row,
            self.shape.rows,
        );
        Rect::new(x0, y0, x1, y1)
    }

    /// Every cell in row-major order.
    #[inline]
    pub fn cells(&self) -> Cells {
        Cells::new(self.shape)
    }

    /// Every cell paired with its rectangle, in row-major order.
    pub fn cell_rects(&self) -> impl Iterator<Item = (CellIndex, Rect)> + '_ {
        self.cells().map(|cell| (cell, self.rect_of(cell)))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "`coord - min` is non-negative and the result is clamped to `count - 1`; the cast saturates."
)]
#[inline]
fn axis_cell(coord: f64, min: f64, cell_size: f64, count: usize) -> usize {
    // Truncation rounds towards -∞ because `coord - min` is never negative.
    let t = (coord - min) / cell_size;
    let idx = (t as usize).min(count - 1);
    // The division can round across an edge; snap to the span `axis_span` draws.
    if idx > 0 && coord < min + idx as f64 * cell_size {
        idx - 1
    } else if idx + 1 < count && coord >= min + (idx + 1) as f64 * cell_size {
        idx + 1
    } else {
        idx
    }
}

#[inline]
fn axis_span(min: f64, max: f64, cell_size: f64, idx: usize, count: usize) -> (f64, f64) {
    let lo = min + idx as f64 * cell_size;
    let hi = if idx + 1 == count {
        max
    } else {
        min + (idx + 1) as f64 * cell_size
    };
    (lo, hi)
}

/// Iterator over every [`CellIndex`] of a [`GridShape`] in row-major order.
///
/// Created by [`SectorGrid::cells`] or [`Cells::new`]. Each call yields a
/// fresh iterator; nothing is shared between them.
#[derive(Clone, Debug)]
pub struct Cells {
    cols: usize,
    next: usize,
    end: usize,
}

impl Cells {
    /// Iterate all cells of `shape`.
    pub fn new(shape: GridShape) -> Self {
        Self {
            cols: shape.cols,
            next: 0,
            end: shape.cell_count(),
        }
    }
}

impl Iterator for Cells {
    type Item = CellIndex;

    fn next(&mut self) -> Option<CellIndex> {
        if self.next >= self.end {
            return None;
        }
        let i = self.next;
        self.next += 1;
        Some(CellIndex::new(i / self.cols, i % self.cols))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Cells {}

impl FusedIterator for Cells {}
