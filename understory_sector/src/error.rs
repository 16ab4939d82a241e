// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use kurbo::{Point, Rect};
use thiserror::Error;

/// A position outside the area of the tree it was inserted into.
///
/// Returned by [`SectorTree::add_or_update`](crate::SectorTree::add_or_update).
/// The tree is left untouched; callers either clamp the position or build a
/// larger tree.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[error("position {position:?} lies outside the sector area {area:?}")]
pub struct BoundaryViolation {
    /// The rejected position.
    pub position: Point,
    /// The area of the tree that rejected it.
    pub area: Rect,
}

/// Invalid [`SectorTreeConfig`](crate::SectorTreeConfig).
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The capacity must be at least one.
    #[error("sector capacity must be at least 1")]
    ZeroCapacity,
    /// The grid shape has a zero dimension.
    #[error("grid shape {rows}x{cols} has no cells")]
    EmptyShape {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },
    /// `max_levels` was set to zero.
    #[error("max_levels must be at least 1 when set")]
    ZeroMaxLevels,
    /// The area is not finite or has no extent.
    #[error("sector area {0:?} must be finite with positive width and height")]
    InvalidArea(Rect),
}
