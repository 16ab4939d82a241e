// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction parameters for a [`SectorTree`](crate::SectorTree).

use kurbo::Rect;

use crate::error::ConfigError;
use crate::types::GridShape;

/// Default number of distinct positions a cell holds before it subdivides.
pub const DEFAULT_CAPACITY: usize = 8;

/// Parameters shared by every node of a sector tree.
///
/// Children inherit the shape, capacity, and level cap of the root; only the
/// area shrinks as the tree deepens.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorTreeConfig {
    /// Area covered by the root.
    pub area: Rect,
    /// Partition shape used at every level.
    pub shape: GridShape,
    /// A cell subdivides once it holds more than this many distinct positions.
    pub capacity: usize,
    /// Maximum number of levels including the root, or `None` for no limit.
    ///
    /// `Some(1)` never subdivides.
    pub max_levels: Option<usize>,
}

impl SectorTreeConfig {
    /// A 2×2 configuration over `area` with [`DEFAULT_CAPACITY`] and no level cap.
    pub const fn new(area: Rect) -> Self {
        Self {
            area,
            shape: GridShape::new(2, 2),
            capacity: DEFAULT_CAPACITY,
            max_levels: None,
        }
    }

    /// Set the partition shape.
    #[must_use]
    pub const fn with_shape(mut self, rows: usize, cols: usize) -> Self {
        self.shape = GridShape::new(rows, cols);
        self
    }

    /// Set the capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the level cap.
    #[must_use]
    pub const fn with_max_levels(mut self, max_levels: Option<usize>) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.shape.is_empty() {
            return Err(ConfigError::EmptyShape {
                rows: self.shape.rows,
                cols: self.shape.cols,
            });
        }
        if self.max_levels == Some(0) {
            return Err(ConfigError::ZeroMaxLevels);
        }
        let a = self.area;
        let finite = a.x0.is_finite() && a.y0.is_finite() && a.x1.is_finite() && a.y1.is_finite();
        if !finite || a.width() <= 0.0 || a.height() <= 0.0 {
            return Err(ConfigError::InvalidArea(a));
        }
        Ok(())
    }
}
