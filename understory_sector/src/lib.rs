// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_sector --heading-base-level=0

//! Understory Sector: a capacity-adaptive 2D sector tree for moving points.
//!
//! A [`SectorTree`] tracks many point clients inside a fixed rectangle and
//! answers "which clients are within radius `r` of point `p`" without scanning
//! every client.
//!
//! - Each node partitions its area into `rows` × `cols` cells with a [`SectorGrid`].
//! - A cell holding more than `capacity` **distinct positions** grows a child
//!   node over its rectangle, up to an optional level cap.
//! - A child is dropped, with its whole subtree, once its cell falls back to
//!   `capacity` distinct positions or fewer.
//! - Radius queries cull cells whose bounding circle misses the query circle,
//!   take whole cells whose four corners lie inside it, and only test
//!   individual clients in partially covered leaf cells.
//!
//! Client identities are any `K: Clone + Eq + Hash`. Geometry uses [`kurbo`]:
//! areas are [`kurbo::Rect`]s and positions are [`kurbo::Point`]s.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_sector::{CellIndex, SectorTree, SectorTreeConfig};
//!
//! let config = SectorTreeConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0))
//!     .with_capacity(1)
//!     .with_max_levels(Some(2));
//! let mut tree = SectorTree::new(config).unwrap();
//!
//! tree.add_or_update("A", Point::new(10.0, 10.0)).unwrap();
//! tree.add_or_update("B", Point::new(90.0, 90.0)).unwrap();
//! assert!(tree.child(CellIndex::new(0, 0)).is_none());
//!
//! // A second distinct position in the top-left quadrant subdivides it.
//! tree.add_or_update("E", Point::new(12.0, 12.0)).unwrap();
//! assert!(tree.child(CellIndex::new(0, 0)).is_some());
//!
//! let near = tree.nearby(5.0, Point::new(11.0, 11.0));
//! assert_eq!(near.len(), 2);
//! assert!(near.contains_key("A") && near.contains_key("E"));
//!
//! // Moving a client is another `add_or_update`; removal prunes the child.
//! tree.remove(&"E");
//! assert!(tree.child(CellIndex::new(0, 0)).is_none());
//! ```
//!
//! Positions outside the root area are rejected and leave the tree untouched:
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_sector::{SectorTree, SectorTreeConfig};
//!
//! let mut tree = SectorTree::new(SectorTreeConfig::new(Rect::new(0.0, 0.0, 10.0, 10.0))).unwrap();
//! let err = tree.add_or_update(7_u32, Point::new(11.0, 5.0)).unwrap_err();
//! assert_eq!(err.position, Point::new(11.0, 5.0));
//! assert!(tree.is_empty());
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: use `std` float math through `kurbo`.
//! - `libm`: `no_std` float math through `kurbo`'s `libm` feature.
//! - `serde`: `Serialize`/`Deserialize` for [`SectorTreeConfig`], [`GridShape`], and [`CellIndex`].
//!
//! ## Logging
//!
//! Subdivision and pruning emit `tracing` events at `DEBUG`, and rejected
//! positions at `TRACE`. The crate never installs a subscriber.
//!
//! ## Threading
//!
//! The tree has no interior synchronization. Wrap it in a single lock, or
//! funnel all writes through one owner, when sharing it between threads.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod error;
mod grid;
mod tree;
mod types;

pub use config::{DEFAULT_CAPACITY, SectorTreeConfig};
pub use error::{BoundaryViolation, ConfigError};
pub use grid::{Cells, SectorGrid};
pub use tree::SectorTree;
pub use types::{CellIndex, GridShape, bounding_radius, corners};
