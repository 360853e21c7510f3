//! # Immutable R-tree - Persistent Spatial Index
//!
//! This crate provides an in-memory R-tree (and R*-tree) over 2D geometries
//! in which every version of the tree is an immutable value. Inserting or
//! deleting returns a new tree; nodes the operation did not touch are shared
//! between the old and new versions.
//!
//! ## Features
//!
//! - **Persistent**: Old versions stay valid and cheap to keep
//! - **Pluggable Strategies**: Quadratic or topological split, area or overlap selection
//! - **Demand-Driven Search**: Resumable traversal that emits only what is requested
//! - **Nearest Neighbours**: Branch-and-bound k-nearest search with a distance cap
//! - **Node Providers**: Load read-only external node trees and packed snapshots
//! - **Thread Safe**: Lock-free readers over snapshots, serialized writers through [`SharedRTree`]
//!
//! ## Quick Start
//!
//! ```rust
//! use immutable_rtree::{Context, Geometry, Rectangle, RTree};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let context = Context::builder().max_children(8).star().build()?;
//! let tree: RTree<u32> = RTree::with_context(context)
//!     .add(1, Geometry::point(1.0, 1.0))
//!     .add(2, Geometry::point(2.0, 2.0))
//!     .add(3, Geometry::circle(10.0, 10.0, 1.0));
//!
//! // Lazy range search
//! let mut hits = tree.search_intersecting(Rectangle::new(0.0, 0.0, 5.0, 5.0));
//! assert_eq!(hits.request(1).len(), 1);
//! assert_eq!(hits.request(10).len(), 1);
//!
//! // Nearest neighbours
//! let nearest = tree.nearest(&Rectangle::from_point(9.0, 9.0), f64::INFINITY, 1);
//! assert_eq!(*nearest[0].value(), 3);
//!
//! // Deleting returns a new version, the old one is untouched
//! let smaller = tree.remove(3, Geometry::circle(10.0, 10.0, 1.0));
//! assert_eq!((tree.size(), smaller.size()), (3, 2));
//! # Ok(())
//! # }
//! ```

// Core data model
pub mod entry;
pub mod errors;
pub mod geometry;
pub mod node;

// Configuration and strategies
pub mod context;
pub mod selector;
pub mod splitter;

// Tree engine
mod delete;
mod insert;
mod nearest;
pub mod search;
pub mod tree;

// Boundaries
pub mod provider;
pub mod shared;

pub use context::{Context, ContextBuilder, DEFAULT_FILLING_FACTOR, DEFAULT_MAX_CHILDREN};
pub use entry::Entry;
pub use errors::{RTreeError, RTreeResult};
pub use geometry::{Circle, Geometry, HasMbr, Point, Rectangle, Shape};
pub use node::{Leaf, Node, NodeRef, NonLeaf};
pub use provider::{
    BincodeSerializer, Contents, NodeProvider, PackedEntry, PackedNode, PackedProvider, PackedTree,
    ValueSerializer,
};
pub use search::{Flow, Frame, Search, SearchState};
pub use selector::Selector;
pub use shared::{SharedRTree, SpatialIndex};
pub use splitter::{ListPair, ListPairMetric, Splitter};
pub use tree::{IntegrityReport, RTree, TreeStats};
