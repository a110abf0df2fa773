//! Storage layer for the financial instrument store
//!
//! This crate implements an in-process labeled-property graph that stands in
//! for an external graph database:
//! - Graph: nodes, typed relationships, labels and property bags
//! - LabelIndex / PropertyIndex: secondary indices for label scans and lookups
//! - Declared uniqueness constraints, enforced per statement
//! - MemoryGraph: thread-safe front end implementing `BatchExecutor` and
//!   `IndexManager`, with fault injection for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
mod handlers;
pub mod index;
pub mod memory;

pub use graph::{Graph, Node, NodeId, RelId, Relationship};
pub use index::{LabelIndex, PropertyIndex};
pub use memory::MemoryGraph;
