//! # cloudslash-graph
//!
//! The typed property graph at the center of the waste engine. Discovery
//! tasks enqueue node/edge operations onto a bounded channel; a single
//! builder thread applies them in order, so the store itself needs no
//! per-operation locking. After `close_and_wait` the structure is frozen
//! and analyzers read it concurrently, mutating only per-node
//! classification fields under the write lock.

pub mod classify;
pub mod cycles;
pub mod dsu;
pub mod graph;
pub mod impact;
pub mod ops;
pub mod reachability;
pub mod store;
pub mod topo;
pub mod typed;

pub use classify::IgnoreDirective;
pub use graph::{GraphMetadata, ResourceGraph, ScopeFailure};
pub use impact::ImpactReport;
pub use reachability::{DefaultTraversalPolicy, TraversalPolicy};
pub use store::{Edge, EdgeKind, Node, NodeStore, Reachability};
pub use typed::TypedResource;
