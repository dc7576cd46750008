//! The graph façade: a bounded op channel feeding a single builder thread.
//!
//! Discovery tasks enqueue structural ops concurrently; the builder applies
//! them in FIFO order under the write lock, so auto-vivification and
//! merging are race-free without per-operation store locks.
//! `close_and_wait` drains the channel, joins the builder, and seals the
//! structure. Classification writes (`mark_waste`, reachability states,
//! `add_error`) take the write lock directly and remain legal after close.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};

use chrono::Utc;
use cloudslash_core::constants::{
    KIND_UNKNOWN, OP_CHANNEL_BOUND, PROP_MONTHLY_COST, PROP_SOURCE_LOCATION,
};
use cloudslash_core::errors::{GraphError, PlanError};
use cloudslash_core::types::interning;
use cloudslash_core::{intern, FxHashMap, Value};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::Serialize;

use crate::classify::{self, MarkOutcome};
use crate::dsu::UnionFind;
use crate::impact::{self, ImpactReport};
use crate::ops::{EdgeOp, GraphOp, NodeOp};
use crate::reachability::TraversalPolicy;
use crate::store::{Edge, EdgeKind, Node, NodeStore};
use crate::topo;
use crate::typed::TypedResource;

/// A discovery scope that could not be completed.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeFailure {
    pub scope: String,
    pub error: String,
}

/// Run-level state of the graph. `partial` is monotonic: once set it
/// stays set, and the scope list only grows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphMetadata {
    pub partial: bool,
    pub failed_scopes: Vec<ScopeFailure>,
}

#[derive(Debug, Default)]
pub(crate) struct GraphInner {
    pub store: NodeStore,
    pub metadata: GraphMetadata,
}

/// The typed property graph.
pub struct ResourceGraph {
    inner: Arc<RwLock<GraphInner>>,
    dsu: Arc<RwLock<UnionFind>>,
    tx: Sender<GraphOp>,
    closed: AtomicBool,
    builder: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for ResourceGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGraph")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl ResourceGraph {
    /// Construct an empty graph; the op channel opens immediately.
    pub fn new() -> Self {
        Self::with_channel_bound(OP_CHANNEL_BOUND)
    }

    pub fn with_channel_bound(bound: usize) -> Self {
        let inner = Arc::new(RwLock::new(GraphInner::default()));
        let dsu = Arc::new(RwLock::new(UnionFind::new()));
        let (tx, rx) = bounded(bound);

        let builder_inner = Arc::clone(&inner);
        let builder_dsu = Arc::clone(&dsu);
        let handle = thread::Builder::new()
            .name("cloudslash-graph-builder".to_string())
            .spawn(move || builder_loop(rx, builder_inner, builder_dsu))
            .expect("failed to spawn graph builder thread");

        Self {
            inner,
            dsu,
            tx,
            closed: AtomicBool::new(false),
            builder: Mutex::new(Some(handle)),
        }
    }

    // ─── Structural mutation (enqueued, open graph only) ────────────

    /// Upsert a node. On id collision the properties are shallow-merged
    /// over the existing bag and `kind` is promoted from `Unknown` only.
    pub fn add_node(
        &self,
        id: &str,
        kind: &str,
        props: Vec<(String, Value)>,
    ) -> Result<(), GraphError> {
        self.enqueue_node(id, kind, props, None)
    }

    /// As [`add_node`](Self::add_node), attaching a typed mirror that
    /// overwrites any previous one.
    pub fn add_typed_node(
        &self,
        id: &str,
        kind: &str,
        props: Vec<(String, Value)>,
        typed: TypedResource,
    ) -> Result<(), GraphError> {
        self.enqueue_node(id, kind, props, Some(typed))
    }

    fn enqueue_node(
        &self,
        id: &str,
        kind: &str,
        props: Vec<(String, Value)>,
        typed: Option<TypedResource>,
    ) -> Result<(), GraphError> {
        if id.is_empty() {
            return Err(GraphError::UnknownNode { id: String::new() });
        }
        let op = NodeOp {
            id: intern(id),
            kind: intern(kind),
            props: props.into_iter().map(|(k, v)| (intern(&k), v)).collect(),
            typed,
        };
        self.send(GraphOp::Node(op))
    }

    /// Insert an edge with kind `Unknown` and weight 1.
    pub fn add_edge(&self, src: &str, dst: &str) -> Result<(), GraphError> {
        self.add_edge_with(src, dst, EdgeKind::Unknown, 1)
    }

    /// Insert an edge. Absent endpoints are vivified as `Unknown`-kind
    /// placeholders when the op is applied.
    pub fn add_edge_with(
        &self,
        src: &str,
        dst: &str,
        kind: EdgeKind,
        weight: i32,
    ) -> Result<(), GraphError> {
        self.enqueue_edge(src, dst, kind, weight, None)
    }

    /// As [`add_edge_with`](Self::add_edge_with), carrying metadata for
    /// report writers. Metadata plays no part in `(target, kind)` dedup.
    pub fn add_edge_annotated(
        &self,
        src: &str,
        dst: &str,
        kind: EdgeKind,
        weight: i32,
        metadata: FxHashMap<String, String>,
    ) -> Result<(), GraphError> {
        self.enqueue_edge(src, dst, kind, weight, Some(Box::new(metadata)))
    }

    fn enqueue_edge(
        &self,
        src: &str,
        dst: &str,
        kind: EdgeKind,
        weight: i32,
        metadata: Option<Box<FxHashMap<String, String>>>,
    ) -> Result<(), GraphError> {
        if src.is_empty() || dst.is_empty() {
            return Err(GraphError::UnknownNode { id: String::new() });
        }
        let op = EdgeOp {
            src: intern(src),
            dst: intern(dst),
            kind,
            weight,
            metadata,
        };
        self.send(GraphOp::Edge(op))
    }

    fn send(&self, op: GraphOp) -> Result<(), GraphError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(GraphError::Closed);
        }
        self.tx.send(op).map_err(|_| GraphError::Closed)
    }

    /// Block until every previously enqueued op is applied.
    pub fn flush(&self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        let (done_tx, done_rx) = bounded(0);
        if self.tx.send(GraphOp::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    /// Seal the graph: drain pending ops, join the builder, and reject
    /// further structural mutation. Idempotent.
    pub fn close_and_wait(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        // FIFO: everything enqueued before the sentinel is applied first.
        let _ = self.tx.send(GraphOp::Shutdown);
        if let Some(handle) = self.builder.lock().unwrap().take() {
            if handle.join().is_err() {
                tracing::error!("graph builder thread panicked");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ─── Classification writes (direct, legal after close) ──────────

    /// Record a failed discovery scope. Sets the monotonic `partial` flag.
    pub fn add_error(&self, scope: &str, error: impl std::fmt::Display) {
        let error = error.to_string();
        tracing::warn!(scope = %scope, error = %error, "discovery scope failed");
        let mut inner = self.inner.write().unwrap();
        inner.metadata.partial = true;
        inner.metadata.failed_scopes.push(ScopeFailure {
            scope: scope.to_string(),
            error,
        });
    }

    /// Mark a node as waste, subject to the ignore-tag policy. Unknown ids
    /// are a no-op.
    pub fn mark_waste(&self, id: &str, score: u8) -> MarkOutcome {
        self.mark_waste_with(id, score, "")
    }

    /// As [`mark_waste`](Self::mark_waste), recording a rationale.
    pub fn mark_waste_with(&self, id: &str, score: u8, reason: &str) -> MarkOutcome {
        let Some(iid) = interning::pool().get(id) else {
            return MarkOutcome::UnknownNode;
        };
        let now = Utc::now();
        let mut inner = self.inner.write().unwrap();
        match inner.store.get_by_id_mut(iid) {
            Some(node) => {
                let reason = (!reason.is_empty()).then_some(reason);
                classify::apply_mark(node, score, reason, now)
            }
            None => MarkOutcome::UnknownNode,
        }
    }

    /// Overwrite a node's estimated monthly cost.
    pub fn set_monthly_cost(&self, id: &str, cost: f64) {
        let Some(iid) = interning::pool().get(id) else {
            return;
        };
        let mut inner = self.inner.write().unwrap();
        if let Some(node) = inner.store.get_by_id_mut(iid) {
            node.monthly_cost = cost.max(0.0);
        }
    }

    /// Run reachability flood fill, writing terminal states on every node.
    pub fn analyze_reachability(&self, policy: &dyn TraversalPolicy) {
        let mut inner = self.inner.write().unwrap();
        crate::reachability::analyze(&mut inner.store, policy);
    }

    // ─── Reads (snapshots) ──────────────────────────────────────────

    pub fn get_node(&self, id: &str) -> Option<Node> {
        let iid = interning::pool().get(id)?;
        self.inner.read().unwrap().store.get_by_id(iid).cloned()
    }

    pub fn get_node_by_index(&self, index: u32) -> Option<Node> {
        self.inner.read().unwrap().store.get(index).cloned()
    }

    pub fn get_nodes(&self) -> Vec<Node> {
        self.inner.read().unwrap().store.nodes().to_vec()
    }

    pub fn get_edges(&self, index: u32) -> Vec<Edge> {
        self.inner.read().unwrap().store.forward_edges(index).to_vec()
    }

    pub fn get_reverse_edges(&self, index: u32) -> Vec<Edge> {
        self.inner.read().unwrap().store.reverse_edges(index).to_vec()
    }

    /// Forward-neighbor nodes of `id`: what `id` depends on.
    pub fn get_downstream(&self, id: &str) -> Vec<Node> {
        self.neighbor_nodes(id, true)
    }

    /// Reverse-neighbor nodes of `id`: what depends on `id`.
    pub fn get_upstream(&self, id: &str) -> Vec<Node> {
        self.neighbor_nodes(id, false)
    }

    fn neighbor_nodes(&self, id: &str, forward: bool) -> Vec<Node> {
        let Some(iid) = interning::pool().get(id) else {
            return Vec::new();
        };
        let inner = self.inner.read().unwrap();
        let Some(index) = inner.store.index_of(iid) else {
            return Vec::new();
        };
        let edges = if forward {
            inner.store.forward_edges(index)
        } else {
            inner.store.reverse_edges(index)
        };
        edges
            .iter()
            .filter_map(|e| inner.store.get(e.target).cloned())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().unwrap().store.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.read().unwrap().store.edge_count()
    }

    pub fn metadata(&self) -> GraphMetadata {
        self.inner.read().unwrap().metadata.clone()
    }

    /// Undirected connectivity via the disjoint-set index, O(α(n)).
    pub fn are_connected(&self, id1: &str, id2: &str) -> bool {
        let pool = interning::pool();
        let (Some(a), Some(b)) = (pool.get(id1), pool.get(id2)) else {
            return false;
        };
        let (ia, ib) = {
            let inner = self.inner.read().unwrap();
            match (inner.store.index_of(a), inner.store.index_of(b)) {
                (Some(ia), Some(ib)) => (ia, ib),
                _ => return false,
            }
        };
        self.dsu.write().unwrap().connected(ia, ib)
    }

    /// Run a closure against the frozen node slice under the read lock.
    /// Analyzers use this for their candidate-collection phase.
    pub fn with_nodes<R>(&self, f: impl FnOnce(&[Node]) -> R) -> R {
        let inner = self.inner.read().unwrap();
        f(inner.store.nodes())
    }

    /// Run a closure against the whole store under the read lock.
    pub fn with_store<R>(&self, f: impl FnOnce(&NodeStore) -> R) -> R {
        let inner = self.inner.read().unwrap();
        f(&inner.store)
    }

    // ─── Planning ───────────────────────────────────────────────────

    /// Dependency-ordered deletion plan over `subset`: dependents before
    /// dependencies.
    pub fn topological_sort(&self, subset: &[String]) -> Result<Vec<String>, PlanError> {
        let inner = self.inner.read().unwrap();
        topo::sort(&inner.store, subset)
    }

    /// Blast-radius summary for one node.
    pub fn analyze_impact(&self, id: &str) -> Option<ImpactReport> {
        let iid = interning::pool().get(id)?;
        let inner = self.inner.read().unwrap();
        impact::analyze(&inner.store, iid)
    }

    /// Cycle diagnostics over the full graph.
    pub fn cycle_report(&self) -> Vec<crate::cycles::CycleInfo> {
        let inner = self.inner.read().unwrap();
        crate::cycles::detect_cycles(&inner.store)
    }
}

impl Default for ResourceGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResourceGraph {
    fn drop(&mut self) {
        // Signal shutdown if close_and_wait was never called.
        let _ = self.tx.send(GraphOp::Shutdown);
    }
}

// ─── Builder thread ─────────────────────────────────────────────────

fn builder_loop(rx: Receiver<GraphOp>, inner: Arc<RwLock<GraphInner>>, dsu: Arc<RwLock<UnionFind>>) {
    for op in rx.iter() {
        match op {
            GraphOp::Shutdown => break,
            GraphOp::Flush(done) => {
                let _ = done.send(());
            }
            GraphOp::Node(op) => apply_node(&inner, op),
            GraphOp::Edge(op) => apply_edge(&inner, &dsu, op),
        }
    }
}

fn apply_node(inner: &RwLock<GraphInner>, op: NodeOp) {
    let mut guard = inner.write().unwrap();
    let index = guard.store.insert(op.id, op.kind);
    let Some(node) = guard.store.get_mut(index) else {
        return;
    };

    // Kind is promoted from Unknown exactly once, never demoted.
    let unknown = intern(KIND_UNKNOWN);
    if node.kind == unknown && op.kind != unknown {
        node.kind = op.kind;
    }

    let cost_key = intern(PROP_MONTHLY_COST);
    let loc_key = intern(PROP_SOURCE_LOCATION);
    for (key, value) in op.props {
        // Mirror the well-known properties into their typed fields.
        if key == cost_key {
            if let Some(cost) = value.as_f64() {
                node.monthly_cost = cost.max(0.0);
            }
        } else if key == loc_key {
            if let Some(loc) = value.as_str() {
                node.source_location = loc.to_string();
            }
        }
        node.properties.insert(key, value);
    }

    if let Some(typed) = op.typed {
        node.typed = Some(typed);
    }
}

fn apply_edge(inner: &RwLock<GraphInner>, dsu: &RwLock<UnionFind>, op: EdgeOp) {
    let unknown = intern(KIND_UNKNOWN);
    let (src, dst, inserted) = {
        let mut guard = inner.write().unwrap();
        let src = guard.store.insert(op.src, unknown);
        let dst = guard.store.insert(op.dst, unknown);
        let edge = Edge {
            target: dst,
            kind: op.kind,
            weight: op.weight,
            metadata: op.metadata,
        };
        let inserted = guard.store.add_edge(src, edge);
        (src, dst, inserted)
    };
    if inserted {
        let mut dsu = dsu.write().unwrap();
        dsu.union(src, dst);
    }
}
