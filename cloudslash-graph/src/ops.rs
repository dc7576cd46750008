//! Operations funneled through the op channel to the builder thread.

use cloudslash_core::{FxHashMap, InternedId, Value};
use crossbeam_channel::Sender;

use crate::store::EdgeKind;
use crate::typed::TypedResource;

/// A node upsert. Keys are interned at enqueue time so the builder only
/// moves data.
#[derive(Debug)]
pub struct NodeOp {
    pub id: InternedId,
    pub kind: InternedId,
    pub props: Vec<(InternedId, Value)>,
    pub typed: Option<TypedResource>,
}

/// An edge insert. Unknown endpoints are vivified as `Unknown`-kind
/// placeholders when the op is applied.
#[derive(Debug)]
pub struct EdgeOp {
    pub src: InternedId,
    pub dst: InternedId,
    pub kind: EdgeKind,
    pub weight: i32,
    pub metadata: Option<Box<FxHashMap<String, String>>>,
}

/// Everything the builder thread consumes.
#[derive(Debug)]
pub enum GraphOp {
    Node(NodeOp),
    Edge(EdgeOp),
    /// Rendezvous: reply once every previously enqueued op is applied.
    Flush(Sender<()>),
    Shutdown,
}
