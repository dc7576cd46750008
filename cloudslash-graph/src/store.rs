//! Append-only node and adjacency stores keyed by compact node indices.
//!
//! All three arrays (`nodes`, `forward`, `reverse`) are index-aligned.
//! Edges are deduplicated by `(target, kind)`; every forward insert appends
//! the symmetric entry to the reverse list of its target.

use cloudslash_core::constants;
use cloudslash_core::types::interning;
use cloudslash_core::{FxHashMap, InternedId, Value};
use serde::Serialize;
use smallvec::SmallVec;

use crate::typed::TypedResource;

/// Relationship kind carried on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeKind {
    AttachedTo,
    SecuredBy,
    Contains,
    Runs,
    FlowsTo,
    Uses,
    Unknown,
}

impl EdgeKind {
    pub fn name(self) -> &'static str {
        match self {
            EdgeKind::AttachedTo => "AttachedTo",
            EdgeKind::SecuredBy => "SecuredBy",
            EdgeKind::Contains => "Contains",
            EdgeKind::Runs => "Runs",
            EdgeKind::FlowsTo => "FlowsTo",
            EdgeKind::Uses => "Uses",
            EdgeKind::Unknown => "Unknown",
        }
    }
}

/// Terminal states of reachability analysis. `Unknown` exists only before
/// the analysis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reachability {
    Unknown,
    Reachable,
    DarkMatter,
}

/// A directed edge. The reverse store holds the mirrored entry.
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub target: u32,
    pub kind: EdgeKind,
    pub weight: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Box<FxHashMap<String, String>>>,
}

impl Edge {
    pub fn new(target: u32, kind: EdgeKind, weight: i32) -> Self {
        Self {
            target,
            kind,
            weight,
            metadata: None,
        }
    }
}

/// A discovered resource.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// Dense index, assigned at insertion, stable for the graph lifetime.
    pub index: u32,
    /// Unique identity, typically an ARN.
    pub id: InternedId,
    /// Resource type tag, e.g. `AWS::EC2::Instance`.
    pub kind: InternedId,
    /// Open attribute bag.
    pub properties: FxHashMap<InternedId, Value>,
    /// Strongly-typed mirror of salient attributes for known kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed: Option<TypedResource>,
    pub is_waste: bool,
    pub risk_score: u8,
    pub monthly_cost: f64,
    pub waste_reason: String,
    pub justified: bool,
    pub justification: String,
    pub source_location: String,
    pub reachability: Reachability,
}

impl Node {
    pub fn new(index: u32, id: InternedId, kind: InternedId) -> Self {
        Self {
            index,
            id,
            kind,
            properties: FxHashMap::default(),
            typed: None,
            is_waste: false,
            risk_score: 0,
            monthly_cost: 0.0,
            waste_reason: String::new(),
            justified: false,
            justification: String::new(),
            source_location: String::new(),
            reachability: Reachability::Unknown,
        }
    }

    /// Look up a property by key string without interning the key.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        let id = interning::pool().get(key)?;
        self.properties.get(&id)
    }

    /// Case-insensitive lookup in the `Tags` string map.
    pub fn tag(&self, key: &str) -> Option<&str> {
        let tags = self.prop(constants::PROP_TAGS)?.as_str_map()?;
        tags.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn kind_is(&self, kind: &str) -> bool {
        interning::resolve(self.kind) == kind
    }
}

type EdgeList = SmallVec<[Edge; 2]>;

/// The index-aligned store. Mutation happens only on the builder thread;
/// no interior locking here.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
    forward: Vec<EdgeList>,
    reverse: Vec<EdgeList>,
    id_index: FxHashMap<InternedId, u32>,
    edge_count: usize,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of forward edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn index_of(&self, id: InternedId) -> Option<u32> {
        self.id_index.get(&id).copied()
    }

    pub fn get(&self, index: u32) -> Option<&Node> {
        self.nodes.get(index as usize)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut Node> {
        self.nodes.get_mut(index as usize)
    }

    pub fn get_by_id(&self, id: InternedId) -> Option<&Node> {
        self.index_of(id).and_then(|i| self.get(i))
    }

    pub fn get_by_id_mut(&mut self, id: InternedId) -> Option<&mut Node> {
        let index = self.index_of(id)?;
        self.get_mut(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Insert a node, or return the existing index for a known id. The
    /// caller merges properties afterwards; this never reassigns an index.
    pub fn insert(&mut self, id: InternedId, kind: InternedId) -> u32 {
        if let Some(&index) = self.id_index.get(&id) {
            return index;
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(Node::new(index, id, kind));
        self.forward.push(EdgeList::new());
        self.reverse.push(EdgeList::new());
        self.id_index.insert(id, index);
        index
    }

    /// Append a forward edge and its reverse mirror. Duplicate
    /// `(target, kind)` pairs are a no-op. Returns whether an edge was
    /// actually inserted.
    pub fn add_edge(&mut self, src: u32, edge: Edge) -> bool {
        let len = self.nodes.len();
        if src as usize >= len || edge.target as usize >= len {
            return false;
        }
        let exists = self.forward[src as usize]
            .iter()
            .any(|e| e.target == edge.target && e.kind == edge.kind);
        if exists {
            return false;
        }
        let mirror = Edge {
            target: src,
            kind: edge.kind,
            weight: edge.weight,
            metadata: edge.metadata.clone(),
        };
        self.reverse[edge.target as usize].push(mirror);
        self.forward[src as usize].push(edge);
        self.edge_count += 1;
        true
    }

    pub fn forward_edges(&self, index: u32) -> &[Edge] {
        self.forward
            .get(index as usize)
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    pub fn reverse_edges(&self, index: u32) -> &[Edge] {
        self.reverse
            .get(index as usize)
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }
}
