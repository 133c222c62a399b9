use crate::domain::edge::{Edge, EdgeKind};
use crate::domain::node::{NodeId, NodeKind, facts};
use crate::domain::ports::FactSink;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

/// A node of the fact graph with its accumulated facts.
#[derive(Debug, Clone)]
pub struct FactNode {
    pub id: NodeId,
    pub facts: BTreeMap<String, String>,
}

/// Edge weight: kind plus optional ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLabel {
    pub kind: EdgeKind,
    pub ordinal: Option<u32>,
}

#[derive(Default)]
struct Inner {
    graph: DiGraph<FactNode, EdgeLabel>,
    index: HashMap<NodeId, NodeIndex>,
    edges: HashSet<Edge>,
}

impl Inner {
    fn ensure_node(&mut self, id: &NodeId) -> NodeIndex {
        if let Some(idx) = self.index.get(id) {
            return *idx;
        }
        let idx = self.graph.add_node(FactNode {
            id: id.clone(),
            facts: BTreeMap::new(),
        });
        self.index.insert(id.clone(), idx);
        idx
    }
}

/// In-memory fact store. Identical facts and edges are recorded once.
#[derive(Default)]
pub struct FactGraph {
    inner: RwLock<Inner>,
}

impl FactGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().unwrap().graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.read().unwrap().graph.edge_count()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.inner.read().unwrap().index.contains_key(id)
    }

    pub fn facts(&self, id: &NodeId) -> Option<BTreeMap<String, String>> {
        let inner = self.inner.read().unwrap();
        inner
            .index
            .get(id)
            .map(|idx| inner.graph[*idx].facts.clone())
    }

    pub fn fact(&self, id: &NodeId, name: &str) -> Option<String> {
        let inner = self.inner.read().unwrap();
        let idx = inner.index.get(id)?;
        inner.graph[*idx].facts.get(name).cloned()
    }

    pub fn kind_of(&self, id: &NodeId) -> Option<NodeKind> {
        self.fact(id, facts::NODE_KIND)
            .and_then(|k| NodeKind::parse(&k))
    }

    pub fn has_edge(&self, source: &NodeId, kind: EdgeKind, target: &NodeId) -> bool {
        self.edges_from(source)
            .iter()
            .any(|e| e.kind == kind && &e.target == target)
    }

    /// Outgoing edges of `source`, sorted.
    pub fn edges_from(&self, source: &NodeId) -> Vec<Edge> {
        let inner = self.inner.read().unwrap();
        let Some(idx) = inner.index.get(source) else {
            return Vec::new();
        };
        let mut edges: Vec<Edge> = inner
            .graph
            .edges(*idx)
            .map(|e| Edge {
                source: source.clone(),
                kind: e.weight().kind,
                target: inner.graph[e.target()].id.clone(),
                ordinal: e.weight().ordinal,
            })
            .collect();
        edges.sort();
        edges
    }

    /// Incoming edges of `target`, sorted.
    pub fn edges_to(&self, target: &NodeId) -> Vec<Edge> {
        let inner = self.inner.read().unwrap();
        let Some(idx) = inner.index.get(target) else {
            return Vec::new();
        };
        let mut edges: Vec<Edge> = inner
            .graph
            .edges_directed(*idx, petgraph::Direction::Incoming)
            .map(|e| Edge {
                source: inner.graph[e.source()].id.clone(),
                kind: e.weight().kind,
                target: target.clone(),
                ordinal: e.weight().ordinal,
            })
            .collect();
        edges.sort();
        edges
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> Vec<Edge> {
        let inner = self.inner.read().unwrap();
        let mut edges: Vec<Edge> = inner.edges.iter().filter(|e| e.kind == kind).cloned().collect();
        edges.sort();
        edges
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        let inner = self.inner.read().unwrap();
        let mut nodes: Vec<NodeId> = inner
            .graph
            .node_weights()
            .filter(|n| {
                n.facts
                    .get(facts::NODE_KIND)
                    .is_some_and(|k| k == kind.as_str())
            })
            .map(|n| n.id.clone())
            .collect();
        nodes.sort();
        nodes
    }

    /// All edges, for order-independent comparison.
    pub fn edge_set(&self) -> HashSet<Edge> {
        self.inner.read().unwrap().edges.clone()
    }

    /// All node identifiers, sorted.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<NodeId> = inner.index.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Count of nodes per `node/kind` fact.
    pub fn kind_histogram(&self) -> BTreeMap<String, usize> {
        let inner = self.inner.read().unwrap();
        let mut histogram = BTreeMap::new();
        for node in inner.graph.node_weights() {
            let kind = node
                .facts
                .get(facts::NODE_KIND)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string());
            *histogram.entry(kind).or_insert(0) += 1;
        }
        histogram
    }

    /// Count of edges per kind.
    pub fn edge_histogram(&self) -> BTreeMap<String, usize> {
        let inner = self.inner.read().unwrap();
        let mut histogram = BTreeMap::new();
        for edge in &inner.edges {
            *histogram.entry(edge.kind.as_str().to_string()).or_insert(0) += 1;
        }
        histogram
    }
}

impl FactSink for FactGraph {
    fn emit_fact(&self, node: &NodeId, name: &str, value: &str) {
        let mut inner = self.inner.write().unwrap();
        let idx = inner.ensure_node(node);
        inner.graph[idx]
            .facts
            .insert(name.to_string(), value.to_string());
    }

    fn emit_edge(&self, edge: &Edge) {
        let mut inner = self.inner.write().unwrap();
        if !inner.edges.insert(edge.clone()) {
            return;
        }
        let source = inner.ensure_node(&edge.source);
        let target = inner.ensure_node(&edge.target);
        inner.graph.add_edge(
            source,
            target,
            EdgeLabel {
                kind: edge.kind,
                ordinal: edge.ordinal,
            },
        );
    }
}
