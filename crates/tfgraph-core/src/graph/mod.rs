//! Canonical resource graph and its incremental builder.

pub mod model;

use std::collections::{HashMap, HashSet};

use model::{DependencyEdge, Graph, NodeId, ResourceNode};

/// Accumulates nodes and edges while a description is scanned.
///
/// Nodes are keyed by name; the first declaration wins and ids are handed out
/// in first-appearance order. Edges have set semantics on `(source, target)`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<ResourceNode>,
    index: HashMap<String, NodeId>,
    edges: Vec<DependencyEdge>,
    seen_edges: HashSet<(NodeId, NodeId)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node, returning its id. Redeclarations keep the original label.
    pub fn declare_node(&mut self, name: &str, label: Option<&str>) -> NodeId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(ResourceNode {
            id,
            name: name.to_string(),
            label: label.unwrap_or(name).to_string(),
        });
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Record an edge. Returns false when the pair was already present.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, label: Option<String>) -> bool {
        if !self.seen_edges.insert((source, target)) {
            return false;
        }
        self.edges.push(DependencyEdge { source, target, label });
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn build(self) -> Graph {
        Graph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_declaration_wins() {
        let mut builder = GraphBuilder::new();
        let a = builder.declare_node("a", Some("first"));
        let again = builder.declare_node("a", Some("second"));
        assert_eq!(a, again);

        let graph = builder.build();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].label, "first");
    }

    #[test]
    fn test_ids_follow_first_appearance() {
        let mut builder = GraphBuilder::new();
        builder.declare_node("z", None);
        builder.declare_node("a", None);
        builder.declare_node("z", None);
        builder.declare_node("m", None);

        let graph = builder.build();
        let order: Vec<_> = graph.nodes.iter().map(|n| (n.id.0, n.name.as_str())).collect();
        assert_eq!(order, vec![(0, "z"), (1, "a"), (2, "m")]);
        assert_eq!(graph.nodes[0].label, "z");
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut builder = GraphBuilder::new();
        let a = builder.declare_node("a", None);
        let b = builder.declare_node("b", None);
        assert!(builder.add_edge(a, b, Some("x".to_string())));
        assert!(!builder.add_edge(a, b, None));
        assert!(builder.add_edge(b, a, None));

        let graph = builder.build();
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].label.as_deref(), Some("x"));
    }
}
