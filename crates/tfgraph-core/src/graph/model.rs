//! Resource graph domain models.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{TfGraphError, TfGraphResult};

/// Ordinal identity of a node within a single graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Terraform resource (or provider, module, variable...) in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: NodeId,
    pub name: String,
    pub label: String,
}

/// A directed "source depends on target" edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DependencyEdge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            label: None,
        }
    }

    /// The `(source, target)` pair edges are deduplicated on.
    pub fn key(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }
}

/// Canonical dependency graph: nodes in first-appearance order and a set of edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<ResourceNode>,
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a node by id.
    ///
    /// Parsed graphs store node `n` at index `n`, so that slot is tried first;
    /// graphs loaded from a cache may use arbitrary ids.
    pub fn node(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes
            .get(id.0)
            .filter(|n| n.id == id)
            .or_else(|| self.nodes.iter().find(|n| n.id == id))
    }

    /// Look up a node by its resource address.
    pub fn node_by_name(&self, name: &str) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Number of edges pointing at `id`.
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|e| e.target == id).count()
    }

    /// Number of edges leaving `id`.
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|e| e.source == id).count()
    }

    /// Direct dependencies of the named resource.
    pub fn dependencies_of(&self, name: &str) -> Vec<&ResourceNode> {
        let Some(node) = self.node_by_name(name) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .filter(|e| e.source == node.id)
            .filter_map(|e| self.node(e.target))
            .collect()
    }

    /// Resources that directly depend on the named resource.
    pub fn dependents_of(&self, name: &str) -> Vec<&ResourceNode> {
        let Some(node) = self.node_by_name(name) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .filter(|e| e.target == node.id)
            .filter_map(|e| self.node(e.source))
            .collect()
    }

    /// Counts plus the resources nothing depends on (roots) and the ones with no
    /// dependencies (leaves).
    pub fn summary(&self) -> GraphSummary {
        let mut has_dependents = HashSet::with_capacity(self.edges.len());
        let mut has_dependencies = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            has_dependencies.insert(edge.source);
            has_dependents.insert(edge.target);
        }

        let roots = self
            .nodes
            .iter()
            .filter(|n| !has_dependents.contains(&n.id))
            .map(|n| n.name.clone())
            .collect();
        let leaves = self
            .nodes
            .iter()
            .filter(|n| !has_dependencies.contains(&n.id))
            .map(|n| n.name.clone())
            .collect();

        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            roots,
            leaves,
        }
    }

    /// Check the graph invariants: unique ids, unique names, unique edges and
    /// no dangling edge endpoints.
    pub fn validate(&self) -> TfGraphResult<()> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        let mut names = HashSet::with_capacity(self.nodes.len());

        for node in &self.nodes {
            if node.name.is_empty() {
                return Err(TfGraphError::integrity(format!("node {} has an empty name", node.id)));
            }
            if !ids.insert(node.id) {
                return Err(TfGraphError::integrity(format!("duplicate node id {}", node.id)));
            }
            if !names.insert(node.name.as_str()) {
                return Err(TfGraphError::integrity(format!("duplicate node name '{}'", node.name)));
            }
        }

        let mut pairs = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            for endpoint in [edge.source, edge.target] {
                if !ids.contains(&endpoint) {
                    return Err(TfGraphError::integrity(format!(
                        "edge {} -> {} references unknown node {}",
                        edge.source, edge.target, endpoint
                    )));
                }
            }
            if !pairs.insert(edge.key()) {
                return Err(TfGraphError::integrity(format!(
                    "duplicate edge {} -> {}",
                    edge.source, edge.target
                )));
            }
        }

        Ok(())
    }
}

/// Overview of a graph for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub roots: Vec<String>,
    pub leaves: Vec<String>,
}
