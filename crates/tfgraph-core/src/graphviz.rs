//! Import of Graphviz JSON (`terraform graph | dot -Tjson`).
//!
//! Graphviz numbers nodes with `_gvid` and edges refer to those numbers via
//! `tail`/`head`. Subgraph objects share the `objects` array and are skipped.
//! The result is rebuilt through [`GraphBuilder`] so ids are first-appearance
//! ordinals like a DOT parse.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{TfGraphError, TfGraphResult};
use crate::graph::model::Graph;
use crate::graph::GraphBuilder;

/// Graph-level attributes carried by the JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphvizMetadata {
    pub name: String,
    pub directed: bool,
    pub strict: bool,
}

/// A normalized graph plus the document metadata.
#[derive(Debug, Clone)]
pub struct GraphvizImport {
    pub graph: Graph,
    pub metadata: GraphvizMetadata,
}

#[derive(Debug, Deserialize)]
struct GraphvizDocument {
    name: Option<String>,
    #[serde(default = "default_directed")]
    directed: bool,
    #[serde(default)]
    strict: bool,
    #[serde(rename = "_subgraph_cnt", default)]
    subgraph_count: usize,
    #[serde(default)]
    objects: Vec<GraphvizObject>,
    #[serde(default)]
    edges: Vec<GraphvizEdge>,
}

#[derive(Debug, Deserialize)]
struct GraphvizObject {
    #[serde(rename = "_gvid")]
    gvid: Option<usize>,
    name: Option<String>,
    label: Option<String>,
    nodes: Option<Vec<usize>>,
    subgraphs: Option<Vec<usize>>,
}

impl GraphvizObject {
    fn is_subgraph(&self) -> bool {
        self.nodes.is_some() || self.subgraphs.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct GraphvizEdge {
    tail: usize,
    head: usize,
    label: Option<String>,
}

fn default_directed() -> bool {
    true
}

/// Parse `dot -Tjson` output into a canonical graph.
pub fn parse_graphviz_json(input: &str) -> TfGraphResult<GraphvizImport> {
    let doc: GraphvizDocument = serde_json::from_str(input)?;

    let mut builder = GraphBuilder::new();
    let mut by_gvid = HashMap::new();

    for (position, object) in doc.objects.iter().enumerate() {
        if position < doc.subgraph_count || object.is_subgraph() {
            continue;
        }
        let Some(gvid) = object.gvid else {
            continue;
        };
        let name = object
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| TfGraphError::integrity(format!("graphviz object {} has no name", gvid)))?;

        // `\N` is Graphviz's placeholder for the node name.
        let label = object.label.as_deref().filter(|l| *l != "\\N");
        let id = builder.declare_node(name, label);
        by_gvid.insert(gvid, id);
    }

    for edge in &doc.edges {
        let resolve = |gvid: usize| {
            by_gvid.get(&gvid).copied().ok_or_else(|| {
                TfGraphError::integrity(format!(
                    "edge {} -> {} references unknown graphviz node {}",
                    edge.tail, edge.head, gvid
                ))
            })
        };
        let source = resolve(edge.tail)?;
        let target = resolve(edge.head)?;
        builder.add_edge(source, target, edge.label.clone());
    }

    let metadata = GraphvizMetadata {
        name: doc.name.unwrap_or_else(|| "terraform_graph".to_string()),
        directed: doc.directed,
        strict: doc.strict,
    };
    let graph = builder.build();
    debug!(
        name = %metadata.name,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Imported Graphviz JSON graph"
    );

    Ok(GraphvizImport { graph, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::NodeId;

    const SAMPLE: &str = r#"{
      "name": "%3",
      "directed": true,
      "strict": false,
      "_subgraph_cnt": 1,
      "objects": [
        {"_gvid": 0, "name": "root", "nodes": [1, 2, 3]},
        {"_gvid": 1, "name": "[root] aws_instance.web (expand)", "label": "aws_instance.web", "shape": "box"},
        {"_gvid": 2, "name": "[root] aws_vpc.main (expand)", "label": "aws_vpc.main", "shape": "box"},
        {"_gvid": 3, "name": "[root] var.region", "label": "\\N"}
      ],
      "edges": [
        {"_gvid": 0, "tail": 1, "head": 2},
        {"_gvid": 1, "tail": 1, "head": 3},
        {"_gvid": 2, "tail": 1, "head": 2}
      ]
    }"#;

    #[test]
    fn test_import_skips_subgraphs_and_dedupes() {
        let import = parse_graphviz_json(SAMPLE).unwrap();
        let graph = import.graph;

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.nodes[0].id, NodeId(0));
        assert_eq!(graph.nodes[0].label, "aws_instance.web");
        assert_eq!(graph.nodes[2].label, "[root] var.region");
        assert_eq!(graph.out_degree(NodeId(0)), 2);
        graph.validate().unwrap();

        assert_eq!(import.metadata.name, "%3");
        assert!(import.metadata.directed);
        assert!(!import.metadata.strict);
    }

    #[test]
    fn test_unknown_edge_endpoint() {
        let input = r#"{"objects": [{"_gvid": 0, "name": "a"}], "edges": [{"tail": 0, "head": 5}]}"#;
        let err = parse_graphviz_json(input).unwrap_err();
        assert!(matches!(err, TfGraphError::Integrity(_)));
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let import = parse_graphviz_json(r#"{"name": "empty"}"#).unwrap();
        assert!(import.graph.is_empty());
        assert_eq!(import.metadata.name, "empty");
    }
}
