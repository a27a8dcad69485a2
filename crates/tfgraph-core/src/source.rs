//! Input format detection and the single entry point for loading a graph
//! from whatever text the caller has.

use serde::Serialize;
use tracing::debug;

use crate::dot::{parse_dot_with, ParseOptions};
use crate::error::{TfGraphError, TfGraphResult};
use crate::graph::model::Graph;
use crate::graphviz::{parse_graphviz_json, GraphvizMetadata};

/// Supported graph description formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// DOT text from `terraform graph`.
    Dot,
    /// Graphviz JSON from `dot -Tjson`.
    GraphvizJson,
    /// The `{nodes, edges}` cache written by this tool.
    Cache,
}

impl InputFormat {
    /// Guess the format from the content.
    pub fn detect(input: &str) -> TfGraphResult<Self> {
        let trimmed = input.trim_start();
        if !trimmed.starts_with('{') {
            return Ok(Self::Dot);
        }

        let value: serde_json::Value = serde_json::from_str(trimmed)?;
        let Some(object) = value.as_object() else {
            return Err(TfGraphError::UnsupportedFormat("JSON document is not an object".to_string()));
        };

        if object.contains_key("objects") || object.contains_key("_subgraph_cnt") {
            Ok(Self::GraphvizJson)
        } else if object.contains_key("nodes") || object.contains_key("edges") {
            Ok(Self::Cache)
        } else if object.is_empty() {
            Ok(Self::Cache)
        } else {
            Err(TfGraphError::UnsupportedFormat(
                "JSON document has neither 'nodes' nor 'objects'".to_string(),
            ))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::GraphvizJson => "graphviz_json",
            Self::Cache => "cache",
        }
    }
}

/// A graph together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub format: InputFormat,
    pub graph: Graph,
    /// Only present for Graphviz JSON input.
    pub graphviz: Option<GraphvizMetadata>,
}

/// Load a graph from any supported format. The graph always satisfies
/// [`Graph::validate`].
pub fn load_graph(input: &str, options: &ParseOptions) -> TfGraphResult<LoadedGraph> {
    let format = InputFormat::detect(input)?;
    debug!(format = format.as_str(), "Detected graph input format");

    let (graph, graphviz) = match format {
        InputFormat::Dot => (parse_dot_with(input, options)?, None),
        InputFormat::GraphvizJson => {
            let import = parse_graphviz_json(input)?;
            (import.graph, Some(import.metadata))
        }
        InputFormat::Cache => (Graph::from_json(input)?, None),
    };
    graph.validate()?;
    Ok(LoadedGraph { format, graph, graphviz })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(InputFormat::detect("digraph {}").unwrap(), InputFormat::Dot);
        assert_eq!(InputFormat::detect("").unwrap(), InputFormat::Dot);
        assert_eq!(InputFormat::detect(r#"{"nodes": [], "edges": []}"#).unwrap(), InputFormat::Cache);
        assert_eq!(InputFormat::detect(r#" {"objects": []}"#).unwrap(), InputFormat::GraphvizJson);
        assert!(matches!(
            InputFormat::detect(r#"{"foo": 1}"#),
            Err(TfGraphError::UnsupportedFormat(_))
        ));
        assert!(matches!(InputFormat::detect("{not json"), Err(TfGraphError::Json(_))));
    }

    #[test]
    fn test_load_each_format_agrees() {
        let dot = "\"a\" [label=\"A\"]\n\"a\" -> \"b\"\n";
        let from_dot = load_graph(dot, &ParseOptions::default()).unwrap();
        assert_eq!(from_dot.format, InputFormat::Dot);
        assert!(from_dot.graphviz.is_none());

        let cache = from_dot.graph.to_json().unwrap();
        let from_cache = load_graph(&cache, &ParseOptions::default()).unwrap();
        assert_eq!(from_cache.format, InputFormat::Cache);
        assert_eq!(from_cache.graph, from_dot.graph);

        let gv = r#"{"name": "tf", "directed": true, "strict": false,
                     "objects": [{"_gvid": 0, "name": "a", "label": "A"}, {"_gvid": 1, "name": "b"}],
                     "edges": [{"tail": 0, "head": 1}]}"#;
        let from_gv = load_graph(gv, &ParseOptions::default()).unwrap();
        assert_eq!(from_gv.graph, from_dot.graph);

        let metadata = from_gv.graphviz.unwrap();
        assert_eq!(metadata.name, "tf");
        assert!(metadata.directed);
        assert!(!metadata.strict);
    }
}
