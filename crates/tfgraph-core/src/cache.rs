//! JSON cache of a parsed graph, so ingestion can be repeated without
//! re-running `terraform graph`.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::TfGraphResult;
use crate::graph::model::Graph;

impl Graph {
    /// Serialize to the cache format `{"nodes": [...], "edges": [...]}`.
    pub fn to_json(&self) -> TfGraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a cache document back. The graph is validated before it is returned.
    pub fn from_json(input: &str) -> TfGraphResult<Self> {
        let graph: Graph = serde_json::from_str(input)?;
        graph.validate()?;
        Ok(graph)
    }
}

/// Write a graph cache file, creating parent directories as needed.
pub fn save_cache(graph: &Graph, path: &Path) -> TfGraphResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, graph.to_json()?)?;
    info!(path = %path.display(), nodes = graph.node_count(), edges = graph.edge_count(), "Graph cache written");
    Ok(())
}

/// Load a graph cache file.
pub fn load_cache(path: &Path) -> TfGraphResult<Graph> {
    let content = fs::read_to_string(path)?;
    Graph::from_json(&content)
}
