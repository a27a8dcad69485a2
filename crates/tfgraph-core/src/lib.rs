//! tfgraph core library
//!
//! Parses the dependency graph printed by `terraform graph` (DOT text or its
//! Graphviz JSON rendering) into a canonical, deduplicated node/edge model
//! that can be cached as JSON and ingested into a graph database.

pub mod cache;
pub mod dot;
pub mod error;
pub mod graph;
pub mod graphviz;
pub mod source;

pub use dot::{parse_dot, parse_dot_with, ParseOptions};
pub use error::{TfGraphError, TfGraphResult};
pub use graph::model::{DependencyEdge, Graph, GraphSummary, NodeId, ResourceNode};
pub use graph::GraphBuilder;
pub use source::{load_graph, InputFormat, LoadedGraph};
