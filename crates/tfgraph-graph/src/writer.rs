//! Idempotent ingestion of a resource graph.
//!
//! Every resource is MERGEd by name before any dependency is written, so the
//! edge statements can always resolve their endpoints. Re-running an ingest
//! with the same graph leaves the store unchanged.
//!
//! By default a record that fails to write is logged and skipped; connection
//! failures always abort. Strict mode aborts on the first failure instead.

use serde::Serialize;
use tracing::{debug, info, warn};

use tfgraph_core::{Graph, ResourceNode};

use crate::error::{StoreError, StoreResult};
use crate::schema::DEPENDS_ON;
use crate::store::GraphStore;

/// Which optional steps an ingest runs.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Delete previously stored resources first. When false the ingest merges
    /// into whatever is already there.
    pub clear: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { clear: true }
    }
}

/// Written/skipped counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub written: usize,
    pub skipped: usize,
}

/// Result of a full ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub cleared: bool,
    pub constraint_ensured: bool,
    pub nodes: BatchReport,
    pub relationships: BatchReport,
}

impl IngestReport {
    pub fn skipped(&self) -> usize {
        self.nodes.skipped + self.relationships.skipped
    }
}

/// Writes canonical graphs into a [`GraphStore`].
pub struct GraphWriter<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    strict: bool,
}

impl<'a, S: GraphStore + ?Sized> GraphWriter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store, strict: false }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Create the uniqueness constraint on resource names.
    ///
    /// Returns false if the database refused (e.g. missing privileges); the
    /// ingest can proceed without it. Connection failures are still errors.
    pub async fn ensure_constraints(&self) -> StoreResult<bool> {
        match self.store.create_resource_constraint().await {
            Ok(()) => {
                debug!("Resource constraint ensured");
                Ok(true)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(error = %e, "Could not create resource constraint, continuing without it");
                Ok(false)
            }
        }
    }

    /// Delete all stored resources and their relationships.
    pub async fn clear_graph(&self) -> StoreResult<()> {
        self.store.delete_resources().await?;
        info!("Cleared existing resources");
        Ok(())
    }

    /// Merge every node by name.
    pub async fn upsert_nodes(&self, nodes: &[ResourceNode]) -> StoreResult<BatchReport> {
        let mut report = BatchReport::default();

        for node in nodes {
            let outcome = if node.name.trim().is_empty() {
                Err(StoreError::write(format!("node {} has an empty name", node.id)))
            } else {
                self.store.merge_resource(node).await
            };

            match outcome {
                Ok(()) => {
                    report.written += 1;
                    debug!(id = %node.id, name = %node.name, "Merged resource");
                }
                Err(e) if self.aborts_on(&e) => return Err(e),
                Err(e) => {
                    warn!(id = %node.id, name = %node.name, error = %e, "Skipped resource");
                    report.skipped += 1;
                }
            }
        }

        info!(written = report.written, skipped = report.skipped, "Resources ingested");
        Ok(report)
    }

    /// Merge one `DEPENDS_ON` relationship per edge. Endpoints are resolved
    /// through `graph`, so its nodes must have been upserted first.
    pub async fn upsert_edges(&self, graph: &Graph) -> StoreResult<BatchReport> {
        let mut report = BatchReport::default();

        for edge in &graph.edges {
            let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target)) else {
                let e = StoreError::write(format!(
                    "edge {} -> {} references a node missing from the graph",
                    edge.source, edge.target
                ));
                if self.strict {
                    return Err(e);
                }
                warn!(source = %edge.source, target = %edge.target, error = %e, "Skipped dangling dependency");
                report.skipped += 1;
                continue;
            };

            let label = edge.label.as_deref().unwrap_or(DEPENDS_ON);
            let outcome = match self.store.merge_dependency(&source.name, &target.name, label).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(StoreError::write(format!(
                    "endpoints of {} -> {} are not stored",
                    source.name, target.name
                ))),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {
                    report.written += 1;
                    debug!(source = %source.name, target = %target.name, "Merged dependency");
                }
                Err(e) if self.aborts_on(&e) => return Err(e),
                Err(e) => {
                    warn!(source = %source.name, target = %target.name, error = %e, "Skipped dependency");
                    report.skipped += 1;
                }
            }
        }

        info!(written = report.written, skipped = report.skipped, "Dependencies ingested");
        Ok(report)
    }

    /// Run the whole protocol: optional clear, constraint, nodes, then edges.
    pub async fn ingest(&self, graph: &Graph, options: &IngestOptions) -> StoreResult<IngestReport> {
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            clear = options.clear,
            strict = self.strict,
            "Starting graph ingestion"
        );

        let mut report = IngestReport::default();

        if options.clear {
            self.clear_graph().await?;
            report.cleared = true;
        }

        report.constraint_ensured = self.ensure_constraints().await?;
        report.nodes = self.upsert_nodes(&graph.nodes).await?;
        report.relationships = self.upsert_edges(graph).await?;

        info!(
            nodes_written = report.nodes.written,
            relationships_written = report.relationships.written,
            skipped = report.skipped(),
            "Graph ingestion complete"
        );
        Ok(report)
    }

    fn aborts_on(&self, error: &StoreError) -> bool {
        self.strict || error.is_fatal()
    }
}
