//! The write seam between the ingestion protocol and a concrete database.

use async_trait::async_trait;
use neo4rs::Query;
use tracing::debug;

use tfgraph_core::ResourceNode;

use crate::client::{GraphClient, GraphCounts};
use crate::error::{StoreError, StoreResult};
use crate::schema;

/// Primitive idempotent writes the [`GraphWriter`](crate::GraphWriter) is built on.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create the uniqueness constraint (and supporting index) if missing.
    async fn create_resource_constraint(&self) -> StoreResult<()>;

    /// Delete every resource node and its relationships.
    async fn delete_resources(&self) -> StoreResult<()>;

    /// Merge a resource by name and set its `id` and `label`.
    async fn merge_resource(&self, node: &ResourceNode) -> StoreResult<()>;

    /// Merge a `DEPENDS_ON` relationship between two stored resources.
    /// Returns false when either endpoint is not in the store.
    async fn merge_dependency(&self, source: &str, target: &str, label: &str) -> StoreResult<bool>;

    /// Count stored resources and dependencies.
    async fn counts(&self) -> StoreResult<GraphCounts>;
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn create_resource_constraint(&self) -> StoreResult<()> {
        for statement in schema::SCHEMA_STATEMENTS {
            self.execute(Query::new(statement.to_string())).await?;
        }
        debug!(statements = schema::SCHEMA_STATEMENTS.len(), "Neo4j schema ensured");
        Ok(())
    }

    async fn delete_resources(&self) -> StoreResult<()> {
        self.execute(Query::new(schema::CLEAR_RESOURCES.to_string())).await
    }

    async fn merge_resource(&self, node: &ResourceNode) -> StoreResult<()> {
        let query = Query::new(schema::MERGE_RESOURCE.to_string())
            .param("name", node.name.as_str())
            .param("id", node.id.0 as i64)
            .param("label", node.label.as_str());

        self.execute(query).await
    }

    async fn merge_dependency(&self, source: &str, target: &str, label: &str) -> StoreResult<bool> {
        let query = Query::new(schema::MERGE_DEPENDENCY.to_string())
            .param("source", source)
            .param("target", target)
            .param("label", label);

        let count: i64 = self
            .query_scalar(query, "count")
            .await
            .map_err(|e| match e {
                StoreError::Query(msg) => StoreError::Write(msg),
                other => other,
            })?
            .unwrap_or(0);
        Ok(count > 0)
    }

    async fn counts(&self) -> StoreResult<GraphCounts> {
        let nodes: i64 = self
            .query_scalar(Query::new(schema::COUNT_RESOURCES.to_string()), "count")
            .await?
            .unwrap_or(0);
        let relationships: i64 = self
            .query_scalar(Query::new(schema::COUNT_DEPENDENCIES.to_string()), "count")
            .await?
            .unwrap_or(0);

        Ok(GraphCounts {
            nodes: nodes as usize,
            relationships: relationships as usize,
        })
    }
}
