//! Verbatim Cypher passthrough.

use anyhow::Result;
use neo4rs::{Query, Row};
use tracing::debug;

use crate::GraphClient;

/// Execute a raw Cypher query and return one JSON object per row, keyed by
/// column name.
pub async fn raw_query(client: &GraphClient, cypher: &str) -> Result<Vec<serde_json::Value>> {
    let rows = client.query(Query::new(cypher.to_string())).await?;
    Ok(rows.iter().map(row_to_json).collect())
}

/// Columns that have no JSON form (e.g. spatial values) fall back to the
/// row's debug rendering.
fn row_to_json(row: &Row) -> serde_json::Value {
    match row.to_strict::<serde_json::Value>() {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Row is not representable as JSON");
            serde_json::json!({ "row": format!("{:?}", row) })
        }
    }
}
