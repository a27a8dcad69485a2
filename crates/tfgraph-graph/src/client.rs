//! Neo4j connection client.

use neo4rs::{ConfigBuilder, Graph, Query};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    "neo4j".to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: default_database(),
        }
    }
}

impl GraphConfig {
    /// Build a config from `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD` and
    /// `NEO4J_DATABASE`. Only the password is required.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GraphConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let defaults = Self::default();
        let password = lookup("NEO4J_PASSWORD")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| StoreError::Config("NEO4J_PASSWORD is not set".to_string()))?;

        Ok(Self {
            uri: lookup("NEO4J_URI").unwrap_or(defaults.uri),
            user: lookup("NEO4J_USER").unwrap_or(defaults.user),
            password,
            database: lookup("NEO4J_DATABASE").unwrap_or(defaults.database),
        })
    }
}

/// Client for Neo4j graph operations.
///
/// Owns the connection pool; dropping the client releases every connection.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    uri: String,
}

impl GraphClient {
    /// Create a new GraphClient from config.
    ///
    /// Note: neo4rs uses a lazy deadpool, so `Graph::connect` alone does not
    /// open a bolt connection. A `RETURN 1` ping forces the handshake so an
    /// unreachable server or bad credentials fail here rather than mid-ingest.
    pub async fn connect(config: &GraphConfig) -> StoreResult<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(4)
            .fetch_size(200)
            .build()
            .map_err(|e| StoreError::Config(format!("invalid Neo4j config: {}", e)))?;

        let graph = Graph::connect(neo4j_config)
            .await
            .map_err(|e| StoreError::connection(format!("failed to reach {}: {}", config.uri, e)))?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map_err(|e| StoreError::connection(format!("Neo4j at {} is not responding: {}", config.uri, e)))?;

        info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self {
            graph,
            uri: config.uri.clone(),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Execute a Cypher statement that returns no results.
    pub async fn execute(&self, query: Query) -> StoreResult<()> {
        self.graph
            .run(query)
            .await
            .map_err(|e| StoreError::from_driver(e, "Neo4j statement failed", StoreError::Write))
    }

    /// Execute a Cypher query and return results as rows.
    pub async fn query(&self, query: Query) -> StoreResult<Vec<neo4rs::Row>> {
        let mut result = self
            .graph
            .execute(query)
            .await
            .map_err(|e| StoreError::from_driver(e, "Neo4j query failed", StoreError::Query))?;

        let mut rows = Vec::new();
        loop {
            match result.next().await {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => break,
                Err(e) => return Err(StoreError::from_driver(e, "failed to read Neo4j result", StoreError::Query)),
            }
        }
        Ok(rows)
    }

    /// Execute a Cypher query and return a single scalar value.
    pub async fn query_scalar<T: DeserializeOwned>(&self, query: Query, field: &str) -> StoreResult<Option<T>> {
        let rows = self.query(query).await?;
        if let Some(row) = rows.into_iter().next() {
            let val: T = row
                .get(field)
                .map_err(|e| StoreError::Query(format!("Failed to get field '{}': {:?}", field, e)))?;
            Ok(Some(val))
        } else {
            Ok(None)
        }
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}
