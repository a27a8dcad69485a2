//! Resource and dependency listings.
//!
//! These are the queries an agent runs after ingestion to answer "what does
//! X depend on" and "what breaks if X changes".

use anyhow::Result;
use neo4rs::Query;
use serde::Serialize;

use crate::GraphClient;

/// Maximum traversal depth for transitive lookups.
pub const MAX_DEPTH: u32 = 10;

/// A stored resource.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceRow {
    pub name: String,
    pub id: i64,
    pub label: String,
}

/// A stored `DEPENDS_ON` relationship.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyRow {
    pub from: String,
    pub to: String,
}

/// A resource reached by a transitive lookup, with its hop distance.
#[derive(Debug, Clone, Serialize)]
pub struct ReachedResource {
    pub name: String,
    pub label: String,
    pub depth: i64,
}

/// List all resources ordered by name.
pub async fn list_resources(client: &GraphClient) -> Result<Vec<ResourceRow>> {
    let query = Query::new(
        "MATCH (r:TerraformResource)
         RETURN r.name AS name, r.id AS id, COALESCE(r.label, r.name) AS label
         ORDER BY r.name"
            .to_string(),
    );

    let mut resources = Vec::new();
    for row in client.query(query).await? {
        let name: String = row.get("name").unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        resources.push(ResourceRow {
            name,
            id: row.get("id").unwrap_or(-1),
            label: row.get("label").unwrap_or_default(),
        });
    }
    Ok(resources)
}

/// List all dependencies ordered by source then target.
pub async fn list_dependencies(client: &GraphClient) -> Result<Vec<DependencyRow>> {
    let query = Query::new(
        "MATCH (s:TerraformResource)-[:DEPENDS_ON]->(t:TerraformResource)
         RETURN s.name AS from, t.name AS to
         ORDER BY from, to"
            .to_string(),
    );

    let rows = client.query(query).await?;
    Ok(rows
        .into_iter()
        .map(|row| DependencyRow {
            from: row.get("from").unwrap_or_default(),
            to: row.get("to").unwrap_or_default(),
        })
        .collect())
}

/// Everything `name` depends on, directly or transitively.
pub async fn dependencies_of(client: &GraphClient, name: &str, depth: u32) -> Result<Vec<ReachedResource>> {
    reach(client, name, depth, Direction::Outgoing).await
}

/// Everything that depends on `name`, directly or transitively.
pub async fn dependents_of(client: &GraphClient, name: &str, depth: u32) -> Result<Vec<ReachedResource>> {
    reach(client, name, depth, Direction::Incoming).await
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Outgoing,
    Incoming,
}

fn reach_cypher(depth: u32, direction: Direction) -> String {
    let depth = depth.clamp(1, MAX_DEPTH);
    let pattern = match direction {
        Direction::Outgoing => format!("(start)-[:DEPENDS_ON*1..{}]->(other:TerraformResource)", depth),
        Direction::Incoming => format!("(start)<-[:DEPENDS_ON*1..{}]-(other:TerraformResource)", depth),
    };

    format!(
        "MATCH (start:TerraformResource {{name: $name}})
         MATCH path = {}
         WITH other, min(length(path)) AS depth
         RETURN other.name AS name, COALESCE(other.label, other.name) AS label, depth
         ORDER BY depth, name",
        pattern
    )
}

async fn reach(client: &GraphClient, name: &str, depth: u32, direction: Direction) -> Result<Vec<ReachedResource>> {
    let query = Query::new(reach_cypher(depth, direction)).param("name", name);

    let rows = client.query(query).await?;
    Ok(rows
        .into_iter()
        .map(|row| ReachedResource {
            name: row.get("name").unwrap_or_default(),
            label: row.get("label").unwrap_or_default(),
            depth: row.get("depth").unwrap_or(1),
        })
        .filter(|r| !r.name.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reach_cypher_direction() {
        let out = reach_cypher(3, Direction::Outgoing);
        assert!(out.contains("(start)-[:DEPENDS_ON*1..3]->(other:TerraformResource)"));
        assert!(out.contains("{name: $name}"));

        let inc = reach_cypher(2, Direction::Incoming);
        assert!(inc.contains("(start)<-[:DEPENDS_ON*1..2]-(other:TerraformResource)"));
    }

    #[test]
    fn test_reach_cypher_depth_is_clamped() {
        assert!(reach_cypher(0, Direction::Outgoing).contains("*1..1]"));
        assert!(reach_cypher(99, Direction::Outgoing).contains(&format!("*1..{}]", MAX_DEPTH)));
    }
}
