//! Neo4j schema: node label, relationship type and constraints.

/// Label of every Terraform resource node.
pub const RESOURCE_LABEL: &str = "TerraformResource";

/// Relationship type for "source depends on target".
pub const DEPENDS_ON: &str = "DEPENDS_ON";

/// Uniqueness constraint on the resource address.
pub const RESOURCE_NAME_CONSTRAINT: &str =
    "CREATE CONSTRAINT terraform_resource_name IF NOT EXISTS FOR (r:TerraformResource) REQUIRE r.name IS UNIQUE";

/// Lookup index on the ordinal id, used by ad-hoc queries joining on the cache.
pub const RESOURCE_ID_INDEX: &str =
    "CREATE INDEX terraform_resource_id IF NOT EXISTS FOR (r:TerraformResource) ON (r.id)";

/// Cypher statements for schema initialization.
pub const SCHEMA_STATEMENTS: &[&str] = &[RESOURCE_NAME_CONSTRAINT, RESOURCE_ID_INDEX];

/// Remove every resource node together with its relationships.
pub const CLEAR_RESOURCES: &str = "MATCH (r:TerraformResource) DETACH DELETE r";

/// Upsert one resource by address.
pub const MERGE_RESOURCE: &str = "MERGE (r:TerraformResource {name: $name})
     SET r.id = $id,
         r.label = $label";

/// Upsert one dependency between two existing resources.
pub const MERGE_DEPENDENCY: &str = "MATCH (s:TerraformResource {name: $source}), (t:TerraformResource {name: $target})
     MERGE (s)-[d:DEPENDS_ON]->(t)
     SET d.label = $label
     RETURN count(d) AS count";

pub const COUNT_RESOURCES: &str = "MATCH (r:TerraformResource) RETURN count(r) AS count";

pub const COUNT_DEPENDENCIES: &str =
    "MATCH (:TerraformResource)-[d:DEPENDS_ON]->(:TerraformResource) RETURN count(d) AS count";
