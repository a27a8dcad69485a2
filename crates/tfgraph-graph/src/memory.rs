//! In-memory [`GraphStore`], used for dry runs and tests.
//!
//! Mirrors the MERGE semantics of the Neo4j statements: resources are keyed by
//! name and at most one `DEPENDS_ON` exists per ordered pair.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tfgraph_core::ResourceNode;

use crate::client::GraphCounts;
use crate::error::{StoreError, StoreResult};
use crate::store::GraphStore;

/// A resource as stored by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResource {
    pub id: usize,
    pub label: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    resources: BTreeMap<String, StoredResource>,
    dependencies: BTreeMap<(String, String), String>,
    constraint: bool,
    statements: usize,
    // failure injection
    rejected_names: HashSet<String>,
    deny_constraint: bool,
    offline: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreError::write("memory store lock poisoned"))?;
        if state.offline {
            return Err(StoreError::connection("memory store is offline"));
        }
        Ok(state)
    }

    /// Make every write touching `name` fail with a write error.
    pub fn reject_writes_for(&self, name: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.rejected_names.insert(name.to_string());
        }
    }

    /// Make constraint creation fail, as with insufficient privileges.
    pub fn deny_constraints(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.deny_constraint = true;
        }
    }

    /// Make every operation fail with a connection error.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.offline = offline;
        }
    }

    pub fn has_constraint(&self) -> bool {
        self.state.lock().map(|s| s.constraint).unwrap_or(false)
    }

    pub fn resource(&self, name: &str) -> Option<StoredResource> {
        self.state.lock().ok()?.resources.get(name).cloned()
    }

    /// Stored dependencies as `(source, target, label)`, ordered.
    pub fn dependencies(&self) -> Vec<(String, String, String)> {
        self.state
            .lock()
            .map(|s| {
                s.dependencies
                    .iter()
                    .map(|((from, to), label)| (from.clone(), to.clone(), label.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of statements accepted so far.
    pub fn statement_count(&self) -> usize {
        self.state.lock().map(|s| s.statements).unwrap_or(0)
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn create_resource_constraint(&self) -> StoreResult<()> {
        let mut state = self.state()?;
        if state.deny_constraint {
            return Err(StoreError::write("permission denied: cannot create constraint"));
        }
        state.constraint = true;
        state.statements += 1;
        Ok(())
    }

    async fn delete_resources(&self) -> StoreResult<()> {
        let mut state = self.state()?;
        state.resources.clear();
        state.dependencies.clear();
        state.statements += 1;
        Ok(())
    }

    async fn merge_resource(&self, node: &ResourceNode) -> StoreResult<()> {
        let mut state = self.state()?;
        if state.rejected_names.contains(&node.name) {
            return Err(StoreError::write(format!("rejected resource '{}'", node.name)));
        }
        state.resources.insert(
            node.name.clone(),
            StoredResource {
                id: node.id.0,
                label: node.label.clone(),
            },
        );
        state.statements += 1;
        Ok(())
    }

    async fn merge_dependency(&self, source: &str, target: &str, label: &str) -> StoreResult<bool> {
        let mut state = self.state()?;
        if state.rejected_names.contains(source) || state.rejected_names.contains(target) {
            return Err(StoreError::write(format!("rejected dependency {} -> {}", source, target)));
        }
        state.statements += 1;
        if !state.resources.contains_key(source) || !state.resources.contains_key(target) {
            return Ok(false);
        }
        state
            .dependencies
            .insert((source.to_string(), target.to_string()), label.to_string());
        Ok(true)
    }

    async fn counts(&self) -> StoreResult<GraphCounts> {
        let state = self.state()?;
        Ok(GraphCounts {
            nodes: state.resources.len(),
            relationships: state.dependencies.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfgraph_core::NodeId;

    fn resource(id: usize, name: &str) -> ResourceNode {
        ResourceNode {
            id: NodeId(id),
            name: name.to_string(),
            label: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_merge_is_keyed_by_name() {
        let store = MemoryStore::new();
        store.merge_resource(&resource(0, "a")).await.unwrap();
        store.merge_resource(&resource(5, "a")).await.unwrap();

        assert_eq!(store.counts().await.unwrap().nodes, 1);
        assert_eq!(store.resource("a").unwrap().id, 5);
    }

    #[tokio::test]
    async fn test_dependency_requires_endpoints() {
        let store = MemoryStore::new();
        store.merge_resource(&resource(0, "a")).await.unwrap();
        assert!(!store.merge_dependency("a", "b", "DEPENDS_ON").await.unwrap());

        store.merge_resource(&resource(1, "b")).await.unwrap();
        assert!(store.merge_dependency("a", "b", "DEPENDS_ON").await.unwrap());
        assert!(store.merge_dependency("a", "b", "DEPENDS_ON").await.unwrap());
        assert_eq!(store.counts().await.unwrap().relationships, 1);
        // two resources, three dependency statements
        assert_eq!(store.statement_count(), 5);
    }

    #[tokio::test]
    async fn test_offline_store_reports_connection_error() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.counts().await.unwrap_err();
        assert!(err.is_fatal());
    }
}
