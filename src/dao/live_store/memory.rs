//! In-memory live store used by unit tests and local development.

use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use serde_json::{Map, Value, json};

use crate::dao::live_store::LiveStore;
use crate::dao::storage::{StorageError, StorageResult};

/// Live store backed by a single JSON tree guarded by a mutex, so increments
/// are serialized exactly like the real backend resolves them server-side.
#[derive(Clone, Default)]
pub struct MemoryLiveStore {
    root: Arc<Mutex<Value>>,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TreeError(String);

impl MemoryLiveStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            root: Arc::new(Mutex::new(Value::Object(Map::new()))),
        }
    }

    fn with_root<T>(&self, apply: impl FnOnce(&mut Value) -> StorageResult<T>) -> StorageResult<T> {
        let mut guard = self
            .root
            .lock()
            .map_err(|_| StorageError::unavailable("live tree poisoned".into(), TreeError("poisoned mutex".into())))?;
        apply(&mut guard)
    }

    fn read(root: &Value, path: &str) -> Option<Value> {
        let mut node = root;
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            node = node.as_object()?.get(segment)?;
        }
        Some(node.clone())
    }

    /// Navigate to the parent object of `path`, creating intermediate objects.
    fn parent_entry<'tree>(
        root: &'tree mut Value,
        path: &str,
    ) -> StorageResult<(&'tree mut Map<String, Value>, String)> {
        let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(StorageError::unavailable(
                format!("empty live path `{path}`"),
                TreeError("empty path".into()),
            ));
        };

        let mut node = root;
        for segment in parents {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let map = node
                .as_object_mut()
                .ok_or_else(|| StorageError::unavailable(
                    format!("non-object node on `{path}`"),
                    TreeError("non-object node".into()),
                ))?;
            node = map
                .entry((*segment).to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let map = node
            .as_object_mut()
            .ok_or_else(|| StorageError::unavailable(
                format!("non-object node on `{path}`"),
                TreeError("non-object node".into()),
            ))?;
        Ok((map, (*leaf).to_owned()))
    }

    fn write(root: &mut Value, path: &str, value: Value) -> StorageResult<()> {
        let (parent, leaf) = Self::parent_entry(root, path)?;
        if value.is_null() {
            parent.remove(&leaf);
        } else {
            parent.insert(leaf, value);
        }
        Ok(())
    }
}

impl LiveStore for MemoryLiveStore {
    fn get(&self, path: String) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move {
            store.with_root(|root| {
                Ok(Self::read(root, &path).filter(|value| !value.is_null()))
            })
        })
    }

    fn set(&self, path: String, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.with_root(|root| Self::write(root, &path, value)) })
    }

    fn update(
        &self,
        path: String,
        entries: Map<String, Value>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with_root(|root| {
                for (child, value) in entries {
                    Self::write(root, &format!("{path}/{child}"), value)?;
                }
                Ok(())
            })
        })
    }

    fn increment(&self, path: String, delta: i64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with_root(|root| {
                let current = Self::read(root, &path)
                    .and_then(|value| value.as_i64())
                    .unwrap_or(0);
                // Clamp at the i64 bounds instead of overflowing on extreme deltas.
                Self::write(root, &path, json!(current.saturating_add(delta)))
            })
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_subtree() {
        let store = MemoryLiveStore::new();
        store
            .set(
                "session_1".into(),
                json!({"active": true, "points": {"p1": 10}}),
            )
            .await
            .unwrap();

        let subtree = store.get("session_1".into()).await.unwrap().unwrap();
        assert_eq!(subtree["points"]["p1"], json!(10));
        let leaf = store.get("session_1/points/p1".into()).await.unwrap();
        assert_eq!(leaf, Some(json!(10)));
    }

    #[tokio::test]
    async fn missing_path_reads_none() {
        let store = MemoryLiveStore::new();
        assert_eq!(store.get("session_missing".into()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn null_write_removes_subtree() {
        let store = MemoryLiveStore::new();
        store
            .set("session_1/points/p1".into(), json!(10))
            .await
            .unwrap();
        store
            .set("session_1/points/p1".into(), Value::Null)
            .await
            .unwrap();
        assert_eq!(
            store.get("session_1/points/p1".into()).await.unwrap(),
            None
        );
        // Siblings survive.
        store
            .set("session_1/active".into(), json!(true))
            .await
            .unwrap();
        assert!(store.get("session_1".into()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_merges_children() {
        let store = MemoryLiveStore::new();
        store
            .set(
                "session_1".into(),
                json!({"active": true, "points": {"p1": 10, "p2": 10}}),
            )
            .await
            .unwrap();

        let mut entries = Map::new();
        entries.insert("active".into(), json!(false));
        store.update("session_1".into(), entries).await.unwrap();

        let subtree = store.get("session_1".into()).await.unwrap().unwrap();
        assert_eq!(subtree["active"], json!(false));
        assert_eq!(subtree["points"]["p2"], json!(10));
    }

    #[tokio::test]
    async fn concurrent_increments_all_land() {
        let store = MemoryLiveStore::new();
        store
            .set("session_1/points/p1".into(), json!(10))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for delta in [1_i64, -2, 3, 4, -1, 5, 2, -3] {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .increment("session_1/points/p1".into(), delta)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let total = store
            .get("session_1/points/p1".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(total, json!(10 + 1 - 2 + 3 + 4 - 1 + 5 + 2 - 3));
    }

    #[tokio::test]
    async fn increment_saturates_at_the_i64_bounds() {
        let store = MemoryLiveStore::new();
        store
            .set("session_1/points/p1".into(), json!(i64::MAX - 1))
            .await
            .unwrap();
        store
            .increment("session_1/points/p1".into(), i64::MAX)
            .await
            .unwrap();
        assert_eq!(
            store.get("session_1/points/p1".into()).await.unwrap(),
            Some(json!(i64::MAX))
        );

        store
            .set("session_1/points/p2".into(), json!(i64::MIN + 1))
            .await
            .unwrap();
        store
            .increment("session_1/points/p2".into(), i64::MIN)
            .await
            .unwrap();
        assert_eq!(
            store.get("session_1/points/p2".into()).await.unwrap(),
            Some(json!(i64::MIN))
        );
    }

    #[tokio::test]
    async fn increment_treats_absent_leaf_as_zero() {
        let store = MemoryLiveStore::new();
        store
            .increment("session_1/points/p1".into(), 7)
            .await
            .unwrap();
        assert_eq!(
            store.get("session_1/points/p1".into()).await.unwrap(),
            Some(json!(7))
        );
    }
}
