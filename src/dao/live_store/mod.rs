//! Low-latency hierarchical store holding the volatile live-session mirror.

#[cfg(feature = "http-live")]
pub mod http;
pub mod memory;

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::dao::storage::StorageResult;

/// Abstraction over the hierarchical live store.
///
/// Paths are slash-separated segments derived by [`crate::ident`]. Writing
/// JSON `null` removes the subtree at the path, matching the backend's tree
/// semantics. `increment` is atomic and commutative: concurrent increments on
/// the same path are all applied and none are lost.
pub trait LiveStore: Send + Sync {
    /// Read the subtree at `path`; `None` when nothing is stored there.
    fn get(&self, path: String) -> BoxFuture<'static, StorageResult<Option<Value>>>;
    /// Overwrite the subtree at `path`. `Value::Null` deletes it.
    fn set(&self, path: String, value: Value) -> BoxFuture<'static, StorageResult<()>>;
    /// Merge `entries` into the children of `path`, leaving siblings untouched.
    fn update(
        &self,
        path: String,
        entries: Map<String, Value>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Atomically add `delta` to the numeric leaf at `path`, treating an
    /// absent leaf as zero. Resolved server-side; safe under concurrency.
    fn increment(&self, path: String, delta: i64) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap connectivity probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
