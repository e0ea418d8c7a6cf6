use async_trait::async_trait;
use serde_json::Value;

use crate::{RawDocument, StoreResult};

/// Collection-oriented JSON document storage.
///
/// Backends must make the unique-field check and the write a single atomic
/// step, so two concurrent inserts of the same value cannot both succeed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document. Fails with `Duplicate` when any of `unique`
    /// collides with another document in the collection.
    async fn insert(&self, collection: &str, doc: RawDocument, unique: &[&str]) -> StoreResult<()>;

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Value>>;

    /// First document whose top-level `field` equals `value`.
    async fn find_one(&self, collection: &str, field: &str, value: &Value)
    -> StoreResult<Option<Value>>;

    /// Overwrite an existing document. Returns `false` when the key is absent.
    async fn replace(&self, collection: &str, doc: RawDocument, unique: &[&str])
    -> StoreResult<bool>;

    /// Delete by key, returning the removed body.
    async fn remove(&self, collection: &str, key: &str) -> StoreResult<Option<Value>>;

    /// Newest first; `limit = None` returns everything after `skip`.
    async fn list(&self, collection: &str, skip: usize, limit: Option<usize>)
    -> StoreResult<Vec<Value>>;

    async fn count(&self, collection: &str) -> StoreResult<u64>;

    /// Remove every document in the collection, returning how many were removed.
    async fn clear(&self, collection: &str) -> StoreResult<u64>;
}
