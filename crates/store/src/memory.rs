use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::{DocumentStore, RawDocument, StoreError, StoreResult};

type CollectionMap = HashMap<String, RawDocument>;

/// In-memory document store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<HashMap<String, CollectionMap>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn ensure_unique(docs: &CollectionMap, doc: &RawDocument, unique: &[&str]) -> StoreResult<()> {
    for field in unique {
        let Some(value) = doc.field(field) else {
            continue;
        };
        let taken = docs
            .values()
            .any(|other| other.key != doc.key && other.field(field) == Some(value));
        if taken {
            return Err(StoreError::Duplicate((*field).to_string()));
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, collection: &str, doc: RawDocument, unique: &[&str]) -> StoreResult<()> {
        let mut map = self.inner.write();
        let docs = map.entry(collection.to_string()).or_default();
        if docs.contains_key(&doc.key) {
            return Err(StoreError::Duplicate("id".to_string()));
        }
        ensure_unique(docs, &doc, unique)?;
        docs.insert(doc.key.clone(), doc);
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Value>> {
        let map = self.inner.read();
        Ok(map
            .get(collection)
            .and_then(|docs| docs.get(key))
            .map(|d| d.body.clone()))
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Option<Value>> {
        let map = self.inner.read();
        Ok(map.get(collection).and_then(|docs| {
            docs.values()
                .find(|d| d.field(field) == Some(value))
                .map(|d| d.body.clone())
        }))
    }

    async fn replace(
        &self,
        collection: &str,
        doc: RawDocument,
        unique: &[&str],
    ) -> StoreResult<bool> {
        let mut map = self.inner.write();
        let Some(docs) = map.get_mut(collection) else {
            return Ok(false);
        };
        if !docs.contains_key(&doc.key) {
            return Ok(false);
        }
        ensure_unique(docs, &doc, unique)?;
        docs.insert(doc.key.clone(), doc);
        Ok(true)
    }

    async fn remove(&self, collection: &str, key: &str) -> StoreResult<Option<Value>> {
        let mut map = self.inner.write();
        Ok(map
            .get_mut(collection)
            .and_then(|docs| docs.remove(key))
            .map(|d| d.body))
    }

    async fn list(
        &self,
        collection: &str,
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>> {
        let map = self.inner.read();
        let Some(docs) = map.get(collection) else {
            return Ok(vec![]);
        };

        let mut sorted: Vec<_> = docs.values().collect();
        // Newest first; keys are time-ordered ids and break ties.
        sorted.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.key.cmp(&a.key))
        });

        Ok(sorted
            .into_iter()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX))
            .map(|d| d.body.clone())
            .collect())
    }

    async fn count(&self, collection: &str) -> StoreResult<u64> {
        let map = self.inner.read();
        Ok(map.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn clear(&self, collection: &str) -> StoreResult<u64> {
        let mut map = self.inner.write();
        Ok(map
            .remove(collection)
            .map_or(0, |docs| docs.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::json;

    fn raw(key: &str, secs: i64, email: &str) -> RawDocument {
        RawDocument {
            key: key.to_string(),
            created_at: DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap(),
            body: json!({ "id": key, "email": email }),
        }
    }

    #[tokio::test]
    async fn insert_then_get_and_find() {
        let store = InMemoryStore::new();
        store.insert("users", raw("a", 0, "a@x.io"), &["email"]).await.unwrap();

        assert!(store.get("users", "a").await.unwrap().is_some());
        assert!(store.get("users", "b").await.unwrap().is_none());
        assert!(store.get("posts", "a").await.unwrap().is_none());

        let found = store
            .find_one("users", "email", &json!("a@x.io"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["id"], "a");
    }

    #[tokio::test]
    async fn unique_field_is_enforced_on_insert_and_replace() {
        let store = InMemoryStore::new();
        store.insert("users", raw("a", 0, "a@x.io"), &["email"]).await.unwrap();
        store.insert("users", raw("b", 1, "b@x.io"), &["email"]).await.unwrap();

        let err = store
            .insert("users", raw("c", 2, "a@x.io"), &["email"])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(f) if f == "email"));

        let err = store
            .replace("users", raw("b", 1, "a@x.io"), &["email"])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        // Re-saving a document with its own value is not a collision.
        assert!(store.replace("users", raw("a", 0, "a@x.io"), &["email"]).await.unwrap());
    }

    #[tokio::test]
    async fn replace_missing_returns_false() {
        let store = InMemoryStore::new();
        assert!(!store.replace("users", raw("a", 0, "a@x.io"), &[]).await.unwrap());
    }

    #[tokio::test]
    async fn list_is_newest_first_with_paging() {
        let store = InMemoryStore::new();
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            store.insert("posts", raw(key, i as i64, key), &[]).await.unwrap();
        }

        let keys = |docs: Vec<Value>| -> Vec<String> {
            docs.iter().map(|d| d["id"].as_str().unwrap().to_string()).collect()
        };

        assert_eq!(keys(store.list("posts", 0, None).await.unwrap()), ["d", "c", "b", "a"]);
        assert_eq!(keys(store.list("posts", 1, Some(2)).await.unwrap()), ["c", "b"]);
        assert!(store.list("posts", 10, Some(2)).await.unwrap().is_empty());
        assert_eq!(store.count("posts").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let store = InMemoryStore::new();
        store.insert("posts", raw("a", 0, "a"), &[]).await.unwrap();
        store.insert("posts", raw("b", 1, "b"), &[]).await.unwrap();

        assert!(store.remove("posts", "a").await.unwrap().is_some());
        assert!(store.remove("posts", "a").await.unwrap().is_none());
        assert_eq!(store.clear("posts").await.unwrap(), 1);
        assert_eq!(store.count("posts").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_inserts_of_same_email_admit_one() {
        let store = InMemoryStore::arc();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let doc = RawDocument {
                    key: format!("k{i}"),
                    created_at: Utc::now() + Duration::milliseconds(i),
                    body: json!({ "email": "same@x.io" }),
                };
                store.insert("users", doc, &["email"]).await.is_ok()
            }));
        }

        let mut ok = 0;
        for h in handles {
            if h.await.unwrap() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.count("users").await.unwrap(), 1);
    }
}
