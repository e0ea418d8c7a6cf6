use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::document::decode;
use crate::{Document, DocumentStore, RawDocument, StoreResult};

/// Typed view over one collection of a [`DocumentStore`].
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _doc: PhantomData,
        }
    }
}

impl<T: Document> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _doc: PhantomData,
        }
    }

    pub async fn insert(&self, doc: &T) -> StoreResult<()> {
        let raw = RawDocument::encode(doc)?;
        self.store.insert(T::COLLECTION, raw, T::UNIQUE_FIELDS).await
    }

    pub async fn get(&self, id: &T::Id) -> StoreResult<Option<T>> {
        self.store
            .get(T::COLLECTION, &id.to_string())
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn find_by(&self, field: &str, value: &Value) -> StoreResult<Option<T>> {
        self.store
            .find_one(T::COLLECTION, field, value)
            .await?
            .map(decode)
            .transpose()
    }

    /// Overwrite the stored copy. `false` when the document does not exist.
    pub async fn replace(&self, doc: &T) -> StoreResult<bool> {
        let raw = RawDocument::encode(doc)?;
        self.store.replace(T::COLLECTION, raw, T::UNIQUE_FIELDS).await
    }

    pub async fn remove(&self, id: &T::Id) -> StoreResult<Option<T>> {
        self.store
            .remove(T::COLLECTION, &id.to_string())
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn list(&self, skip: usize, limit: Option<usize>) -> StoreResult<Vec<T>> {
        self.store
            .list(T::COLLECTION, skip, limit)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn count(&self) -> StoreResult<u64> {
        self.store.count(T::COLLECTION).await
    }

    pub async fn clear(&self) -> StoreResult<u64> {
        self.store.clear(T::COLLECTION).await
    }
}
