use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::{DocumentStore, InMemoryStore, Posts, StoreError, StoreResult, Users};

/// Shared, lazily-connected storage handle.
///
/// Clones share one connection. [`Database::acquire`] connects on first use;
/// concurrent and repeated calls resolve to the same store.
#[derive(Clone)]
pub struct Database {
    url: Arc<str>,
    store: Arc<OnceCell<Arc<dyn DocumentStore>>>,
}

impl core::fmt::Debug for Database {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Database")
            .field("backend", &scheme(&self.url))
            .field("connected", &self.store.initialized())
            .finish()
    }
}

impl Database {
    /// A handle that will connect to `url` on first use.
    ///
    /// Supported schemes: `memory://`, and `postgres://` / `postgresql://`
    /// when built with the `postgres` feature.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Arc::from(url.into()),
            store: Arc::new(OnceCell::new()),
        }
    }

    /// A handle over an already-built store.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            url: Arc::from("custom://"),
            store: Arc::new(OnceCell::new_with(Some(store))),
        }
    }

    pub fn in_memory() -> Self {
        Self::with_store(InMemoryStore::arc())
    }

    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    /// Connect if needed and return the shared store.
    ///
    /// A failed attempt leaves the handle unconnected so a later call retries.
    pub async fn acquire(&self) -> StoreResult<Arc<dyn DocumentStore>> {
        let store = self
            .store
            .get_or_try_init(|| connect(&self.url))
            .await?;
        Ok(store.clone())
    }

    pub async fn users(&self) -> StoreResult<Users> {
        Ok(Users::new(self.acquire().await?))
    }

    pub async fn posts(&self) -> StoreResult<Posts> {
        Ok(Posts::new(self.acquire().await?))
    }
}

fn scheme(url: &str) -> &str {
    url.split_once("://").map_or(url, |(s, _)| s)
}

async fn connect(url: &str) -> StoreResult<Arc<dyn DocumentStore>> {
    match scheme(url) {
        "memory" => {
            info!(backend = "memory", "database connected");
            Ok(InMemoryStore::arc())
        }
        #[cfg(feature = "postgres")]
        "postgres" | "postgresql" => {
            let store = crate::PostgresStore::connect(url).await?;
            info!(backend = "postgres", "database connected");
            Ok(Arc::new(store))
        }
        other => Err(StoreError::UnsupportedBackend(other.to_string())),
    }
}
