use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use inkpress_auth::User;
use inkpress_core::Entity;
use inkpress_posts::Post;

use crate::StoreResult;

/// A record that can live in a document collection.
pub trait Document: Entity + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name.
    const COLLECTION: &'static str;

    /// Top-level fields whose values must be unique across the collection.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    /// Ordering key for newest-first listings.
    fn created_at(&self) -> DateTime<Utc>;

    fn key(&self) -> String {
        self.id().to_string()
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Document for Post {
    const COLLECTION: &'static str = "posts";

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Untyped form handed to backends.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub body: Value,
}

impl RawDocument {
    pub fn encode<T: Document>(doc: &T) -> StoreResult<Self> {
        Ok(Self {
            key: doc.key(),
            created_at: doc.created_at(),
            body: serde_json::to_value(doc)?,
        })
    }

    /// The body's value for a top-level field, if present and non-null.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name).filter(|v| !v.is_null())
    }
}

pub(crate) fn decode<T: Document>(body: Value) -> StoreResult<T> {
    Ok(serde_json::from_value(body)?)
}
