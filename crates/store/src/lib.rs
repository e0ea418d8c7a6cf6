//! `inkpress-store`: document persistence for users and posts.
//!
//! Records are stored as JSON documents in named collections behind the
//! [`DocumentStore`] trait. The in-memory backend is always available; the
//! PostgreSQL JSONB backend is enabled with the `postgres` feature.

pub mod backend;
pub mod collection;
pub mod database;
pub mod document;
pub mod error;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod posts;
pub mod seed;
pub mod users;

pub use backend::DocumentStore;
pub use collection::Collection;
pub use database::Database;
pub use document::{Document, RawDocument};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use posts::Posts;
pub use seed::{sample_posts, seed_posts};
pub use users::Users;
