//! Shared handler dependencies.

use std::sync::Arc;

use anyhow::Context;

use inkpress_auth::{PasswordHasher, TokenService};
use inkpress_store::Database;

use crate::config::{AppConfig, Environment};

/// Everything handlers need, shared behind an `Arc` via `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub db: Database,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
    pub environment: Environment,
}

impl AppServices {
    pub fn new(config: &AppConfig, db: Database) -> anyhow::Result<Self> {
        let tokens = TokenService::new(&config.jwt_secret, config.jwt_ttl)
            .context("invalid token configuration")?;
        let hasher = PasswordHasher::new(config.bcrypt_cost).context("invalid BCRYPT_COST")?;
        Ok(Self {
            db,
            tokens: Arc::new(tokens),
            hasher,
            environment: config.environment,
        })
    }

    /// bcrypt on the blocking pool.
    pub async fn hash_password(&self, plain: String) -> anyhow::Result<String> {
        let hasher = self.hasher;
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .context("password hashing task failed")??;
        Ok(hash)
    }

    /// bcrypt verification on the blocking pool.
    pub async fn verify_password(&self, plain: String, hash: String) -> anyhow::Result<bool> {
        let hasher = self.hasher;
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .context("password verification task failed")??;
        Ok(ok)
    }
}
