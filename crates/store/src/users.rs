use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use inkpress_auth::{User, user::normalize_email};
use inkpress_core::UserId;

use crate::{Collection, DocumentStore, StoreResult};

/// User accounts, keyed by id and unique by (lower-case) email.
#[derive(Clone)]
pub struct Users {
    docs: Collection<User>,
}

impl Users {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.docs
            .find_by("email", &Value::String(normalize_email(email)))
            .await
    }

    pub async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.docs.get(&id).await
    }

    /// Fails with `StoreError::Duplicate` when the email is already registered.
    pub async fn create(&self, user: &User) -> StoreResult<()> {
        self.docs.insert(user).await?;
        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(())
    }

    /// `false` when the user no longer exists.
    pub async fn update(&self, user: &User) -> StoreResult<bool> {
        let updated = self.docs.replace(user).await?;
        if updated {
            info!(user_id = %user.id, email = %user.email, "user updated");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: UserId) -> StoreResult<Option<User>> {
        let removed = self.docs.remove(&id).await?;
        if let Some(user) = &removed {
            info!(user_id = %user.id, email = %user.email, "user deleted");
        }
        Ok(removed)
    }

    /// One page of users, newest first, with the collection total.
    ///
    /// `page` is 1-based; `page = 0` is treated as 1.
    pub async fn list(&self, page: u32, limit: u32) -> StoreResult<(Vec<User>, u64)> {
        let skip = (page.max(1) as usize - 1) * limit as usize;
        let users = self.docs.list(skip, Some(limit as usize)).await?;
        let total = self.docs.count().await?;
        Ok((users, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryStore, StoreError};
    use chrono::{DateTime, Duration, Utc};
    use inkpress_auth::{Role, UserPatch};

    fn users() -> Users {
        Users::new(InMemoryStore::arc())
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn user(email: &str, secs: i64) -> User {
        User::new(email, "hash".to_string(), "Name", Role::User, at(secs))
    }

    #[tokio::test]
    async fn lookup_by_email_is_case_insensitive() {
        let repo = users();
        let u = user("Jane@Example.com", 0);
        repo.create(&u).await.unwrap();

        let found = repo.find_by_email("  JANE@example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, u.id);
        assert!(repo.find_by_email("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = users();
        repo.create(&user("a@x.io", 0)).await.unwrap();
        let err = repo.create(&user("A@X.IO", 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_to_taken_email_is_rejected() {
        let repo = users();
        repo.create(&user("a@x.io", 0)).await.unwrap();
        let mut b = user("b@x.io", 1);
        repo.create(&b).await.unwrap();

        b.apply(
            UserPatch {
                email: Some("a@x.io".into()),
                ..UserPatch::default()
            },
            at(2),
        );
        assert!(matches!(repo.update(&b).await, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_users() {
        let repo = users();
        let u = user("a@x.io", 0);
        assert!(!repo.update(&u).await.unwrap());
        assert!(repo.delete(u.id).await.unwrap().is_none());

        repo.create(&u).await.unwrap();
        assert!(repo.update(&u).await.unwrap());
        assert_eq!(repo.delete(u.id).await.unwrap().map(|d| d.id), Some(u.id));
        assert!(repo.find_by_id(u.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_pages_newest_first() {
        let repo = users();
        for i in 0..5 {
            repo.create(&user(&format!("u{i}@x.io"), i)).await.unwrap();
        }

        let (page1, total) = repo.list(1, 2).await.unwrap();
        assert_eq!(total, 5);
        let emails: Vec<_> = page1.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["u4@x.io", "u3@x.io"]);

        let (page3, _) = repo.list(3, 2).await.unwrap();
        assert_eq!(page3.len(), 1);
        assert_eq!(page3[0].email, "u0@x.io");
    }
}
