//! User record for identity management.
//!
//! Persistence is outside this crate; the store serialises `User` as a document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inkpress_core::{Entity, UserId};

use crate::{ClaimsInput, Role};

/// A registered account.
///
/// # Invariants
/// - `email` is trimmed and lower-case (the lookup key for login).
/// - `password_hash` is a bcrypt hash, never the plain password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied by administrators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

impl User {
    pub fn new(
        email: &str,
        password_hash: String,
        name: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: normalize_email(email),
            password_hash,
            name: name.trim().to_string(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: UserPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = normalize_email(&email);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    /// Identity fields carried by tokens issued for this user.
    pub fn claims_input(&self) -> ClaimsInput {
        ClaimsInput {
            subject_id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            "  Jane@Example.COM ",
            "hash".to_string(),
            " Jane ",
            Role::User,
            Utc::now(),
        )
    }

    #[test]
    fn new_user_is_active_with_normalized_fields() {
        let u = user();
        assert_eq!(u.email, "jane@example.com");
        assert_eq!(u.name, "Jane");
        assert!(u.is_active);
        assert_eq!(u.created_at, u.updated_at);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut u = user();
        let later = u.updated_at + chrono::Duration::seconds(5);
        u.apply(
            UserPatch {
                is_active: Some(false),
                ..UserPatch::default()
            },
            later,
        );

        assert!(!u.is_active);
        assert_eq!(u.name, "Jane");
        assert_eq!(u.updated_at, later);
    }

    #[test]
    fn stored_document_uses_camel_case() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("passwordHash").is_some());
        assert_eq!(json["isActive"], true);
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn claims_input_mirrors_identity() {
        let u = user();
        let input = u.claims_input();
        assert_eq!(input.subject_id, u.id);
        assert_eq!(input.email, u.email);
        assert_eq!(input.role, Role::User);
    }
}
