use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use inkpress_auth::{Role, User, UserPatch};
use inkpress_core::UserId;
use inkpress_posts::PostDraft;

// -------------------------
// Request mapping
// -------------------------

/// Text form of a validated scalar field (strings as-is, numbers and booleans
/// rendered). Missing or structured values become empty.
pub fn text(body: &Value, field: &str) -> String {
    match body.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn optional_text(body: &Value, field: &str) -> Option<String> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(_) => Some(text(body, field)),
    }
}

/// Boolean in any form the validator accepts: `true`, `"true"`, `"1"`, `0`, ...
pub fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

impl RegisterRequest {
    /// Read a validated and sanitized registration body.
    pub fn from_body(body: &Value) -> Self {
        Self {
            email: text(body, "email"),
            password: text(body, "password"),
            name: text(body, "name"),
            role: body
                .get("role")
                .and_then(Value::as_str)
                .and_then(|r| r.parse().ok())
                .unwrap_or_default(),
        }
    }
}

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_body(body: &Value) -> Self {
        Self {
            email: text(body, "email"),
            password: text(body, "password"),
        }
    }
}

pub fn user_patch(body: &Value) -> UserPatch {
    UserPatch {
        name: optional_text(body, "name"),
        email: optional_text(body, "email"),
        is_active: body.get("isActive").and_then(flag),
    }
}

pub fn post_draft(body: &Value) -> PostDraft {
    PostDraft::new(
        text(body, "title"),
        text(body, "content"),
        text(body, "author"),
    )
}

// -------------------------
// Response DTOs
// -------------------------

/// Public view of a user; the password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserView {
    /// Identity fields only (register/login responses).
    pub fn summary(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            is_active: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn profile(user: &User) -> Self {
        Self {
            created_at: Some(user.created_at),
            ..Self::summary(user)
        }
    }

    pub fn updated(user: &User) -> Self {
        Self {
            is_active: Some(user.is_active),
            updated_at: Some(user.updated_at),
            ..Self::summary(user)
        }
    }

    pub fn full(user: &User) -> Self {
        Self {
            is_active: Some(user.is_active),
            created_at: Some(user.created_at),
            updated_at: Some(user.updated_at),
            ..Self::summary(user)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}
