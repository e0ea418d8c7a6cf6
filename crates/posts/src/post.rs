use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inkpress_core::{DomainError, DomainResult, Entity, PostId};

pub const TITLE_MAX: usize = 200;
pub const CONTENT_MAX: usize = 10_000;
pub const AUTHOR_MAX: usize = 100;

/// A published blog post.
///
/// # Invariants
/// - `title`, `content` and `author` are trimmed, non-empty and within their
///   maximum lengths (counted in characters).
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied post fields, used for both create and full replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub author: String,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: author.into(),
        }
    }

    /// Trim every field and check the post invariants.
    pub fn validate(self) -> DomainResult<Self> {
        Ok(Self {
            title: field(&self.title, "Title", "Title", TITLE_MAX)?,
            content: field(&self.content, "Content", "Content", CONTENT_MAX)?,
            author: field(&self.author, "Author", "Author name", AUTHOR_MAX)?,
        })
    }
}

fn field(raw: &str, name: &str, label: &str, max: usize) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{name} is required")));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{label} cannot be more than {max} characters"
        )));
    }
    Ok(value.to_string())
}

impl Post {
    pub fn create(draft: PostDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        let draft = draft.validate()?;
        Ok(Self {
            id: PostId::new(),
            title: draft.title,
            content: draft.content,
            author: draft.author,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the editable fields; the id and creation time are kept.
    pub fn revise(&mut self, draft: PostDraft, now: DateTime<Utc>) -> DomainResult<()> {
        let draft = draft.validate()?;
        self.title = draft.title;
        self.content = draft.content;
        self.author = draft.author;
        self.updated_at = now.max(self.created_at);
        Ok(())
    }
}

impl Entity for Post {
    type Id = PostId;

    fn id(&self) -> &PostId {
        &self.id
    }
}
