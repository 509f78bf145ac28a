use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;

/// Moderation status of a stored post.
///
/// A post being composed client-side ("draft") has no stored representation;
/// the first persisted state is always `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Published,
    Rejected,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Pending => "pending",
            PostStatus::Published => "published",
            PostStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PostStatus::Pending),
            "published" => Some(PostStatus::Published),
            "rejected" => Some(PostStatus::Rejected),
            _ => None,
        }
    }
}

/// Kind of attachment carried by a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Link,
    File,
}

/// An attachment on a post. The `url` is opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    pub kind: AttachmentKind,
    pub url: String,
}

/// Post entity - a knowledge-base entry subject to moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,
    /// Advisory keywords from the clue generator; auxiliary search surface only.
    pub search_clues: Option<String>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post from a draft. The first stored status is `Pending`.
    pub fn new(author_id: Uuid, draft: PostDraft, search_clues: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: draft.title,
            body: draft.body,
            tags: draft.tags,
            attachments: draft.attachments,
            search_clues,
            status: PostStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `viewer` may read this post.
    ///
    /// Published posts are visible to everyone, including anonymous and
    /// banned callers. Pending/Rejected posts are visible only to their
    /// author and to admins.
    pub fn is_visible_to(&self, viewer: Option<&User>) -> bool {
        if self.status == PostStatus::Published {
            return true;
        }
        match viewer {
            Some(user) => user.is_admin() || user.id == self.author_id,
            None => false,
        }
    }
}

/// Author-supplied content for a new post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Partial update applied to a post. `None` fields are left unchanged;
/// status is never touched by a patch.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
    pub search_clues: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.tags.is_none()
            && self.attachments.is_none()
            && self.search_clues.is_none()
    }

    /// Apply this patch to a post in place, refreshing `updated_at`.
    pub fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(body) = self.body {
            post.body = body;
        }
        if let Some(tags) = self.tags {
            post.tags = tags;
        }
        if let Some(attachments) = self.attachments {
            post.attachments = attachments;
        }
        if let Some(clues) = self.search_clues {
            post.search_clues = Some(clues);
        }
        post.updated_at = Utc::now();
    }
}
