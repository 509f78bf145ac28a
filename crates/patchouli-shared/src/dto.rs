//! Data Transfer Objects - request/response types for the API.

use patchouli_core::domain::{Attachment, AttachmentKind, Post, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attachment content as supplied by the client; the server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentInput {
    pub name: String,
    pub kind: AttachmentKind,
    pub url: String,
}

impl From<AttachmentInput> for Attachment {
    fn from(input: AttachmentInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            kind: input.kind,
            url: input.url,
        }
    }
}

/// Request to submit a new post for review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPostRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentInput>,
}

/// Request to edit an existing post. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditPostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub attachments: Option<Vec<AttachmentInput>>,
}

/// A post write outcome. `ai_notice` carries a non-fatal degradation of the
/// clue-generation step ("clues_unavailable"), never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWriteResponse {
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_notice: Option<String>,
}

/// Public projection of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub is_banned: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
            role: user.role.as_str().to_string(),
            is_banned: user.is_banned,
        }
    }
}
