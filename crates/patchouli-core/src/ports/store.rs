use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostPatch, PostStatus, User};
use crate::error::StoreError;
use crate::search::SearchQuery;

/// Read-time filter for post listings. Results are newest first.
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
    pub limit: u64,
    pub offset: u64,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            status: None,
            author_id: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Post store port - the single source of truth for posts and users.
///
/// The store must apply a status transition and its associated field writes
/// together or not at all for a single row. `update_post` and `set_status`
/// are conditional on the currently stored status so that two racing
/// terminal transitions admit exactly one winner.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a new post row. The engine always passes status `Pending`.
    async fn insert_post(&self, post: Post) -> Result<Post, StoreError>;

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Conditionally overwrite fields; status is untouched. Fails with
    /// `StatusConflict` if the stored status no longer matches `expected`.
    async fn update_post(
        &self,
        id: Uuid,
        patch: PostPatch,
        expected: PostStatus,
    ) -> Result<Post, StoreError>;

    /// Atomic compare-and-swap on status.
    async fn set_status(
        &self,
        id: Uuid,
        new_status: PostStatus,
        expected: PostStatus,
    ) -> Result<Post, StoreError>;

    /// Remove the row. No tombstone is kept.
    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError>;

    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>, StoreError>;

    /// Full-text match over title, body and search clues, restricted to one
    /// status (the engine passes `Published` for public search).
    async fn search_posts(
        &self,
        query: &SearchQuery,
        status: PostStatus,
    ) -> Result<Vec<Post>, StoreError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn set_user_banned(&self, id: Uuid, banned: bool) -> Result<User, StoreError>;
}
