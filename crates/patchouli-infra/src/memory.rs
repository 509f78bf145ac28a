//! In-memory post store - used as fallback when Postgres is not configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use patchouli_core::domain::{Post, PostPatch, PostStatus, User};
use patchouli_core::error::StoreError;
use patchouli_core::ports::{PostFilter, PostStore};
use patchouli_core::search::SearchQuery;

/// In-memory post store using HashMaps behind an async RwLock.
///
/// Conditional updates run under the write lock, which gives the same
/// at-most-one-winner guarantee for racing status transitions as the
/// Postgres adapter's conditional UPDATE. Data is lost on process restart.
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a user record. Account creation belongs to the
    /// external identity provider; this exists for dev mode and tests.
    pub async fn upsert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert_post(&self, post: Post) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn update_post(
        &self,
        id: Uuid,
        patch: PostPatch,
        expected: PostStatus,
    ) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&id).ok_or(StoreError::NotFound)?;
        if post.status != expected {
            return Err(StoreError::StatusConflict);
        }
        patch.apply(post);
        Ok(post.clone())
    }

    async fn set_status(
        &self,
        id: Uuid,
        new_status: PostStatus,
        expected: PostStatus,
    ) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&id).ok_or(StoreError::NotFound)?;
        if post.status != expected {
            return Err(StoreError::StatusConflict);
        }
        post.status = new_status;
        post.updated_at = chrono::Utc::now();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().await;
        let mut matched: Vec<Post> = posts
            .values()
            .filter(|p| filter.status.is_none_or(|s| p.status == s))
            .filter(|p| filter.author_id.is_none_or(|a| p.author_id == a))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn search_posts(
        &self,
        query: &SearchQuery,
        status: PostStatus,
    ) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().await;
        let mut matched: Vec<Post> = posts
            .values()
            .filter(|p| p.status == status)
            .filter(|p| {
                query.matches(&[
                    p.title.as_str(),
                    p.body.as_str(),
                    p.search_clues.as_deref().unwrap_or(""),
                ])
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn set_user_banned(&self, id: Uuid, banned: bool) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.is_banned = banned;
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use patchouli_core::domain::PostDraft;

    use super::*;

    fn pending_post(author_id: Uuid) -> Post {
        Post::new(
            author_id,
            PostDraft {
                title: "Scoreboard Timer".to_string(),
                body: "Counts down with a scoreboard objective.".to_string(),
                tags: vec!["command".to_string()],
                attachments: Vec::new(),
            },
            None,
        )
    }

    #[tokio::test]
    async fn set_status_is_conditional() {
        let store = InMemoryPostStore::new();
        let post = store
            .insert_post(pending_post(Uuid::new_v4()))
            .await
            .unwrap();

        let published = store
            .set_status(post.id, PostStatus::Published, PostStatus::Pending)
            .await
            .unwrap();
        assert_eq!(published.status, PostStatus::Published);

        let err = store
            .set_status(post.id, PostStatus::Rejected, PostStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StatusConflict));
    }

    #[tokio::test]
    async fn racing_decisions_admit_exactly_one_winner() {
        let store = Arc::new(InMemoryPostStore::new());
        let post = store
            .insert_post(pending_post(Uuid::new_v4()))
            .await
            .unwrap();

        let approve = {
            let store = store.clone();
            let id = post.id;
            tokio::spawn(async move {
                store
                    .set_status(id, PostStatus::Published, PostStatus::Pending)
                    .await
            })
        };
        let reject = {
            let store = store.clone();
            let id = post.id;
            tokio::spawn(async move {
                store
                    .set_status(id, PostStatus::Rejected, PostStatus::Pending)
                    .await
            })
        };

        let (approve, reject) = (approve.await.unwrap(), reject.await.unwrap());
        assert_eq!(
            approve.is_ok() as u8 + reject.is_ok() as u8,
            1,
            "exactly one racing decision must win"
        );
        let loser = if approve.is_ok() { reject } else { approve };
        assert!(matches!(loser.unwrap_err(), StoreError::StatusConflict));
    }

    #[tokio::test]
    async fn update_post_respects_expected_status() {
        let store = InMemoryPostStore::new();
        let post = store
            .insert_post(pending_post(Uuid::new_v4()))
            .await
            .unwrap();
        store
            .set_status(post.id, PostStatus::Published, PostStatus::Pending)
            .await
            .unwrap();

        let patch = PostPatch {
            title: Some("Stale edit".to_string()),
            ..PostPatch::default()
        };
        let err = store
            .update_post(post.id, patch, PostStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StatusConflict));
    }

    #[tokio::test]
    async fn list_filters_and_paginates_newest_first() {
        let store = InMemoryPostStore::new();
        let author = Uuid::new_v4();
        for _ in 0..3 {
            store.insert_post(pending_post(author)).await.unwrap();
        }
        store
            .insert_post(pending_post(Uuid::new_v4()))
            .await
            .unwrap();

        let mine = store
            .list_posts(PostFilter {
                author_id: Some(author),
                ..PostFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 3);
        assert!(mine.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let page = store
            .list_posts(PostFilter {
                author_id: Some(author),
                limit: 2,
                offset: 2,
                ..PostFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn search_covers_clues_surface() {
        let store = InMemoryPostStore::new();
        let mut post = pending_post(Uuid::new_v4());
        post.status = PostStatus::Published;
        post.search_clues = Some("countdown, kitchen timer, stopwatch".to_string());
        store.insert_post(post).await.unwrap();

        let query = SearchQuery::parse("stopwatch").unwrap();
        let hits = store
            .search_posts(&query, PostStatus::Published)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        // Pending posts are invisible to a published-only search.
        let hits = store
            .search_posts(&query, PostStatus::Pending)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn ban_flag_roundtrip() {
        let store = InMemoryPostStore::new();
        let user = User {
            id: Uuid::new_v4(),
            name: "steve".to_string(),
            avatar_url: None,
            role: patchouli_core::domain::Role::User,
            is_banned: false,
            created_at: Utc::now(),
        };
        store.upsert_user(user.clone()).await;

        let banned = store.set_user_banned(user.id, true).await.unwrap();
        assert!(banned.is_banned);
        let fetched = store.get_user(user.id).await.unwrap().unwrap();
        assert!(fetched.is_banned);
    }
}
