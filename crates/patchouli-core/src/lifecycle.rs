//! The moderation lifecycle engine.
//!
//! Owns the status transition rules and authorization checks for posts.
//! Every operation validates caller authority against current state before
//! touching the store, and the store's conditional updates guarantee that
//! racing terminal transitions admit exactly one winner.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PostDraft, PostPatch, PostStatus, User};
use crate::error::EngineError;
use crate::ports::{ClueGenerator, PostFilter, PostStore, QueryTranslator};
use crate::search::SearchQuery;

/// Which slice of the post store a feed query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Published posts only; no authentication required.
    Public,
    /// Pending posts awaiting review; admins only.
    ReviewQueue,
    /// The caller's own posts, regardless of status.
    Own,
}

/// How a search phrase is turned into a store query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// The raw phrase, tokenized into a plain AND query.
    Keyword,
    /// The phrase is translated by the model first; falls back to
    /// `Keyword` behavior whenever the translator fails.
    Ai,
}

/// Non-fatal degradation of an advisory AI step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiNotice {
    /// The clue generator was unavailable; the post went through with
    /// `search_clues` unset/unchanged.
    CluesUnavailable,
}

/// A successful write outcome plus any advisory degradation.
#[derive(Debug, Clone)]
pub struct PostReceipt {
    pub post: Post,
    pub ai_notice: Option<AiNotice>,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Allowed tag vocabulary (lowercase).
    pub allowed_tags: Vec<String>,
    pub max_title_chars: usize,
    /// Post-body prefix handed to the clue generator.
    pub clue_input_chars: usize,
    /// Cap on the stored clue string.
    pub clue_output_chars: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            allowed_tags: [
                "script",
                "block",
                "entity",
                "item",
                "command",
                "addon",
                "world",
                "ui",
                "resource-pack",
                "behavior-pack",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_title_chars: 200,
            clue_input_chars: 4_000,
            clue_output_chars: 120,
        }
    }
}

/// The lifecycle engine. Holds no mutable state of its own; all
/// cross-request consistency lives in the store's conditional updates.
pub struct Lifecycle {
    store: Arc<dyn PostStore>,
    translator: Arc<dyn QueryTranslator>,
    clue_gen: Arc<dyn ClueGenerator>,
    config: LifecycleConfig,
}

impl Lifecycle {
    pub fn new(
        store: Arc<dyn PostStore>,
        translator: Arc<dyn QueryTranslator>,
        clue_gen: Arc<dyn ClueGenerator>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            translator,
            clue_gen,
            config,
        }
    }

    /// Submit a new post. Always lands in `Pending`, never auto-published,
    /// whatever the caller's role. Clue generation is best-effort: a dead
    /// generator yields a receipt with [`AiNotice::CluesUnavailable`].
    pub async fn submit_post(
        &self,
        caller: Uuid,
        mut draft: PostDraft,
    ) -> Result<PostReceipt, EngineError> {
        let user = self.require_user(caller).await?;
        Self::require_not_banned(&user)?;

        self.validate_title(&draft.title)?;
        Self::validate_body(&draft.body)?;
        draft.tags = self.normalize_tags(draft.tags)?;
        Self::validate_attachments(&draft.attachments)?;

        let (clues, notice) = self.generate_clues(&draft.body).await;
        let post = self
            .store
            .insert_post(Post::new(user.id, draft, clues))
            .await?;

        tracing::info!(post_id = %post.id, author_id = %post.author_id, "post submitted");
        Ok(PostReceipt {
            post,
            ai_notice: notice,
        })
    }

    /// Overwrite post fields without touching status. Allowed for the author
    /// while the post is not Published, and for admins in any state. A body
    /// edit refreshes the search clues best-effort.
    pub async fn edit_post(
        &self,
        caller: Uuid,
        id: Uuid,
        mut patch: PostPatch,
    ) -> Result<PostReceipt, EngineError> {
        let user = self.require_user(caller).await?;
        Self::require_not_banned(&user)?;

        let post = self
            .store
            .get_post(id)
            .await?
            .ok_or(EngineError::InvalidTransition)?;

        if !user.is_admin() {
            if post.author_id != user.id {
                return Err(EngineError::Forbidden);
            }
            if post.status == PostStatus::Published {
                return Err(EngineError::Forbidden);
            }
        }

        if patch.is_empty() {
            return Err(EngineError::Validation("nothing to update".into()));
        }
        if let Some(title) = &patch.title {
            self.validate_title(title)?;
        }
        if let Some(body) = &patch.body {
            Self::validate_body(body)?;
        }
        if let Some(tags) = patch.tags.take() {
            patch.tags = Some(self.normalize_tags(tags)?);
        }
        if let Some(attachments) = &patch.attachments {
            Self::validate_attachments(attachments)?;
        }

        let mut notice = None;
        if let Some(body) = &patch.body {
            let (clues, body_notice) = self.generate_clues(body).await;
            patch.search_clues = clues;
            notice = body_notice;
        }

        // Conditional on the status we authorized against, so an edit that
        // races a moderation decision loses cleanly.
        let updated = self.store.update_post(id, patch, post.status).await?;
        Ok(PostReceipt {
            post: updated,
            ai_notice: notice,
        })
    }

    /// Remove a post. Author or admin, from any state. No tombstone.
    pub async fn delete_post(&self, caller: Uuid, id: Uuid) -> Result<(), EngineError> {
        let user = self.require_user(caller).await?;
        Self::require_not_banned(&user)?;

        let post = self
            .store
            .get_post(id)
            .await?
            .ok_or(EngineError::InvalidTransition)?;
        if !user.is_admin() && post.author_id != user.id {
            return Err(EngineError::Forbidden);
        }

        self.store.delete_post(id).await?;
        tracing::info!(post_id = %id, "post deleted");
        Ok(())
    }

    /// Read a single post, applying the visibility rules: Published is open
    /// to everyone, Pending/Rejected only to the author and admins. A post
    /// the caller may not see is indistinguishable from a missing one.
    pub async fn get_post(&self, caller: Option<Uuid>, id: Uuid) -> Result<Post, EngineError> {
        let post = self
            .store
            .get_post(id)
            .await?
            .ok_or(EngineError::InvalidTransition)?;

        let viewer = match caller {
            Some(caller) => Some(self.require_user(caller).await?),
            None => None,
        };
        if !post.is_visible_to(viewer.as_ref()) {
            return Err(EngineError::InvalidTransition);
        }
        Ok(post)
    }

    /// Admin approval: Pending -> Published, atomically. A post already
    /// decided by another admin fails with `InvalidTransition`.
    pub async fn approve_post(&self, caller: Uuid, id: Uuid) -> Result<Post, EngineError> {
        self.decide(caller, id, PostStatus::Published).await
    }

    /// Admin rejection: Pending -> Rejected, atomically.
    pub async fn reject_post(&self, caller: Uuid, id: Uuid) -> Result<Post, EngineError> {
        self.decide(caller, id, PostStatus::Rejected).await
    }

    async fn decide(
        &self,
        caller: Uuid,
        id: Uuid,
        verdict: PostStatus,
    ) -> Result<Post, EngineError> {
        let user = self.require_user(caller).await?;
        Self::require_not_banned(&user)?;
        if !user.is_admin() {
            return Err(EngineError::Forbidden);
        }

        let post = self
            .store
            .set_status(id, verdict, PostStatus::Pending)
            .await?;
        tracing::info!(post_id = %id, status = post.status.as_str(), "moderation decision");
        Ok(post)
    }

    /// Set or clear a user's ban. Admin only; admins cannot be targeted.
    /// Idempotent: re-applying the current value is a no-op success.
    pub async fn set_user_ban(
        &self,
        caller: Uuid,
        target: Uuid,
        banned: bool,
    ) -> Result<User, EngineError> {
        let user = self.require_user(caller).await?;
        Self::require_not_banned(&user)?;
        if !user.is_admin() {
            return Err(EngineError::Forbidden);
        }

        let target_user = self
            .store
            .get_user(target)
            .await?
            .ok_or_else(|| EngineError::Validation("unknown target user".into()))?;
        if target_user.is_admin() {
            return Err(EngineError::Forbidden);
        }
        if target_user.is_banned == banned {
            return Ok(target_user);
        }

        let updated = self.store.set_user_banned(target, banned).await?;
        tracing::info!(user_id = %target, banned, "ban flag changed");
        Ok(updated)
    }

    /// List a feed slice. Bans never affect read access.
    pub async fn list_feed(
        &self,
        caller: Option<Uuid>,
        scope: FeedScope,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, EngineError> {
        let filter = match scope {
            FeedScope::Public => PostFilter {
                status: Some(PostStatus::Published),
                limit,
                offset,
                ..PostFilter::default()
            },
            FeedScope::ReviewQueue => {
                let user = self
                    .require_user(caller.ok_or(EngineError::Unauthenticated)?)
                    .await?;
                if !user.is_admin() {
                    return Err(EngineError::Forbidden);
                }
                PostFilter {
                    status: Some(PostStatus::Pending),
                    limit,
                    offset,
                    ..PostFilter::default()
                }
            }
            FeedScope::Own => {
                let user = self
                    .require_user(caller.ok_or(EngineError::Unauthenticated)?)
                    .await?;
                PostFilter {
                    author_id: Some(user.id),
                    limit,
                    offset,
                    ..PostFilter::default()
                }
            }
        };

        Ok(self.store.list_posts(filter).await?)
    }

    /// Search published posts. In `Ai` mode the phrase is translated into
    /// the full-text grammar first; any translator failure (error, empty or
    /// multi-line output) degrades to the raw phrase as a plain AND query.
    /// Search never fails because the translator is down.
    pub async fn search(&self, phrase: &str, mode: SearchMode) -> Result<Vec<Post>, EngineError> {
        let query = match mode {
            SearchMode::Keyword => SearchQuery::from_phrase(phrase),
            SearchMode::Ai => match self.translator.translate(phrase).await {
                Ok(translated) => match SearchQuery::parse(&translated) {
                    Some(query) => Some(query),
                    None => {
                        tracing::warn!("translator returned unusable query, falling back");
                        SearchQuery::from_phrase(phrase)
                    }
                },
                Err(err) => {
                    tracing::warn!(error = %err, "query translator unavailable, falling back");
                    SearchQuery::from_phrase(phrase)
                }
            },
        };

        let query =
            query.ok_or_else(|| EngineError::Validation("search phrase is empty".into()))?;
        Ok(self
            .store
            .search_posts(&query, PostStatus::Published)
            .await?)
    }

    async fn require_user(&self, caller: Uuid) -> Result<User, EngineError> {
        self.store
            .get_user(caller)
            .await?
            .ok_or(EngineError::Unauthenticated)
    }

    fn require_not_banned(user: &User) -> Result<(), EngineError> {
        if user.is_banned {
            return Err(EngineError::Banned);
        }
        Ok(())
    }

    fn validate_title(&self, title: &str) -> Result<(), EngineError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::Validation("title must not be empty".into()));
        }
        if title.chars().count() > self.config.max_title_chars {
            return Err(EngineError::Validation(format!(
                "title exceeds {} characters",
                self.config.max_title_chars
            )));
        }
        Ok(())
    }

    fn validate_body(body: &str) -> Result<(), EngineError> {
        if body.trim().is_empty() {
            return Err(EngineError::Validation("body must not be empty".into()));
        }
        Ok(())
    }

    /// Lowercase, dedupe, and check every tag against the vocabulary.
    fn normalize_tags(&self, tags: Vec<String>) -> Result<Vec<String>, EngineError> {
        let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim().to_lowercase();
            if !self.config.allowed_tags.contains(&tag) {
                return Err(EngineError::Validation(format!(
                    "tag '{tag}' is not in the allowed vocabulary"
                )));
            }
            if !normalized.contains(&tag) {
                normalized.push(tag);
            }
        }
        Ok(normalized)
    }

    fn validate_attachments(
        attachments: &[crate::domain::Attachment],
    ) -> Result<(), EngineError> {
        for attachment in attachments {
            if attachment.name.trim().is_empty() {
                return Err(EngineError::Validation(
                    "attachment name must not be empty".into(),
                ));
            }
            if attachment.url.trim().is_empty() {
                return Err(EngineError::Validation(
                    "attachment url must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// Best-effort clue generation over a bounded body prefix. Failures are
    /// reported as a notice, never as an operation error.
    async fn generate_clues(&self, body: &str) -> (Option<String>, Option<AiNotice>) {
        let prefix: String = body.chars().take(self.config.clue_input_chars).collect();
        match self.clue_gen.generate(&prefix).await {
            Ok(raw) => match self.bound_clues(&raw) {
                Some(clues) => (Some(clues), None),
                None => (None, Some(AiNotice::CluesUnavailable)),
            },
            Err(err) => {
                tracing::warn!(error = %err, "clue generator unavailable");
                (None, Some(AiNotice::CluesUnavailable))
            }
        }
    }

    /// Reduce generator output to one bounded plain-text line.
    fn bound_clues(&self, raw: &str) -> Option<String> {
        let line = raw.lines().next()?.trim();
        if line.is_empty() {
            return None;
        }
        Some(line.chars().take(self.config.clue_output_chars).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::domain::Role;
    use crate::error::StoreError;
    use crate::ports::AiError;

    /// In-process store double with the same conditional-update semantics
    /// the real adapters provide.
    #[derive(Default)]
    struct MemStore {
        posts: Mutex<HashMap<Uuid, Post>>,
        users: Mutex<HashMap<Uuid, User>>,
    }

    impl MemStore {
        fn add_user(&self, role: Role, banned: bool) -> Uuid {
            let id = Uuid::new_v4();
            self.users.lock().unwrap().insert(
                id,
                User {
                    id,
                    name: format!("user-{id}"),
                    avatar_url: None,
                    role,
                    is_banned: banned,
                    created_at: Utc::now(),
                },
            );
            id
        }

        fn post_count(&self) -> usize {
            self.posts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PostStore for MemStore {
        async fn insert_post(&self, post: Post) -> Result<Post, StoreError> {
            self.posts.lock().unwrap().insert(post.id, post.clone());
            Ok(post)
        }

        async fn get_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
            Ok(self.posts.lock().unwrap().get(&id).cloned())
        }

        async fn update_post(
            &self,
            id: Uuid,
            patch: PostPatch,
            expected: PostStatus,
        ) -> Result<Post, StoreError> {
            let mut posts = self.posts.lock().unwrap();
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
            let mut posts = self.posts.lock().unwrap();
            let post = posts.get_mut(&id).ok_or(StoreError::NotFound)?;
            if post.status != expected {
                return Err(StoreError::StatusConflict);
            }
            post.status = new_status;
            post.updated_at = Utc::now();
            Ok(post.clone())
        }

        async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
            self.posts
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or(StoreError::NotFound)
        }

        async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>, StoreError> {
            let posts = self.posts.lock().unwrap();
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
            let posts = self.posts.lock().unwrap();
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
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn set_user_banned(&self, id: Uuid, banned: bool) -> Result<User, StoreError> {
            let mut users = self.users.lock().unwrap();
            let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
            user.is_banned = banned;
            Ok(user.clone())
        }
    }

    struct StaticTranslator(&'static str);

    #[async_trait]
    impl QueryTranslator for StaticTranslator {
        async fn translate(&self, _phrase: &str) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    struct StaticClues(&'static str);

    #[async_trait]
    impl ClueGenerator for StaticClues {
        async fn generate(&self, _body: &str) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    /// Simulates both collaborators being down.
    struct DownAi;

    #[async_trait]
    impl QueryTranslator for DownAi {
        async fn translate(&self, _phrase: &str) -> Result<String, AiError> {
            Err(AiError::Unavailable("connection refused".into()))
        }
    }

    #[async_trait]
    impl ClueGenerator for DownAi {
        async fn generate(&self, _body: &str) -> Result<String, AiError> {
            Err(AiError::Timeout)
        }
    }

    fn engine(store: Arc<MemStore>) -> Lifecycle {
        Lifecycle::new(
            store,
            Arc::new(StaticTranslator("backup OR snapshot script")),
            Arc::new(StaticClues("backup, snapshot, world save automation")),
            LifecycleConfig::default(),
        )
    }

    fn engine_with_dead_ai(store: Arc<MemStore>) -> Lifecycle {
        Lifecycle::new(
            store,
            Arc::new(DownAi),
            Arc::new(DownAi),
            LifecycleConfig::default(),
        )
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            body: "A script that saves the world folder on a timer.".to_string(),
            tags: vec!["script".to_string()],
            attachments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn submit_always_yields_pending() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let author = store.add_user(Role::User, false);
        let admin = store.add_user(Role::Admin, false);

        let receipt = engine.submit_post(author, draft("Auto Backup")).await.unwrap();
        assert_eq!(receipt.post.status, PostStatus::Pending);

        // Admins get no auto-publish either.
        let receipt = engine.submit_post(admin, draft("Admin Post")).await.unwrap();
        assert_eq!(receipt.post.status, PostStatus::Pending);
    }

    #[tokio::test]
    async fn submit_attaches_generated_clues() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let author = store.add_user(Role::User, false);

        let receipt = engine.submit_post(author, draft("Auto Backup")).await.unwrap();
        assert_eq!(
            receipt.post.search_clues.as_deref(),
            Some("backup, snapshot, world save automation")
        );
        assert!(receipt.ai_notice.is_none());
    }

    #[tokio::test]
    async fn submit_survives_dead_clue_generator() {
        let store = Arc::new(MemStore::default());
        let engine = engine_with_dead_ai(store.clone());
        let author = store.add_user(Role::User, false);

        let receipt = engine.submit_post(author, draft("Auto Backup")).await.unwrap();
        assert_eq!(receipt.post.status, PostStatus::Pending);
        assert!(receipt.post.search_clues.is_none());
        assert_eq!(receipt.ai_notice, Some(AiNotice::CluesUnavailable));
        assert_eq!(store.post_count(), 1);
    }

    #[tokio::test]
    async fn submit_by_unknown_caller_is_unauthenticated() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());

        let err = engine
            .submit_post(Uuid::new_v4(), draft("Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unauthenticated));
        assert_eq!(store.post_count(), 0);
    }

    #[tokio::test]
    async fn banned_user_cannot_write_but_can_read() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let banned = store.add_user(Role::User, true);
        let author = store.add_user(Role::User, false);

        let post = engine
            .submit_post(author, draft("Visible"))
            .await
            .unwrap()
            .post;

        let err = engine.submit_post(banned, draft("Nope")).await.unwrap_err();
        assert!(matches!(err, EngineError::Banned));
        assert_eq!(store.post_count(), 1);

        let err = engine
            .edit_post(
                banned,
                post.id,
                PostPatch {
                    title: Some("Hijack".into()),
                    ..PostPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Banned));

        let err = engine.delete_post(banned, post.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Banned));

        // Reads still work for banned users.
        let feed = engine
            .list_feed(Some(banned), FeedScope::Own, 50, 0)
            .await
            .unwrap();
        assert!(feed.is_empty());
        let public = engine.list_feed(None, FeedScope::Public, 50, 0).await.unwrap();
        assert!(public.is_empty());
    }

    #[tokio::test]
    async fn approve_then_reject_loses_the_race() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let author = store.add_user(Role::User, false);
        let admin_a = store.add_user(Role::Admin, false);
        let admin_b = store.add_user(Role::Admin, false);

        let post = engine
            .submit_post(author, draft("Auto Backup Script"))
            .await
            .unwrap()
            .post;

        let approved = engine.approve_post(admin_a, post.id).await.unwrap();
        assert_eq!(approved.status, PostStatus::Published);

        // Second decision on an already-decided post.
        let err = engine.reject_post(admin_b, post.id).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition));

        // The first decision stands.
        let stored = store.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PostStatus::Published);
    }

    #[tokio::test]
    async fn moderation_requires_admin() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let author = store.add_user(Role::User, false);

        let post = engine
            .submit_post(author, draft("Mine"))
            .await
            .unwrap()
            .post;

        let err = engine.approve_post(author, post.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));
        let err = engine.reject_post(author, post.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));
    }

    #[tokio::test]
    async fn edit_rights_follow_status_and_role() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let author = store.add_user(Role::User, false);
        let stranger = store.add_user(Role::User, false);
        let admin = store.add_user(Role::Admin, false);

        let post = engine
            .submit_post(author, draft("Editable"))
            .await
            .unwrap()
            .post;
        let retitle = |title: &str| PostPatch {
            title: Some(title.to_string()),
            ..PostPatch::default()
        };

        // Author may edit while pending.
        let edited = engine
            .edit_post(author, post.id, retitle("Editable v2"))
            .await
            .unwrap();
        assert_eq!(edited.post.title, "Editable v2");
        assert_eq!(edited.post.status, PostStatus::Pending);

        // Strangers never may.
        let err = engine
            .edit_post(stranger, post.id, retitle("Hijack"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));

        engine.approve_post(admin, post.id).await.unwrap();

        // Once published, the author loses edit rights; admins keep them.
        let err = engine
            .edit_post(author, post.id, retitle("Too late"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));

        let edited = engine
            .edit_post(admin, post.id, retitle("Cleaned up"))
            .await
            .unwrap();
        assert_eq!(edited.post.title, "Cleaned up");
        assert_eq!(edited.post.status, PostStatus::Published);
    }

    #[tokio::test]
    async fn body_edit_refreshes_clues_best_effort() {
        let store = Arc::new(MemStore::default());
        let engine = engine_with_dead_ai(store.clone());
        let author = store.add_user(Role::User, false);

        let post = engine
            .submit_post(author, draft("Clueless"))
            .await
            .unwrap()
            .post;
        let receipt = engine
            .edit_post(
                author,
                post.id,
                PostPatch {
                    body: Some("New body about command blocks.".into()),
                    ..PostPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(receipt.post.body, "New body about command blocks.");
        assert!(receipt.post.search_clues.is_none());
        assert_eq!(receipt.ai_notice, Some(AiNotice::CluesUnavailable));
    }

    #[tokio::test]
    async fn delete_is_author_or_admin() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let author = store.add_user(Role::User, false);
        let stranger = store.add_user(Role::User, false);
        let admin = store.add_user(Role::Admin, false);

        let first = engine.submit_post(author, draft("One")).await.unwrap().post;
        let second = engine.submit_post(author, draft("Two")).await.unwrap().post;

        let err = engine.delete_post(stranger, first.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));

        engine.delete_post(author, first.id).await.unwrap();
        engine.delete_post(admin, second.id).await.unwrap();
        assert_eq!(store.post_count(), 0);
    }

    #[tokio::test]
    async fn validation_rejects_bad_drafts() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let author = store.add_user(Role::User, false);

        let err = engine.submit_post(author, draft("   ")).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let mut bad_tag = draft("Tagged");
        bad_tag.tags = vec!["not-a-real-tag".into()];
        let err = engine.submit_post(author, bad_tag).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        assert_eq!(store.post_count(), 0);
    }

    #[tokio::test]
    async fn ban_toggle_is_admin_only_and_idempotent() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let admin = store.add_user(Role::Admin, false);
        let other_admin = store.add_user(Role::Admin, false);
        let target = store.add_user(Role::User, false);

        let err = engine.set_user_ban(target, admin, true).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));

        // Admins cannot be targeted.
        let err = engine
            .set_user_ban(admin, other_admin, true)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));

        let banned = engine.set_user_ban(admin, target, true).await.unwrap();
        assert!(banned.is_banned);

        // Re-banning is a no-op success.
        let banned_again = engine.set_user_ban(admin, target, true).await.unwrap();
        assert!(banned_again.is_banned);

        let unbanned = engine.set_user_ban(admin, target, false).await.unwrap();
        assert!(!unbanned.is_banned);
    }

    #[tokio::test]
    async fn feed_scopes_filter_by_status_and_caller() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let author = store.add_user(Role::User, false);
        let stranger = store.add_user(Role::User, false);
        let admin = store.add_user(Role::Admin, false);

        let pending = engine
            .submit_post(author, draft("Pending One"))
            .await
            .unwrap()
            .post;
        let published = engine
            .submit_post(author, draft("Published One"))
            .await
            .unwrap()
            .post;
        engine.approve_post(admin, published.id).await.unwrap();

        let public = engine.list_feed(None, FeedScope::Public, 50, 0).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, published.id);

        let queue = engine
            .list_feed(Some(admin), FeedScope::ReviewQueue, 50, 0)
            .await
            .unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, pending.id);

        let err = engine
            .list_feed(Some(stranger), FeedScope::ReviewQueue, 50, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));

        let own = engine
            .list_feed(Some(author), FeedScope::Own, 50, 0)
            .await
            .unwrap();
        assert_eq!(own.len(), 2);

        let err = engine.list_feed(None, FeedScope::Own, 50, 0).await.unwrap_err();
        assert!(matches!(err, EngineError::Unauthenticated));
    }

    #[tokio::test]
    async fn hidden_posts_read_like_missing_ones() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store.clone());
        let author = store.add_user(Role::User, false);
        let stranger = store.add_user(Role::User, false);
        let admin = store.add_user(Role::Admin, false);

        let post = engine
            .submit_post(author, draft("Secret"))
            .await
            .unwrap()
            .post;

        assert!(engine.get_post(Some(author), post.id).await.is_ok());
        assert!(engine.get_post(Some(admin), post.id).await.is_ok());

        let err = engine.get_post(Some(stranger), post.id).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition));
        let err = engine.get_post(None, post.id).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition));

        engine.approve_post(admin, post.id).await.unwrap();
        assert!(engine.get_post(None, post.id).await.is_ok());
    }

    #[tokio::test]
    async fn ai_search_falls_back_to_keyword_results() {
        let store = Arc::new(MemStore::default());
        let author = store.add_user(Role::User, false);
        let admin = store.add_user(Role::Admin, false);

        let dead = engine_with_dead_ai(store.clone());
        let mut backup = draft("Auto Backup Script");
        backup.body = "Saves the world folder to zip archives.".into();
        let post = dead.submit_post(author, backup).await.unwrap().post;
        dead.approve_post(admin, post.id).await.unwrap();

        let keyword = dead
            .search("backup script", SearchMode::Keyword)
            .await
            .unwrap();
        let ai = dead.search("backup script", SearchMode::Ai).await.unwrap();

        let ids = |posts: &[Post]| posts.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids(&keyword), ids(&ai));
        assert_eq!(keyword.len(), 1);
    }

    #[tokio::test]
    async fn ai_search_uses_translated_grammar_when_available() {
        let store = Arc::new(MemStore::default());
        let author = store.add_user(Role::User, false);
        let admin = store.add_user(Role::Admin, false);

        // Translator rewrites any phrase to "backup OR snapshot script".
        let engine = engine(store.clone());
        let mut snapshot = draft("World Snapshot Helper");
        snapshot.body = "script that rolls snapshot archives".into();
        let post = engine.submit_post(author, snapshot).await.unwrap().post;
        engine.approve_post(admin, post.id).await.unwrap();

        // The raw phrase matches nothing, the translated disjunction does.
        let results = engine.search("save my world", SearchMode::Ai).await.unwrap();
        assert_eq!(results.len(), 1);
        let keyword = engine
            .search("save my world", SearchMode::Keyword)
            .await
            .unwrap();
        assert!(keyword.is_empty());
    }

    #[tokio::test]
    async fn empty_search_phrase_is_a_validation_error() {
        let store = Arc::new(MemStore::default());
        let engine = engine(store);

        let err = engine.search("   ", SearchMode::Keyword).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
