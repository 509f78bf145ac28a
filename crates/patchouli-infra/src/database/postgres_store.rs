//! PostgreSQL post store implementation.
//!
//! Status transitions are plain conditional UPDATEs filtered on the current
//! status; `rows_affected == 0` is then disambiguated into "row gone" vs
//! "status moved", so racing decisions on the same post admit one winner.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use patchouli_core::domain::{Post, PostPatch, PostStatus, User};
use patchouli_core::error::StoreError;
use patchouli_core::ports::{PostFilter, PostStore};
use patchouli_core::search::SearchQuery;

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

/// PostgreSQL-backed post store.
pub struct PostgresPostStore {
    db: DbConn,
}

impl PostgresPostStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let row = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    /// Turn a lost conditional update into the right error kind.
    async fn conflict_kind(&self, id: Uuid) -> Result<StoreError, StoreError> {
        match self.fetch_post(id).await? {
            Some(_) => Ok(StoreError::StatusConflict),
            None => Ok(StoreError::NotFound),
        }
    }
}

fn store_err(err: DbErr) -> StoreError {
    let msg = err.to_string();
    if msg.contains("timed out") || msg.contains("timeout") {
        StoreError::Timeout
    } else {
        StoreError::Unavailable(msg)
    }
}

/// Escape LIKE wildcards in a search term.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `lower(column) LIKE '%term%'` over one text surface.
fn surface_like(column: post::Column, term: &str) -> sea_orm::sea_query::SimpleExpr {
    let pattern = format!("%{}%", escape_like(term));
    Expr::expr(Func::lower(Expr::col((PostEntity, column)))).like(pattern)
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn insert_post(&self, post: Post) -> Result<Post, StoreError> {
        let model = post::ActiveModel::from(post)
            .insert(&self.db)
            .await
            .map_err(store_err)?;
        Ok(model.into())
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        self.fetch_post(id).await
    }

    async fn update_post(
        &self,
        id: Uuid,
        patch: PostPatch,
        expected: PostStatus,
    ) -> Result<Post, StoreError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let mut update = PostEntity::update_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.eq(expected.as_str()))
            .col_expr(post::Column::UpdatedAt, Expr::value(now));
        if let Some(title) = patch.title {
            update = update.col_expr(post::Column::Title, Expr::value(title));
        }
        if let Some(body) = patch.body {
            update = update.col_expr(post::Column::Body, Expr::value(body));
        }
        if let Some(tags) = patch.tags {
            update = update.col_expr(post::Column::Tags, Expr::value(serde_json::json!(tags)));
        }
        if let Some(attachments) = patch.attachments {
            update = update.col_expr(
                post::Column::Attachments,
                Expr::value(serde_json::json!(attachments)),
            );
        }
        if let Some(clues) = patch.search_clues {
            update = update.col_expr(post::Column::SearchClues, Expr::value(clues));
        }

        let result = update.exec(&self.db).await.map_err(store_err)?;
        if result.rows_affected == 0 {
            return Err(self.conflict_kind(id).await?);
        }

        self.fetch_post(id).await?.ok_or(StoreError::NotFound)
    }

    async fn set_status(
        &self,
        id: Uuid,
        new_status: PostStatus,
        expected: PostStatus,
    ) -> Result<Post, StoreError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let result = PostEntity::update_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.eq(expected.as_str()))
            .col_expr(post::Column::Status, Expr::value(new_status.as_str()))
            .col_expr(post::Column::UpdatedAt, Expr::value(now))
            .exec(&self.db)
            .await
            .map_err(store_err)?;

        if result.rows_affected == 0 {
            return Err(self.conflict_kind(id).await?);
        }

        self.fetch_post(id).await?.ok_or(StoreError::NotFound)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(store_err)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>, StoreError> {
        let mut select = PostEntity::find();
        if let Some(status) = filter.status {
            select = select.filter(post::Column::Status.eq(status.as_str()));
        }
        if let Some(author_id) = filter.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }

        let rows = select
            .order_by_desc(post::Column::CreatedAt)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search_posts(
        &self,
        query: &SearchQuery,
        status: PostStatus,
    ) -> Result<Vec<Post>, StoreError> {
        let mut condition = Condition::all().add(post::Column::Status.eq(status.as_str()));
        for group in query.groups() {
            let mut any = Condition::any();
            for term in group {
                any = any
                    .add(surface_like(post::Column::Title, term))
                    .add(surface_like(post::Column::Body, term))
                    .add(surface_like(post::Column::SearchClues, term));
            }
            condition = condition.add(any);
        }

        let rows = PostEntity::find()
            .filter(condition)
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn set_user_banned(&self, id: Uuid, banned: bool) -> Result<User, StoreError> {
        let result = UserEntity::update_many()
            .filter(user::Column::Id.eq(id))
            .col_expr(user::Column::IsBanned, Expr::value(banned))
            .exec(&self.db)
            .await
            .map_err(store_err)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        let row = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_err)?;
        row.map(Into::into).ok_or(StoreError::NotFound)
    }
}
