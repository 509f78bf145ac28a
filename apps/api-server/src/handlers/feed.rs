//! Feed handlers: the public feed and the caller's own posts.

use actix_web::{HttpResponse, web};

use patchouli_core::lifecycle::FeedScope;
use patchouli_shared::ApiResponse;

use super::PageQuery;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/feed - published posts, newest first. No authentication.
pub async fn public_feed(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .engine
        .list_feed(None, FeedScope::Public, query.limit(), query.offset())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/feed/mine - the caller's posts in every status.
pub async fn my_posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .engine
        .list_feed(
            Some(identity.user_id),
            FeedScope::Own,
            query.limit(),
            query.offset(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}
