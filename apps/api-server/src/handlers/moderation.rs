//! Moderation handlers: the review queue, approve/reject decisions, bans.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use patchouli_core::lifecycle::FeedScope;
use patchouli_shared::ApiResponse;
use patchouli_shared::dto::UserResponse;

use super::PageQuery;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/moderation/queue - pending posts awaiting review. Admin only.
pub async fn queue(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .engine
        .list_feed(
            Some(identity.user_id),
            FeedScope::ReviewQueue,
            query.limit(),
            query.offset(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// POST /api/posts/{id}/approve
///
/// Pending -> Published. A post already decided by another admin comes
/// back as a conflict.
pub async fn approve(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .engine
        .approve_post(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts/{id}/reject
pub async fn reject(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .engine
        .reject_post(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/users/{id}/ban
pub async fn ban(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state
        .engine
        .set_user_ban(identity.user_id, path.into_inner(), true)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserResponse::from(user))))
}

/// DELETE /api/users/{id}/ban
pub async fn unban(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state
        .engine
        .set_user_ban(identity.user_id, path.into_inner(), false)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserResponse::from(user))))
}
