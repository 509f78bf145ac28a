//! Post lifecycle handlers: submit, read, edit, delete.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use patchouli_core::domain::{PostDraft, PostPatch};
use patchouli_core::lifecycle::{AiNotice, PostReceipt};
use patchouli_shared::ApiResponse;
use patchouli_shared::dto::{EditPostRequest, PostWriteResponse, SubmitPostRequest};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppResult, read_error};
use crate::state::AppState;

fn write_response(receipt: PostReceipt) -> PostWriteResponse {
    let ai_notice = receipt.ai_notice.map(|notice| match notice {
        AiNotice::CluesUnavailable => "clues_unavailable".to_string(),
    });
    PostWriteResponse {
        post: receipt.post,
        ai_notice,
    }
}

/// POST /api/posts
///
/// Submit a new post for review. Always lands in the pending queue.
pub async fn submit(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<SubmitPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = PostDraft {
        title: req.title,
        body: req.body,
        tags: req.tags,
        attachments: req.attachments.into_iter().map(Into::into).collect(),
    };

    let receipt = state.engine.submit_post(identity.user_id, draft).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(write_response(receipt))))
}

/// GET /api/posts/{id}
///
/// Pending/rejected posts are only readable by their author and admins;
/// to anyone else they look like a 404.
pub async fn get(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let caller = identity.0.map(|i| i.user_id);
    let post = state
        .engine
        .get_post(caller, path.into_inner())
        .await
        .map_err(read_error)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// PUT /api/posts/{id}
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<EditPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title,
        body: req.body,
        tags: req.tags,
        attachments: req
            .attachments
            .map(|list| list.into_iter().map(Into::into).collect()),
        search_clues: None,
    };

    let receipt = state
        .engine
        .edit_post(identity.user_id, path.into_inner(), patch)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(write_response(receipt))))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .engine
        .delete_post(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
