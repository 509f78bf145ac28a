//! Search handler.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use patchouli_core::lifecycle::SearchMode;
use patchouli_shared::ApiResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub mode: Option<String>,
}

/// GET /api/search?q=...&mode=keyword|ai
///
/// Searches published posts. `ai` mode runs the phrase through the query
/// translator and silently degrades to keyword behavior when the
/// translator is unavailable.
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let mode = match params.mode.as_deref() {
        None | Some("keyword") => SearchMode::Keyword,
        Some("ai") => SearchMode::Ai,
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "unknown search mode '{other}', expected 'keyword' or 'ai'"
            )));
        }
    };

    let posts = state.engine.search(&params.q, mode).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}
