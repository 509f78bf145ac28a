//! HTTP handlers and route configuration.

mod feed;
mod health;
mod moderation;
mod posts;
mod search;

use actix_web::web;
use serde::Deserialize;

/// Common pagination query, clamped to sane bounds.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PageQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/feed", web::get().to(feed::public_feed))
            .route("/feed/mine", web::get().to(feed::my_posts))
            .route("/search", web::get().to(search::search))
            // Post lifecycle
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::submit))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::edit))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/approve", web::post().to(moderation::approve))
                    .route("/{id}/reject", web::post().to(moderation::reject)),
            )
            // Moderation
            .route("/moderation/queue", web::get().to(moderation::queue))
            .service(
                web::scope("/users")
                    .route("/{id}/ban", web::post().to(moderation::ban))
                    .route("/{id}/ban", web::delete().to(moderation::unban)),
            ),
    );
}
