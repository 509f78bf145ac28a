//! Application state - shared across all handlers.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use patchouli_core::domain::{Role, User};
use patchouli_core::lifecycle::{Lifecycle, LifecycleConfig};
use patchouli_core::ports::{AiError, ClueGenerator, PostStore, QueryTranslator};
use patchouli_infra::auth::{JwtConfig, JwtVerifier};
use patchouli_infra::database::PostgresPostStore;
use patchouli_infra::{InMemoryPostStore, LlmClient};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Lifecycle>,
    pub verifier: Arc<JwtVerifier>,
}

/// Stand-in for the AI collaborators when no LLM endpoint is configured.
/// Every call reports unavailability, which the engine degrades from:
/// search falls back to raw keywords, posts go through without clues.
struct AiDisabled;

#[async_trait]
impl QueryTranslator for AiDisabled {
    async fn translate(&self, _phrase: &str) -> Result<String, AiError> {
        Err(AiError::Unavailable("LLM endpoint not configured".into()))
    }
}

#[async_trait]
impl ClueGenerator for AiDisabled {
    async fn generate(&self, _body: &str) -> Result<String, AiError> {
        Err(AiError::Unavailable("LLM endpoint not configured".into()))
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let store: Arc<dyn PostStore> = match &config.database {
            Some(db_config) => match patchouli_infra::database::connect(db_config).await {
                Ok(conn) => Arc::new(PostgresPostStore::new(conn)),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Arc::new(in_memory_store().await)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Arc::new(in_memory_store().await)
            }
        };

        let (translator, clue_gen): (Arc<dyn QueryTranslator>, Arc<dyn ClueGenerator>) =
            match &config.llm {
                Some(llm_config) => match LlmClient::new(llm_config.clone()) {
                    Ok(client) => {
                        let client = Arc::new(client);
                        (client.clone(), client)
                    }
                    Err(e) => {
                        tracing::error!("Failed to build LLM client: {}. AI features disabled.", e);
                        (Arc::new(AiDisabled), Arc::new(AiDisabled))
                    }
                },
                None => {
                    tracing::warn!("LLM_API_URL/LLM_API_KEY not set. AI features disabled.");
                    (Arc::new(AiDisabled), Arc::new(AiDisabled))
                }
            };

        let mut lifecycle_config = LifecycleConfig::default();
        if let Some(tags) = &config.allowed_tags {
            lifecycle_config.allowed_tags = tags.clone();
        }

        let engine = Arc::new(Lifecycle::new(
            store,
            translator,
            clue_gen,
            lifecycle_config,
        ));
        let verifier = Arc::new(JwtVerifier::new(JwtConfig::from_env()));

        tracing::info!("Application state initialized");

        Self { engine, verifier }
    }
}

/// In-memory store for database-less runs. Seeds a dev admin when
/// `DEV_ADMIN_ID` is set, since account creation normally happens in the
/// identity provider.
async fn in_memory_store() -> InMemoryPostStore {
    let store = InMemoryPostStore::new();

    if let Some(admin_id) = std::env::var("DEV_ADMIN_ID")
        .ok()
        .and_then(|raw| Uuid::parse_str(&raw).ok())
    {
        store
            .upsert_user(User {
                id: admin_id,
                name: "dev-admin".to_string(),
                avatar_url: None,
                role: Role::Admin,
                is_banned: false,
                created_at: chrono::Utc::now(),
            })
            .await;
        tracing::info!(%admin_id, "Seeded dev admin user");
    }

    store
}
