//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use patchouli_infra::ai::LlmConfig;
use patchouli_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub llm: Option<LlmConfig>,
    pub allowed_tags: Option<Vec<String>>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        // Both URL and key must be present for the AI collaborators.
        let llm = match (env::var("LLM_API_URL"), env::var("LLM_API_KEY")) {
            (Ok(api_url), Ok(api_key)) => Some(LlmConfig {
                api_url,
                api_key,
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                timeout: Duration::from_secs(
                    env::var("LLM_TIMEOUT_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(10),
                ),
            }),
            _ => None,
        };

        let allowed_tags = env::var("ALLOWED_TAGS").ok().map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            llm,
            allowed_tags,
        }
    }
}
