//! Ports for the model-backed collaborators.
//!
//! Both collaborators are advisory: the lifecycle engine degrades gracefully
//! when they fail and never lets them block a user-facing operation.

use async_trait::async_trait;

/// Failures from the AI collaborators.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("AI call timed out")]
    Timeout,

    #[error("AI returned empty or unusable output")]
    EmptyOutput,
}

/// Maps a free-text search phrase to a single-line query string in the
/// store's full-text grammar (space = AND, literal `OR` = disjunction).
///
/// Stateless and idempotent in intent; the literal output may vary between
/// calls since it is model-backed.
#[async_trait]
pub trait QueryTranslator: Send + Sync {
    async fn translate(&self, phrase: &str) -> Result<String, AiError>;
}

/// Produces a short plain-text string of keywords/synonyms/use-cases for a
/// post body. The result is stored as `search_clues` and is advisory only.
#[async_trait]
pub trait ClueGenerator: Send + Sync {
    async fn generate(&self, body: &str) -> Result<String, AiError>;
}
