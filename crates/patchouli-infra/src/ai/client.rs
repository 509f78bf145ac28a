//! LLM client implementing the query-translator and clue-generator ports
//! over an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use patchouli_core::ports::{AiError, ClueGenerator, QueryTranslator};

const TRANSLATE_SYSTEM_PROMPT: &str = "You convert a user's natural-language search request \
into a single-line full-text query. Output space-separated keywords; use the literal token \
OR between two keywords to allow either. No quotes, no other operators, no explanations.";

const CLUE_SYSTEM_PROMPT: &str = "You summarize a Minecraft Bedrock knowledge-base post into \
a short comma-separated list of search keywords, synonyms and use-cases. Plain text only, \
at most 100 characters, no markup.";

/// Configuration for the LLM endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Chat-completions client. One instance serves both collaborator ports;
/// the request timeout bounds every call.
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Unavailable(e.to_string()))?;
        Ok(Self { http, config })
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.config.api_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(AiError::Unavailable(format!(
                "LLM endpoint returned {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Unavailable(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AiError::EmptyOutput);
        }
        Ok(content)
    }
}

#[async_trait]
impl QueryTranslator for LlmClient {
    async fn translate(&self, phrase: &str) -> Result<String, AiError> {
        let translated = self.chat(TRANSLATE_SYSTEM_PROMPT, phrase).await?;
        tracing::debug!(%phrase, %translated, "query translated");
        Ok(translated)
    }
}

#[async_trait]
impl ClueGenerator for LlmClient {
    async fn generate(&self, body: &str) -> Result<String, AiError> {
        self.chat(CLUE_SYSTEM_PROMPT, body).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}
