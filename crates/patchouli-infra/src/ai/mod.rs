//! HTTP adapters for the model-backed collaborators.

mod client;

pub use client::{LlmClient, LlmConfig};
