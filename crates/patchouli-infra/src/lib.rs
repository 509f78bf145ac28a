//! # Patchouli Infrastructure
//!
//! Concrete implementations of the ports defined in `patchouli-core`.
//! This crate contains the database-backed and in-memory post stores, the
//! LLM collaborator client, and identity-provider token verification.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `postgres` - PostgreSQL post store via SeaORM
//! - `auth` - JWT verification for identity-provider tokens
//! - `ai` - HTTP client for the query translator and clue generator

pub mod memory;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "ai")]
pub mod ai;

// Re-exports - In-Memory
pub use memory::InMemoryPostStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresPostStore, connect};

#[cfg(feature = "auth")]
pub use auth::{AuthError, JwtConfig, JwtVerifier};

#[cfg(feature = "ai")]
pub use ai::{LlmClient, LlmConfig};
