//! # Patchouli Core
//!
//! The domain layer of the Patchouli knowledge base.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the post/user entities, the moderation lifecycle engine, the search-query
//! grammar, and the ports that storage and AI adapters implement.

pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod ports;
pub mod search;

pub use error::EngineError;
pub use lifecycle::Lifecycle;
