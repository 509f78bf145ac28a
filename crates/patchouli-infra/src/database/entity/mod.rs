//! SeaORM entities for the post store tables.

pub mod post;
pub mod user;
