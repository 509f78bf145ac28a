//! Identity-provider token verification.

mod jwt;

pub use jwt::{AuthError, JwtConfig, JwtVerifier};
