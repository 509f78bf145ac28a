//! JWT verification for identity-provider sessions.
//!
//! Accounts and tokens are issued by the external identity provider; this
//! service only verifies the HS256 signature with the shared secret and
//! extracts the subject id. Role and ban state are NOT trusted from claims -
//! the lifecycle engine re-reads them from the store on every operation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}

/// JWT verification configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("AUTH_JWT_SECRET")
            .unwrap_or_else(|_| "change-me-in-production".to_string());

        if secret == "change-me-in-production" {
            tracing::warn!("Using default JWT secret. Set AUTH_JWT_SECRET for production use.");
        }

        Self { secret }
    }
}

/// Claims carried by identity-provider tokens. Only the subject matters.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    iat: i64,
}

/// Verifies identity-provider bearer tokens.
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Validate a token and return the caller's user id.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let validation = Validation::default();
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Uuid::parse_str(&token_data.claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Mint a token in the provider's format. Dev mode and tests only;
    /// production tokens come from the identity provider itself.
    pub fn issue_dev_token(&self, user_id: Uuid, ttl_hours: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + TimeDelta::hours(ttl_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(JwtConfig {
            secret: "test-secret-key".to_string(),
        })
    }

    #[test]
    fn verify_roundtrip_returns_subject() {
        let verifier = verifier();
        let user_id = Uuid::new_v4();

        let token = verifier.issue_dev_token(user_id, 1).unwrap();
        let subject = verifier.verify(&token).unwrap();

        assert_eq!(subject, user_id);
    }

    #[test]
    fn verify_rejects_garbage() {
        let result = verifier().verify("not-a-token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let verifier = verifier();
        let token = verifier.issue_dev_token(Uuid::new_v4(), -1).unwrap();

        let result = verifier.verify(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = verifier().issue_dev_token(Uuid::new_v4(), 1).unwrap();
        let other = JwtVerifier::new(JwtConfig {
            secret: "different-secret".to_string(),
        });

        let result = other.verify(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
