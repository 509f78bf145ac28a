//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use patchouli_shared::ErrorResponse;
use std::fmt;

use patchouli_core::EngineError;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden,
    Banned,
    Conflict(String),
    Validation(String),
    ServiceUnavailable(String),
    Timeout,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Banned => write!(f, "Banned"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::Timeout => write!(f, "Timeout"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Banned => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Forbidden => ErrorResponse::forbidden()
                .with_detail("You lack the role or ownership required for this action."),
            AppError::Banned => ErrorResponse::new(403, "Account Banned")
                .with_detail("Your account is banned from write actions."),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Validation(detail) => ErrorResponse::unprocessable(detail),
            AppError::ServiceUnavailable(detail) => {
                tracing::error!("Store unavailable: {}", detail);
                ErrorResponse::service_unavailable("The post store is temporarily unavailable.")
            }
            AppError::Timeout => ErrorResponse::gateway_timeout(),
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from engine errors
impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unauthenticated => AppError::Unauthorized,
            EngineError::Forbidden => AppError::Forbidden,
            EngineError::Banned => AppError::Banned,
            EngineError::InvalidTransition => AppError::Conflict(
                "The post is not in a state that allows this action - it may have \
                 already been decided or removed."
                    .to_string(),
            ),
            EngineError::Validation(msg) => AppError::Validation(msg),
            EngineError::StoreUnavailable(msg) => AppError::ServiceUnavailable(msg),
            EngineError::Timeout => AppError::Timeout,
        }
    }
}

/// Map errors for read endpoints, where an undefined transition simply
/// means the resource is not there (or not visible to the caller).
pub fn read_error(err: EngineError) -> AppError {
    match err {
        EngineError::InvalidTransition => AppError::NotFound("post not found".to_string()),
        other => other.into(),
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
