//! # Application Error Types
//!
//! Unified error handling for the authentication core, with automatic HTTP
//! conversion for Actix-web handlers.
//!
//! ## Design Philosophy
//!
//! This module follows the "make illegal states unrepresentable" principle.
//! Each error variant maps to a specific HTTP status code and error code,
//! ensuring consistent API responses across the service.
//!
//! ## Error Categories
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ApiError Categories                             │
//! ├─────────────────────────┬───────────────────┬────────────────────────────┤
//! │ Authentication (401)    │ Authorization(403)│ Validation (400)           │
//! ├─────────────────────────┼───────────────────┼────────────────────────────┤
//! │ InvalidCredentials      │ Forbidden         │ ValidationError            │
//! │ TokenExpired/Invalid    │ TokenWrongType    │ MissingFields              │
//! │ TokenMissing            │ AccountSuspended  │ TooManyAttempts            │
//! │ Unauthenticated         │ AccountLocked     │ Expired                    │
//! │                         │                   │ VerificationNotFound       │
//! ├─────────────────────────┴───────────────────┴────────────────────────────┤
//! │ Resources (404, 409)    │ Rate Limit (429)  │ Server (500)               │
//! ├─────────────────────────┼───────────────────┼────────────────────────────┤
//! │ NotFound                │ RateLimited       │ DatabaseError              │
//! │ DuplicateUser            │                   │ DeliveryFailed             │
//! │                         │                   │ Internal                   │
//! └─────────────────────────┴───────────────────┴────────────────────────────┘
//! ```
//!
//! ## HTTP Response Format
//!
//! All errors are serialized to a consistent JSON format matching the
//! response envelope used for success bodies:
//!
//! ```json
//! {
//!   "success": false,
//!   "error": { "code": "VALIDATION_ERROR" },
//!   "message": "Validation error",
//!   "timestamp": "2024-01-15T10:30:00Z"
//! }
//! ```
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::errors::{ApiError, ApiResult};
//!
//! async fn get_user(id: i64) -> ApiResult<Account> {
//!     store.get_account_by_id(id)
//!         .await?
//!         .ok_or(ApiError::NotFound { resource: format!("user:{id}") })
//! }
//! ```

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Main Error Enum
// =============================================================================

/// Application error type with automatic HTTP status mapping.
///
/// Each variant represents a specific error condition and maps to an
/// appropriate HTTP status code.
///
/// ## Adding New Variants
///
/// 1. Choose the appropriate HTTP status code
/// 2. Add the variant with `#[error("...")]` for message format
/// 3. Update `status_code()` and `error_code()`
/// 4. Update `is_server_error()` if applicable
/// 5. Add tests
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Authentication Errors (401 Unauthorized)
    // =========================================================================
    /// Unknown email OR wrong password. Text is identical in both cases to
    /// resist account enumeration.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token on an authenticated route.
    #[error("Authentication required")]
    Unauthenticated,

    /// Neither `Authorization: Bearer` nor `x-access-token` was present.
    #[error("Missing authentication token")]
    TokenMissing,

    /// Token signature invalid, malformed, or otherwise unparseable.
    #[error("Invalid token")]
    TokenInvalid,

    /// Token signature verified but `exp` is in the past.
    #[error("Token expired")]
    TokenExpired,

    // =========================================================================
    // Authorization Errors (403 Forbidden)
    // =========================================================================
    /// Login blocked because the account's status is `suspended`.
    #[error("Account suspended")]
    AccountSuspended,

    /// Login blocked because the account's status is `locked`.
    #[error("Account locked")]
    AccountLocked,

    /// Token kind doesn't match what the endpoint requires (e.g. an access
    /// token presented where a `password_reset` token is required).
    #[error("Token is not valid for this operation")]
    TokenWrongType,

    /// Role or hierarchy guard rejected the operation.
    #[error("Forbidden: {reason}")]
    Forbidden {
        /// Why the guard rejected the caller (not echoed to untrusted
        /// clients verbatim in production, but useful for logs/tests).
        reason: String,
    },

    // =========================================================================
    // Validation Errors (400 Bad Request)
    // =========================================================================
    /// Request body failed validation rules (the `validator` crate).
    #[error("Validation error")]
    ValidationError(#[from] ValidationErrors),

    /// A partial-update patch body was empty or contained no allowed field.
    #[error("No updatable fields supplied")]
    MissingFields,

    /// Generic bad request with a custom message.
    #[error("Invalid input: {message}")]
    BadRequest {
        /// Human-readable description of what's wrong.
        message: String,
    },

    /// Phone verification attempts exhausted (`attempts >= 3`).
    #[error("Too many attempts")]
    TooManyAttempts,

    /// A verification row or reset token is past its `expires_at`/`exp`.
    #[error("Expired")]
    Expired,

    /// A verification token was already consumed or never existed.
    #[error("Resource not found: {resource}")]
    VerificationNotFound {
        /// Resource identifier (e.g., "email_verification:<token>").
        resource: String,
    },

    // =========================================================================
    // Resource Errors (404 Not Found, 409 Conflict)
    // =========================================================================
    /// Target account/verification row absent or already deleted.
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Resource identifier (e.g., "account:123").
        resource: String,
    },

    /// Unique constraint on username/email/phone would be violated.
    #[error("{field} already in use")]
    DuplicateUser {
        /// Name of the conflicting field.
        field: String,
    },

    // =========================================================================
    // Rate Limiting (429 Too Many Requests)
    // =========================================================================
    /// Per-account or per-IP throttle rejected the request.
    #[error("Rate limited")]
    RateLimited {
        /// Seconds until the client can retry.
        retry_after_seconds: u64,
    },

    // =========================================================================
    // Server Errors (500 Internal Server Error)
    // =========================================================================
    /// PostgreSQL query or transaction failed.
    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    /// Outbound email/SMS delivery failed after the owning transaction
    /// already committed. Never rolls back the commit that preceded it.
    #[error("Delivery failed")]
    DeliveryFailed,

    /// Unspecified internal error (entropy exhaustion, signing failure,
    /// hashing misconfiguration). Logged with full detail; never echoed.
    #[error("Internal server error")]
    Internal(String),
}

// =============================================================================
// Error Methods
// =============================================================================

impl ApiError {
    /// Returns a machine-readable error code in SCREAMING_SNAKE_CASE,
    /// matching the kind names enumerated in the error handling design.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::TokenMissing => "TOKEN_MISSING",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::AccountSuspended => "ACCOUNT_SUSPENDED",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::TokenWrongType => "TOKEN_WRONG_TYPE",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::MissingFields => "MISSING_FIELDS",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            Self::Expired => "EXPIRED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::VerificationNotFound { .. } => "NOT_FOUND",
            Self::DuplicateUser { .. } => "DUPLICATE_USER",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::DeliveryFailed => "DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error. This is the single
    /// source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::Unauthenticated
            | Self::TokenMissing
            | Self::TokenInvalid
            | Self::TokenExpired => StatusCode::UNAUTHORIZED,

            Self::AccountSuspended
            | Self::AccountLocked
            | Self::TokenWrongType
            | Self::Forbidden { .. } => StatusCode::FORBIDDEN,

            Self::ValidationError(_)
            | Self::MissingFields
            | Self::BadRequest { .. }
            | Self::TooManyAttempts
            | Self::Expired
            | Self::VerificationNotFound { .. } => StatusCode::BAD_REQUEST,

            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateUser { .. } => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            Self::DatabaseError(_) | Self::DeliveryFailed | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns `true` if this is a server-side error (5xx): logged at ERROR
    /// level and monitored, as opposed to client errors (4xx, WARN level).
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::DeliveryFailed | Self::Internal(_)
        )
    }
}

// =============================================================================
// Response Structure
// =============================================================================

/// The `error` object nested in the response envelope on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
}

/// Standard error response body, mirroring the success envelope shape:
/// `{ success, message?, error, timestamp }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: ErrorBody,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    /// Builds the response body for an `ApiError`, never including internal
    /// detail (SQL text, stack traces) for server errors.
    pub fn new(error: &ApiError) -> Self {
        let message = if error.is_server_error() {
            "Internal server error".to_string()
        } else {
            error.to_string()
        };

        Self {
            success: false,
            message,
            error: ErrorBody {
                code: error.error_code().to_string(),
            },
            timestamp: chrono::Utc::now(),
        }
    }
}

// =============================================================================
// Actix-web Integration
// =============================================================================

/// Implements Actix-web's `ResponseError`, so handlers can return
/// `Result<impl Responder, ApiError>` directly.
impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::warn!(error = %self, code = self.error_code(), "request rejected");
        }
        let body = ErrorResponse::new(self);
        HttpResponse::build(self.status_code()).json(body)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_errors_return_401() {
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenInvalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenMissing.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn authorization_errors_return_403() {
        assert_eq!(ApiError::AccountSuspended.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::AccountLocked.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::TokenWrongType.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Forbidden { reason: "strict dominance".into() }.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn resource_errors() {
        assert_eq!(
            ApiError::NotFound { resource: "account:1".to_string() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::DuplicateUser { field: "email".to_string() }.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn rate_limit_and_attempt_errors() {
        assert_eq!(
            ApiError::RateLimited { retry_after_seconds: 60 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ApiError::TooManyAttempts.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Expired.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn verification_not_found_is_400_with_not_found_code() {
        let err = ApiError::VerificationNotFound { resource: "email_verification:abc".to_string() };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn error_codes_are_screaming_snake_case() {
        assert_eq!(ApiError::InvalidCredentials.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(
            ApiError::NotFound { resource: "x".to_string() }.error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            ApiError::DuplicateUser { field: "email".to_string() }.error_code(),
            "DUPLICATE_USER"
        );
    }

    #[test]
    fn server_errors_are_flagged_and_hide_detail() {
        let err = ApiError::Internal("leaked detail".to_string());
        assert!(err.is_server_error());
        let body = ErrorResponse::new(&err);
        assert_eq!(body.message, "Internal server error");
        assert!(!ApiError::InvalidCredentials.is_server_error());
    }

    #[test]
    fn error_response_includes_timestamp() {
        let response = ErrorResponse::new(&ApiError::InvalidCredentials);
        let diff = chrono::Utc::now() - response.timestamp;
        assert!(diff.num_seconds() < 60);
    }
}
