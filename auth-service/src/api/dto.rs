//! # Data Transfer Objects (DTOs)
//!
//! DTOs define the structure of data transferred between client and server.
//! They serve as the **API contract** and handle:
//!
//! - **Request validation**: Using the `validator` crate
//! - **Deserialization**: JSON → Rust structs via `serde`
//! - **Serialization**: Rust structs → JSON for responses
//!
//! ## DTO Categories
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              DTOs                                       │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Request DTOs (input)               Response DTOs (output)              │
//! │  ───────────────────                ─────────────────────               │
//! │  - RegisterRequest                  - AuthResponseDto                   │
//! │  - LoginRequest                     - AccountPageDto                    │
//! │  - ChangePasswordRequest            - MessageResponse                   │
//! │  - ResetPasswordRequest             - HealthResponse                    │
//! │  - PhoneVerifyRequest                                                   │
//! │  - AdminCreateUserRequest                                               │
//! │  - AdminUpdateUserRequest                                               │
//! │  - AdminChangeRoleRequest                                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## JSON Naming Convention
//!
//! Every DTO uses `camelCase` **except** [`RegisterRequest`], whose field
//! names are the bare lowercase `firstname`/`lastname` the HTTP surface
//! specifies for that one endpoint.
//!
//! ## Related Documentation
//!
//! - Validation module: [`shared::validation`]
//! - API handlers: [`super::handlers`]

use serde::{Deserialize, Serialize};
use validator::Validate;

// =============================================================================
// REGISTRATION
// =============================================================================

/// Request body for self-service registration.
///
/// # Example JSON
///
/// ```json
/// {
///   "firstname": "Jane",
///   "lastname": "Doe",
///   "username": "janedoe",
///   "email": "jane@x.io",
///   "password": "SecurePass123!",
///   "phone": "+12065551234"
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(rename = "firstname")]
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[serde(rename = "lastname")]
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(custom(function = "shared::validation::validators::valid_username"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(custom(function = "shared::validation::validators::valid_phone"))]
    pub phone: String,
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// =============================================================================
// CHANGE PASSWORD (AUTHENTICATED)
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

// =============================================================================
// PASSWORD RESET
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetRequestRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetConsumeRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

// =============================================================================
// VERIFICATION
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhoneSendRequest {
    pub carrier: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PhoneVerifyRequest {
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

// =============================================================================
// ADMIN
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[serde(rename = "firstname")]
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[serde(rename = "lastname")]
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(custom(function = "shared::validation::validators::valid_username"))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(custom(function = "shared::validation::validators::valid_phone"))]
    pub phone: String,

    #[validate(range(min = 1, max = 5, message = "Role must be between 1 and 5"))]
    pub role: i16,
}

/// Partial update body, restricted to `{accountStatus, emailVerified, phoneVerified}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub account_status: Option<String>,
    pub email_verified: Option<bool>,
    pub phone_verified: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminResetPasswordRequest {
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminChangeRoleRequest {
    #[validate(range(min = 1, max = 5, message = "Role must be between 1 and 5"))]
    pub role: i16,
}

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub role: Option<i16>,
}

/// Query parameters for `GET /admin/users/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchUsersQuery {
    pub q: String,
    pub fields: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// Generic message response for simple confirmations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rejects_short_password() {
        let request = RegisterRequest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            username: "janedoe".to_string(),
            email: "jane@x.io".to_string(),
            password: "short".to_string(),
            phone: "+12065551234".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_deserializes_lowercase_fields() {
        let json = r#"{"firstname":"Jane","lastname":"Doe","username":"janedoe","email":"jane@x.io","password":"SecurePass123!","phone":"+12065551234"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.first_name, "Jane");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_login_request_valid() {
        let request = LoginRequest {
            email: "jane@x.io".to_string(),
            password: "whatever".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_phone_verify_request_requires_six_digits() {
        let request = PhoneVerifyRequest {
            code: "12345".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_message_response_new() {
        let response = MessageResponse::new("done");
        assert_eq!(response.message, "done");
    }
}
