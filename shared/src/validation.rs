//! # Request Validation Helpers
//!
//! Utilities for validating incoming request data using the `validator` crate.
//!
//! ## Overview
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`validate_request`] | Validate a struct implementing `Validate` |
//! | [`parse_and_validate`] | Parse JSON and validate in one step |
//! | [`validators`] | Custom validation functions |
//!
//! ## How Validation Works
//!
//! We use the [`validator`](https://docs.rs/validator/) crate which provides
//! derive macros for declarative validation:
//!
//! ```rust,ignore
//! use validator::Validate;
//!
//! #[derive(Validate)]
//! struct RegisterDto {
//!     #[validate(email)]
//!     email: String,
//!
//!     #[validate(length(min = 8))]
//!     password: String,
//!
//!     #[validate(custom(function = "validators::valid_username"))]
//!     username: String,
//! }
//! ```
//!
//! ## Validation Flow
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ JSON Request │────►│ Deserialize   │────►│   Validate   │
//! │              │     │ (serde)       │     │  (validator) │
//! └──────────────┘     └───────────────┘     └──────┬───────┘
//!                                                   │
//!         ┌─────────────────────────────────────────┴───────┐
//!         │                                                 │
//!         ▼                                                 ▼
//! ┌───────────────┐                               ┌─────────────────┐
//! │   Success     │                               │ ValidationError │
//! │ (continue)    │                               │   (400 + details)│
//! └───────────────┘                               └─────────────────┘
//! ```
//!
//! ## Custom Validators
//!
//! | Validator | Purpose |
//! |-----------|---------|
//! | `valid_username` | 3-50 chars, alphanumerics plus `_-` |
//! | `valid_phone` | E.164-normalizable (`+` then 8-15 digits) |
//! | `not_blank` | String is not empty after trimming |
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::validation::{validate_request, validators};
//! use validator::Validate;
//!
//! #[derive(Validate)]
//! struct RegisterDto {
//!     #[validate(custom(function = "validators::valid_username"))]
//!     username: String,
//!
//!     #[validate(custom(function = "validators::valid_phone"))]
//!     phone: String,
//! }
//!
//! async fn handler(body: Json<RegisterDto>) -> Result<impl Responder, ApiError> {
//!     validate_request(&body)?;
//!     // Validation passed, continue...
//! }
//! ```

use crate::errors::ApiError;
use serde::de::DeserializeOwned;
use validator::Validate;

// =============================================================================
// Core Validation Functions
// =============================================================================

/// Validates a request DTO that implements `Validate`.
///
/// This is the primary validation function. Use it in handlers to
/// validate incoming data.
///
/// ## Errors
///
/// Returns `ApiError::ValidationError` with field-level details if validation fails.
pub fn validate_request<T: Validate>(data: &T) -> Result<(), ApiError> {
    data.validate().map_err(ApiError::ValidationError)
}

/// Parses JSON string and validates in a single step.
///
/// ## Errors
///
/// - `ApiError::BadRequest` if JSON parsing fails
/// - `ApiError::ValidationError` if validation fails
pub fn parse_and_validate<T: DeserializeOwned + Validate>(json: &str) -> Result<T, ApiError> {
    let data: T = serde_json::from_str(json).map_err(|e| ApiError::BadRequest {
        message: e.to_string(),
    })?;
    validate_request(&data)?;
    Ok(data)
}

// =============================================================================
// Custom Validators
// =============================================================================

/// Custom validation functions for use with `#[validate(custom)]`.
///
/// These functions follow the validator crate's signature:
/// `fn(&T) -> Result<(), ValidationError>`
pub mod validators {
    use validator::ValidationError;

    /// Validates that a string is not blank (empty or whitespace-only).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("blank"));
        }
        Ok(())
    }

    /// Validates a username: 3-50 characters, alphanumerics plus `_` and `-`.
    ///
    /// ## Valid Examples
    ///
    /// - `"janedoe"` ✓
    /// - `"jane_doe-99"` ✓
    ///
    /// ## Invalid Examples
    ///
    /// - `"jd"` ✗ (too short)
    /// - `"jane doe"` ✗ (space not allowed)
    pub fn valid_username(value: &str) -> Result<(), ValidationError> {
        if value.len() < 3 || value.len() > 50 {
            return Err(ValidationError::new("username_length"));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ValidationError::new("username_charset"));
        }
        Ok(())
    }

    /// Validates an E.164-normalizable phone number: a leading `+` followed
    /// by 8 to 15 digits.
    ///
    /// ## Valid Examples
    ///
    /// - `"+12065551234"` ✓
    ///
    /// ## Invalid Examples
    ///
    /// - `"2065551234"` ✗ (missing `+`)
    /// - `"+1"` ✗ (too short)
    pub fn valid_phone(value: &str) -> Result<(), ValidationError> {
        let digits = match value.strip_prefix('+') {
            Some(rest) => rest,
            None => return Err(ValidationError::new("phone_missing_plus")),
        };
        if digits.len() < 8 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new("phone_format"));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::validators::*;

    #[test]
    fn test_not_blank_valid() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("  hello  ").is_ok());
    }

    #[test]
    fn test_not_blank_invalid() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
    }

    #[test]
    fn test_valid_username_valid() {
        assert!(valid_username("janedoe").is_ok());
        assert!(valid_username("jane_doe-99").is_ok());
        assert!(valid_username("abc").is_ok());
    }

    #[test]
    fn test_valid_username_invalid() {
        assert!(valid_username("jd").is_err()); // too short
        assert!(valid_username("jane doe").is_err()); // space
        assert!(valid_username(&"a".repeat(51)).is_err()); // too long
    }

    #[test]
    fn test_valid_phone_valid() {
        assert!(valid_phone("+12065551234").is_ok());
        assert!(valid_phone("+447911123456").is_ok());
    }

    #[test]
    fn test_valid_phone_invalid() {
        assert!(valid_phone("2065551234").is_err()); // missing +
        assert!(valid_phone("+1").is_err()); // too short
        assert!(valid_phone("+1abc5551234").is_err()); // non-digit
    }
}
