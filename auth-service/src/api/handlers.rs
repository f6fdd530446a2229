//! # Request Handlers
//!
//! HTTP request handlers that bridge the API layer with the service layer.
//! Each handler follows this pattern:
//!
//! 1. **Extract** request data using Actix extractors
//! 2. **Validate** input using the `validator` crate
//! 3. **Call** service layer methods
//! 4. **Transform** and return HTTP response
//!
//! ## Error Handling
//!
//! All handlers return `Result<HttpResponse, ApiError>`. The `ApiError` type
//! automatically converts to appropriate HTTP status codes via the
//! `ResponseError` trait implementation.
//!
//! ## Authentication
//!
//! Protected endpoints extract the bearer token from the `Authorization`
//! header (or the legacy `x-access-token` header), verify it against
//! [`shared::auth::jwt::TokenService`], and build an `AuthenticatedUser` from
//! the resulting claims. There is no separate middleware layer — every
//! handler that needs the caller's identity calls [`authenticated_user`].
//!
//! ## Related Documentation
//!
//! - DTOs: [`super::dto`]
//! - Routes: [`super::routes`]
//! - Services: [`crate::service`]
//! - Errors: [`shared::errors::ApiError`]

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use shared::auth::jwt::TokenService;
use shared::auth::middleware::AuthenticatedUser;
use shared::{errors::ApiError, validation};
use sqlx::PgPool;

use crate::service::credential_service::RegisterInput;
use crate::AppState;

use super::dto::{
    ChangePasswordRequest, HealthResponse, LoginRequest, MessageResponse, PhoneSendRequest,
    PhoneVerifyRequest, RegisterRequest, ResetConsumeRequest, ResetRequestRequest,
};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Extracts and verifies the caller's access token, returning their identity.
///
/// Checks `Authorization: Bearer <token>` first, then the legacy
/// `x-access-token` header.
pub(super) fn authenticated_user(
    req: &HttpRequest,
    state: &AppState,
) -> Result<AuthenticatedUser, ApiError> {
    let authorization = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());
    let legacy = req
        .headers()
        .get("x-access-token")
        .and_then(|v| v.to_str().ok());

    let token = TokenService::extract_from_headers(authorization, legacy)?;
    let claims = state.tokens.verify_access(&token)?;
    AuthenticatedUser::try_from(claims)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

/// Health check endpoint for monitoring and load balancers.
///
/// # Route
///
/// `GET /health`
///
/// Reports store connectivity alongside liveness, per
/// [`shared::database::health_check`].
pub async fn health_check(state: web::Data<AppState>, pool: web::Data<PgPool>) -> HttpResponse {
    let status = match shared::database::health_check(&pool).await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };

    let response = HealthResponse {
        status: status.to_string(),
        service: state.service_name.clone(),
        timestamp: Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Registers a new account.
///
/// # Route
///
/// `POST /auth/register`
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let response = state
        .credentials
        .register(RegisterInput {
            first_name: body.first_name,
            last_name: body.last_name,
            username: body.username,
            email: body.email,
            password: body.password,
            phone: body.phone,
        })
        .await?;

    Ok(HttpResponse::Created().json(response))
}

// =============================================================================
// LOGIN
// =============================================================================

/// Authenticates a user and returns a bearer token.
///
/// # Route
///
/// `POST /auth/login`
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let response = state.credentials.login(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(response))
}

// =============================================================================
// CHANGE PASSWORD (AUTHENTICATED)
// =============================================================================

/// Changes the authenticated user's own password.
///
/// # Route
///
/// `POST /auth/user/password/change`
pub async fn change_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let body = body.into_inner();
    validation::validate_request(&body)?;

    state
        .credentials
        .change_password(caller.id, &body.old_password, &body.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password changed successfully")))
}

// =============================================================================
// PASSWORD RESET (PUBLIC)
// =============================================================================

/// Initiates the password reset flow. Always reports success to prevent
/// email enumeration.
///
/// # Route
///
/// `POST /auth/password/reset-request`
pub async fn reset_request(
    state: web::Data<AppState>,
    body: web::Json<ResetRequestRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    state.credentials.request_password_reset(&body.email).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "If an account exists with this email, a password reset link has been sent",
    )))
}

/// Completes the password reset flow using a reset token.
///
/// # Route
///
/// `POST /auth/password/reset`
pub async fn reset_consume(
    state: web::Data<AppState>,
    body: web::Json<ResetConsumeRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    state
        .credentials
        .consume_password_reset(&body.token, &body.password)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password reset successfully")))
}

// =============================================================================
// EMAIL VERIFICATION
// =============================================================================

/// Sends an email-verification challenge to the authenticated user.
///
/// # Route
///
/// `POST /auth/verify/email/send`
pub async fn send_email_verification(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let result = state.verification.send_email_verification(caller.id).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Query string for confirming an email-verification token.
#[derive(Debug, serde::Deserialize)]
pub struct EmailConfirmQuery {
    pub token: String,
}

/// Confirms an email-verification token from a link click, so this endpoint
/// is unauthenticated by nature.
///
/// # Route
///
/// `GET /auth/verify/email/confirm`
pub async fn confirm_email_verification(
    state: web::Data<AppState>,
    query: web::Query<EmailConfirmQuery>,
) -> Result<HttpResponse, ApiError> {
    state
        .verification
        .confirm_email_verification(&query.token)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Email verified successfully")))
}

// =============================================================================
// PHONE VERIFICATION
// =============================================================================

/// Sends a phone-verification code to the authenticated user.
///
/// # Route
///
/// `POST /auth/verify/phone/send`
pub async fn send_phone_verification(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PhoneSendRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let body = body.into_inner();

    state
        .verification
        .send_phone_verification(caller.id, body.carrier.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Verification code sent")))
}

/// Verifies a phone-verification code submitted by the authenticated user.
///
/// # Route
///
/// `POST /auth/verify/phone/verify`
pub async fn verify_phone_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PhoneVerifyRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let body = body.into_inner();
    validation::validate_request(&body)?;

    state.verification.verify_phone_code(caller.id, &body.code).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Phone verified successfully")))
}

// =============================================================================
// SELF PROFILE
// =============================================================================

/// Returns the authenticated user's own account.
///
/// # Route
///
/// `GET /auth/me`
pub async fn get_self(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let account = state.accounts.get_self(caller.id).await?;
    Ok(HttpResponse::Ok().json(account))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn request_without_auth_header_has_no_authorization() {
        let req = TestRequest::default().to_http_request();
        assert!(req.headers().get("Authorization").is_none());
    }

    #[test]
    fn email_confirm_query_deserializes_token() {
        let json = r#"{"token":"abc123"}"#;
        let query: EmailConfirmQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.token, "abc123");
    }
}
