//! # Admin Request Handlers
//!
//! The admin account surface: create/list/search/get/update/reset-password/
//! delete/change-role/dashboard. Every handler extracts the caller via
//! [`super::handlers::authenticated_user`] and passes it straight through to
//! [`crate::service::AccountService`], which enforces the role hierarchy.

use actix_web::{web, HttpRequest, HttpResponse};
use shared::errors::ApiError;
use shared::validation;

use crate::api::handlers::authenticated_user;
use crate::domain::AccountStatus;
use crate::repository::{AccountFilter, AccountPatch};
use crate::service::account_service::CreateUserInput;
use crate::AppState;

use super::dto::{
    AdminChangeRoleRequest, AdminCreateUserRequest, AdminResetPasswordRequest,
    AdminUpdateUserRequest, ListUsersQuery, MessageResponse, SearchUsersQuery,
};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 20;

/// Maps the DTO's `accountStatus` string onto a validated status, rejecting
/// anything that is not one of the five lifecycle states.
fn validate_status(status: Option<String>) -> Result<Option<String>, ApiError> {
    match status {
        None => Ok(None),
        Some(s) => AccountStatus::from_str(&s)
            .map(|status| Some(status.as_str().to_string()))
            .ok_or_else(|| ApiError::BadRequest {
                message: format!("unknown account status: {s}"),
            }),
    }
}

// =============================================================================
// CREATE
// =============================================================================

/// Creates a new account directly, bypassing self-registration.
///
/// # Route
///
/// `POST /admin/users`
pub async fn create_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<AdminCreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let account = state
        .accounts
        .create_user(
            CreateUserInput {
                first_name: body.first_name,
                last_name: body.last_name,
                username: body.username,
                email: body.email,
                password: body.password,
                phone: body.phone,
                role: body.role,
            },
            &caller,
        )
        .await?;

    Ok(HttpResponse::Created().json(account))
}

// =============================================================================
// LIST / SEARCH / GET
// =============================================================================

/// Lists accounts with optional status/role filters.
///
/// # Route
///
/// `GET /admin/users`
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let query = query.into_inner();

    let filter = AccountFilter {
        status: query.status,
        role: query.role,
    };
    let page = state
        .accounts
        .list_users(
            filter,
            query.page.unwrap_or(DEFAULT_PAGE),
            query.limit.unwrap_or(DEFAULT_LIMIT),
            &caller,
        )
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Searches accounts by a case-insensitive substring over name/email/username.
///
/// # Route
///
/// `GET /admin/users/search`
pub async fn search_users(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<SearchUsersQuery>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let query = query.into_inner();

    let fields: Vec<&str> = query
        .fields
        .as_deref()
        .map(|f| f.split(',').collect())
        .unwrap_or_default();

    let page = state
        .accounts
        .search_users(
            &query.q,
            &fields,
            query.page.unwrap_or(DEFAULT_PAGE),
            query.limit.unwrap_or(DEFAULT_LIMIT),
            &caller,
        )
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Returns a single account by id.
///
/// # Route
///
/// `GET /admin/users/{id}`
pub async fn get_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let account = state.accounts.get_user(path.into_inner(), &caller).await?;
    Ok(HttpResponse::Ok().json(account))
}

// =============================================================================
// UPDATE / DELETE / ROLE / PASSWORD
// =============================================================================

/// Patches `{accountStatus, emailVerified, phoneVerified}` on an account.
///
/// # Route
///
/// `PUT /admin/users/{id}`
pub async fn update_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<AdminUpdateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let body = body.into_inner();

    let patch = AccountPatch {
        status: validate_status(body.account_status)?,
        email_verified: body.email_verified,
        phone_verified: body.phone_verified,
    };
    if patch.is_empty() {
        return Err(ApiError::MissingFields);
    }

    let account = state
        .accounts
        .update_user(path.into_inner(), patch, &caller)
        .await?;

    Ok(HttpResponse::Ok().json(account))
}

/// Soft-deletes an account.
///
/// # Route
///
/// `DELETE /admin/users/{id}`
pub async fn delete_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    state.accounts.delete_user(path.into_inner(), &caller).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Account deleted successfully")))
}

/// Resets a target account's password to an admin-supplied value.
///
/// # Route
///
/// `PUT /admin/users/{id}/password`
pub async fn reset_user_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<AdminResetPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let body = body.into_inner();
    validation::validate_request(&body)?;

    state
        .accounts
        .reset_user_password(path.into_inner(), &body.password, &caller)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password reset successfully")))
}

/// Changes a target account's role, subject to strict-dominance hierarchy
/// rules enforced in [`crate::service::AccountService::change_user_role`].
///
/// # Route
///
/// `PUT /admin/users/{id}/role`
pub async fn change_user_role(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<AdminChangeRoleRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let account = state
        .accounts
        .change_user_role(path.into_inner(), body.role, &caller)
        .await?;

    Ok(HttpResponse::Ok().json(account))
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// Returns aggregate account counts for the admin dashboard.
///
/// # Route
///
/// `GET /admin/dashboard/stats`
pub async fn dashboard_stats(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let caller = authenticated_user(&req, &state)?;
    let stats = state.accounts.dashboard_stats(&caller).await?;
    Ok(HttpResponse::Ok().json(stats))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_status_accepts_known_values() {
        assert_eq!(
            validate_status(Some("active".to_string())).unwrap(),
            Some("active".to_string())
        );
    }

    #[test]
    fn validate_status_rejects_unknown_values() {
        assert!(validate_status(Some("bogus".to_string())).is_err());
    }

    #[test]
    fn validate_status_passes_through_none() {
        assert_eq!(validate_status(None).unwrap(), None);
    }
}
