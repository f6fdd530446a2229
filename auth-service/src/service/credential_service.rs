//! # Credential Service
//!
//! Business logic for the credential engine: registration, login,
//! authenticated password change, and the public password-reset flow.
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Credential Lifecycle                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  register  -> new_salt + hash -> Account(pending) + Credential          │
//! │  login     -> verify_hash(constant-time) -> access token                │
//! │  change    -> verify old -> reject if new == old -> set_credential      │
//! │  reset req -> issue password_reset token (stateless, 15 min)            │
//! │  reset use -> verify_reset -> set_credential (transactional)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! | Scenario                     | Error Type            | HTTP Status |
//! |-------------------------------|------------------------|-------------|
//! | Wrong password / unknown email| `InvalidCredentials`  | 401         |
//! | Account suspended              | `AccountSuspended`    | 403         |
//! | Account locked                  | `AccountLocked`      | 403         |
//! | Duplicate email/username/phone | `DuplicateUser`       | 409         |
//! | New password equals old        | `BadRequest`          | 400         |
//! | Reset token wrong kind/expired | `TokenWrongType`/`TokenExpired` | 401 |
//!
//! ## Related Documentation
//!
//! - Token kinds: [`shared::auth::jwt::TokenService`]
//! - Hashing backends: [`shared::auth::crypto`]
//! - Rate limiting: [`shared::rate_limit::RateLimiter`]

use std::sync::Arc;

use chrono::Duration;
use shared::auth::crypto::PasswordHasher;
use shared::auth::jwt::TokenService;
use shared::collaborators::Mailer;
use shared::errors::ApiError;
use shared::rate_limit::{Operation, RateLimiter};
use tracing::{info, warn};

use crate::domain::NewAccount;
use crate::repository::Store;

/// View of an account safe to return to clients: no salt, no hash, no
/// verification state beyond the two booleans.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub role: i16,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<crate::domain::Account> for AccountView {
    fn from(a: crate::domain::Account) -> Self {
        Self {
            id: a.id,
            first_name: a.first_name,
            last_name: a.last_name,
            username: a.username,
            email: a.email,
            phone: a.phone,
            email_verified: a.email_verified,
            phone_verified: a.phone_verified,
            role: a.role,
            status: a.status,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Returned by `register`/`login`: a fresh access token plus the caller's view.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: AccountView,
}

const RESET_WINDOW: Duration = Duration::minutes(5);

/// Fields accepted for self-service registration.
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

#[derive(Clone)]
pub struct CredentialService {
    store: Store,
    tokens: Arc<TokenService>,
    hasher: Arc<dyn PasswordHasher>,
    mailer: Arc<dyn Mailer>,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
}

impl CredentialService {
    pub fn new(
        store: Store,
        tokens: Arc<TokenService>,
        hasher: Arc<dyn PasswordHasher>,
        mailer: Arc<dyn Mailer>,
        rate_limiter: Arc<RateLimiter>,
        base_url: String,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            mailer,
            rate_limiter,
            base_url,
        }
    }

    // =========================================================================
    // REGISTER
    // =========================================================================

    /// Registers a new account. Role is hard-wired to `User(1)`; any role
    /// value in the request body is ignored by construction — this function
    /// doesn't accept one.
    pub async fn register(&self, input: RegisterInput) -> Result<AuthResponse, ApiError> {
        let salt = shared::auth::crypto::new_salt()?;
        let hash = self.hasher.hash(&input.password, &salt)?;

        let fields = NewAccount {
            first_name: input.first_name,
            last_name: input.last_name,
            username: input.username,
            email: input.email.clone(),
            phone: input.phone,
            role: 1,
        };

        let id = self
            .store
            .create_account_with_credential(fields, &salt, &hash, "pending")
            .await?;

        let account = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal("account vanished after creation".to_string()))?;

        info!(account_id = id, "account registered");

        let access_token = self.tokens.issue_access(id, &account.email, 1)?;

        Ok(AuthResponse {
            access_token,
            user: account.into(),
        })
    }

    // =========================================================================
    // LOGIN
    // =========================================================================

    /// Authenticates by email and password. Uses the same error for "no such
    /// account" and "wrong password" to resist enumeration, and performs a
    /// dummy hash against a fixed salt when the account doesn't exist so the
    /// two cases take comparable time.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let account = match self.store.get_account_by_email(email).await? {
            Some(a) => a,
            None => {
                let _ = self.hasher.hash(password, "0000000000000000");
                warn!(email, "login attempt for unknown email");
                return Err(ApiError::InvalidCredentials);
            }
        };

        match account.status.as_str() {
            "suspended" => return Err(ApiError::AccountSuspended),
            "locked" => return Err(ApiError::AccountLocked),
            "deleted" => return Err(ApiError::InvalidCredentials),
            _ => {}
        }

        let credential = self
            .store
            .get_credential(account.id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("account {} has no credential", account.id)))?;

        if !self.hasher.verify(password, &credential.salt, &credential.salted_hash) {
            warn!(account_id = account.id, "login attempt with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        info!(account_id = account.id, "login succeeded");

        let access_token = self.tokens.issue_access(account.id, &account.email, account.role)?;

        Ok(AuthResponse {
            access_token,
            user: account.into(),
        })
    }

    // =========================================================================
    // CHANGE PASSWORD (AUTHENTICATED)
    // =========================================================================

    pub async fn change_password(
        &self,
        account_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let credential = self
            .store
            .get_credential(account_id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{account_id}"),
            })?;

        if !self.hasher.verify(old_password, &credential.salt, &credential.salted_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        if self.hasher.verify(new_password, &credential.salt, &credential.salted_hash) {
            return Err(ApiError::BadRequest {
                message: "new password must differ from the current password".to_string(),
            });
        }

        let salt = shared::auth::crypto::new_salt()?;
        let hash = self.hasher.hash(new_password, &salt)?;
        self.store.set_credential(account_id, &salt, &hash).await?;

        info!(account_id, "password changed");
        Ok(())
    }

    // =========================================================================
    // PASSWORD RESET (PUBLIC)
    // =========================================================================

    /// Always returns `Ok(())` to the caller regardless of whether the
    /// account exists — enumeration resistance. The mail send (if any) and
    /// rate-limit bookkeeping happen internally.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        let subject = email.to_string();
        let rate_limited = self
            .rate_limiter
            .check(Operation::PasswordResetRequest, &subject, RESET_WINDOW)
            .is_err();

        if rate_limited {
            info!(email, "password reset request suppressed by rate limit");
            return Ok(());
        }

        let Some(account) = self.store.get_account_by_email(email).await? else {
            info!(email, "password reset requested for unknown email");
            return Ok(());
        };

        if !account.email_verified {
            return Ok(());
        }

        let token = self.tokens.issue_reset(account.id, &account.email)?;
        let url = format!("{}/reset-password?token={}", self.base_url, token);
        let delivered = self
            .mailer
            .send_reset(&account.email, &account.first_name, &url)
            .await;
        if !delivered {
            warn!(account_id = account.id, "password reset email delivery failed");
        }

        info!(account_id = account.id, "password reset token issued");
        Ok(())
    }

    /// Consumes a `password_reset` token and installs a new credential.
    /// Creates the credential row if one was somehow missing rather than
    /// failing, per the documented edge case.
    pub async fn consume_password_reset(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let claims = self.tokens.verify_reset(token)?;

        let account = self
            .store
            .get_account_by_id(claims.id)
            .await?
            .ok_or(ApiError::TokenInvalid)?;

        if account.email != claims.email {
            return Err(ApiError::TokenInvalid);
        }

        let salt = shared::auth::crypto::new_salt()?;
        let hash = self.hasher.hash(new_password, &salt)?;
        self.store.set_credential(account.id, &salt, &hash).await?;

        info!(account_id = account.id, "password reset consumed");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::{FirstName, LastName};
    use fake::faker::phone_number::en::PhoneNumber;
    use fake::Fake;

    #[test]
    fn register_input_accepts_generated_fixture_data() {
        let input = RegisterInput {
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            username: format!("user{}", (1000..9999).fake::<u32>()),
            email: SafeEmail().fake(),
            password: "correct-horse-battery-staple".to_string(),
            phone: PhoneNumber().fake(),
        };

        assert!(!input.first_name.is_empty());
        assert!(!input.last_name.is_empty());
        assert!(input.email.contains('@'));
    }

    #[test]
    fn account_view_projects_safe_fields_only() {
        let account = crate::domain::Account {
            id: 1,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            username: "janedoe".to_string(),
            email: "jane@x.io".to_string(),
            phone: "+12065551234".to_string(),
            email_verified: true,
            phone_verified: false,
            role: 1,
            status: "active".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let view: AccountView = account.into();
        assert_eq!(view.username, "janedoe");
        assert_eq!(view.role, 1);
    }
}
