//! # Account Domain Entities
//!
//! Core persistent business objects for the account lifecycle. Entities map
//! one-to-one onto PostgreSQL tables and carry every persisted field
//! including secrets; API-facing DTOs (see [`crate::api::dto`]) project only
//! the safe subset.
//!
//! ## Entity Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Domain Entities                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌────────────────────────┐              │
//! │  │       Account        │        │       Credential       │              │
//! │  ├─────────────────────┤  1:1   ├────────────────────────┤              │
//! │  │ - id (PK)           │───────▶│ - account_id (FK)      │              │
//! │  │ - username/email/   │        │ - salt                 │              │
//! │  │   phone (unique)    │        │ - salted_hash           │              │
//! │  │ - role (1..5)       │        └────────────────────────┘              │
//! │  │ - status            │                                                │
//! │  └─────────┬───────────┘                                                │
//! │            │ 1:1 (at most one outstanding each)                          │
//! │            ▼                                                            │
//! │  ┌─────────────────────┐        ┌────────────────────────┐              │
//! │  │  EmailVerification  │        │    PhoneVerification    │              │
//! │  ├─────────────────────┤        ├────────────────────────┤              │
//! │  │ - account_id (PK)   │        │ - account_id (PK)       │              │
//! │  │ - token (64 hex)    │        │ - code (6 digits)        │              │
//! │  │ - expires_at        │        │ - attempts (0..3)        │              │
//! │  └─────────────────────┘        └────────────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! (none) --register--> pending --verify/activate--> active
//!              |                                        |
//!              |                                  suspend|lock
//!              |                                        v
//!              +--------admin-soft-delete--> deleted <-- (suspended|locked)
//!                                                 \
//!                                                  +--reactivate--> active
//! ```
//!
//! ## Security Considerations
//!
//! - **Never expose `Credential`** in API responses — it exists only for the
//!   store and the credential service.
//! - `salted_hash`/`salt` are raw byte strings (fixed length), not PHC
//!   strings; see [`shared::auth::crypto`] for the hashing backends.
//! - Soft delete (`status = deleted`) retains Credential and verification
//!   rows; only hard delete (not exposed via the API) cascades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// ACCOUNT STATUS / ROLE
// =============================================================================

/// The account lifecycle status. Stored as text in PostgreSQL, matched
/// against this closed set at the application boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Active,
    Suspended,
    Locked,
    Deleted,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Locked => "locked",
            Self::Deleted => "deleted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "locked" => Some(Self::Locked),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// Complete account entity as stored in the database.
///
/// **Never expose this struct directly in API responses** — use
/// [`crate::api::dto::AccountView`] instead.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    /// Integer in `1..5`; see [`shared::auth::middleware::Role`].
    pub role: i16,
    /// Textual status; validated against [`AccountStatus`] at the boundary.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn account_status(&self) -> AccountStatus {
        AccountStatus::from_str(&self.status).unwrap_or(AccountStatus::Active)
    }
}

/// Fields accepted when creating an account. `password` has already been
/// salted and hashed by the time this reaches the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub role: i16,
}

// =============================================================================
// CREDENTIAL
// =============================================================================

/// Credential entity: one per account, enforced by a unique constraint on
/// `account_id`. `salted_hash` and `salt` are raw byte strings, never PHC
/// strings — see [`shared::auth::crypto`].
#[derive(Debug, Clone, FromRow)]
pub struct Credential {
    pub account_id: i64,
    pub salt: String,
    pub salted_hash: Vec<u8>,
}

// =============================================================================
// EMAIL VERIFICATION
// =============================================================================

/// At most one outstanding row per account; single-use (deleted on success).
#[derive(Debug, Clone, FromRow)]
pub struct EmailVerification {
    pub account_id: i64,
    /// Email snapshotted at issuance time, not re-read from Account.
    pub email: String,
    /// Opaque 64-hex token.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// PHONE VERIFICATION
// =============================================================================

/// At most one outstanding row per account; `attempts <= 3`.
#[derive(Debug, Clone, FromRow)]
pub struct PhoneVerification {
    pub account_id: i64,
    pub phone: String,
    /// 6 decimal digits, zero-padded.
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_status_round_trips_through_str() {
        for status in [
            AccountStatus::Pending,
            AccountStatus::Active,
            AccountStatus::Suspended,
            AccountStatus::Locked,
            AccountStatus::Deleted,
        ] {
            assert_eq!(AccountStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(AccountStatus::from_str("bogus"), None);
    }
}
