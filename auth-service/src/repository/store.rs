//! # Account Store
//!
//! Transactional persistence over the account lifecycle entities:
//! [`Account`], [`Credential`], [`EmailVerification`], [`PhoneVerification`].
//!
//! ## Query Patterns
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Query Patterns                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │ Pattern          │ Example                                              │
//! ├───────────────────┼─────────────────────────────────────────────────────┤
//! │ Soft delete      │ WHERE status <> 'deleted'                            │
//! │ Row locking      │ SELECT ... FOR UPDATE (inside a transaction)         │
//! │ Returning        │ INSERT ... RETURNING * (to get generated fields)     │
//! │ Parameterized    │ Always use $1, $2 (never string interpolation)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Every multi-row mutation runs inside a single `sqlx::Transaction`. Reads
//! that feed a subsequent write in the same operation (the phone-verification
//! attempt counter, the target-role read for hierarchy checks) take a row
//! lock via `SELECT ... FOR UPDATE` first.
//!
//! ## Error Handling
//!
//! | Condition                    | `ApiError` variant       |
//! |-------------------------------|--------------------------|
//! | Unique constraint violated    | `DuplicateUser { field }`|
//! | Row not found                 | `NotFound { resource }`  |
//! | Any other sqlx error          | `DatabaseError`          |

use chrono::{DateTime, Utc};
use shared::errors::ApiError;
use sqlx::PgPool;

use crate::domain::{Account, Credential, EmailVerification, NewAccount, PhoneVerification};

/// Outcome of submitting a phone verification code, per the state machine
/// in the verification engine: order of checks is absent, then expired,
/// then locked, then code comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneConsumeOutcome {
    Success,
    WrongCode { attempts_remaining: i32 },
    TooManyAttempts,
    Expired,
    Absent,
}

/// Fields an admin/account-service caller may patch on an account.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub status: Option<String>,
    pub email_verified: Option<bool>,
    pub phone_verified: Option<bool>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.email_verified.is_none() && self.phone_verified.is_none()
    }
}

/// Optional filters for `list_accounts`.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub status: Option<String>,
    pub role: Option<i16>,
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub pending_accounts: i64,
    pub suspended_accounts: i64,
    pub locked_accounts: i64,
    pub new_accounts_last_7_days: i64,
}

fn db_err(e: sqlx::Error) -> ApiError {
    ApiError::DatabaseError(e)
}

fn duplicate_field_from(e: &sqlx::Error) -> Option<&'static str> {
    if let sqlx::Error::Database(db) = e {
        let constraint = db.constraint().unwrap_or_default();
        if constraint.contains("username") {
            return Some("username");
        }
        if constraint.contains("email") {
            return Some("email");
        }
        if constraint.contains("phone") {
            return Some("phone");
        }
    }
    None
}

/// Data access layer over the five account-lifecycle tables.
///
/// `Store` is `Send + Sync` because `PgPool` internally uses `Arc`; it can
/// be shared across async tasks and Actix-web workers freely.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // ACCOUNT CREATION
    // =========================================================================

    /// Inserts Account then Credential atomically; rolls back on any failure.
    /// Fails with `ApiError::DuplicateUser` when a unique constraint on
    /// username/email/phone would be violated.
    pub async fn create_account_with_credential(
        &self,
        fields: NewAccount,
        salt: &str,
        salted_hash: &[u8],
        status: &str,
    ) -> Result<i64, ApiError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let account_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (
                first_name, last_name, username, email, phone, role, status,
                email_verified, phone_verified, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, false, false, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.username)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.role)
        .bind(status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            duplicate_field_from(&e)
                .map(|field| ApiError::DuplicateUser {
                    field: field.to_string(),
                })
                .unwrap_or_else(|| db_err(e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO credentials (account_id, salt, salted_hash)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(account_id)
        .bind(salt)
        .bind(salted_hash)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(account_id)
    }

    // =========================================================================
    // ACCOUNT READS
    // =========================================================================

    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, ApiError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    pub async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>, ApiError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    pub async fn get_credential(&self, account_id: i64) -> Result<Option<Credential>, ApiError> {
        sqlx::query_as::<_, Credential>("SELECT * FROM credentials WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Returns the account's current role, taking a row lock — used by the
    /// hierarchy guards that must read-then-mutate atomically.
    pub async fn get_role_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: i64,
    ) -> Result<Option<i16>, ApiError> {
        sqlx::query_scalar("SELECT role FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_err)
    }

    // =========================================================================
    // ACCOUNT UPDATES
    // =========================================================================

    /// Dynamic partial update limited to `{status, email_verified, phone_verified}`.
    pub async fn update_account_fields(
        &self,
        id: i64,
        patch: &AccountPatch,
    ) -> Result<(), ApiError> {
        if patch.is_empty() {
            return Err(ApiError::MissingFields);
        }
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET status = COALESCE($1, status),
                email_verified = COALESCE($2, email_verified),
                phone_verified = COALESCE($3, phone_verified),
                updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&patch.status)
        .bind(patch.email_verified)
        .bind(patch.phone_verified)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: format!("account:{id}"),
            });
        }
        Ok(())
    }

    pub async fn update_role(&self, id: i64, new_role: i16) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE accounts SET role = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(new_role)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: format!("account:{id}"),
            });
        }
        Ok(())
    }

    /// Sets `status='deleted'`. Idempotent: a no-op on an already-deleted
    /// account is reported as `NotFound` so the caller surfaces 404.
    pub async fn soft_delete(&self, id: i64) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE accounts SET status = 'deleted', updated_at = NOW() WHERE id = $1 AND status <> 'deleted'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: format!("account:{id}"),
            });
        }
        Ok(())
    }

    /// Upserts the Credential under a single `account_id`, bumping
    /// `Account.updated_at` in the same transaction.
    pub async fn set_credential(
        &self,
        id: i64,
        salt: &str,
        salted_hash: &[u8],
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO credentials (account_id, salt, salted_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id) DO UPDATE SET salt = $2, salted_hash = $3
            "#,
        )
        .bind(id)
        .bind(salt)
        .bind(salted_hash)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("UPDATE accounts SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    // =========================================================================
    // EMAIL VERIFICATION
    // =========================================================================

    pub async fn get_email_verification(
        &self,
        account_id: i64,
    ) -> Result<Option<EmailVerification>, ApiError> {
        sqlx::query_as::<_, EmailVerification>(
            "SELECT * FROM email_verifications WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Replaces any outstanding row for the account (overwrite on conflict,
    /// resetting `created_at`).
    pub async fn upsert_email_verification(
        &self,
        account_id: i64,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO email_verifications (account_id, email, token, expires_at, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (account_id) DO UPDATE
            SET email = $2, token = $3, expires_at = $4, created_at = NOW()
            "#,
        )
        .bind(account_id)
        .bind(email)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Locates the row by token, requires `expires_at > now`, sets
    /// `email_verified = true`, and deletes the row — all in one transaction.
    pub async fn consume_email_verification(&self, token: &str) -> Result<i64, ApiError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT account_id, expires_at FROM email_verifications WHERE token = $1 FOR UPDATE",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let (account_id, expires_at) = row.ok_or(ApiError::NotFound {
            resource: "email_verification".to_string(),
        })?;

        if expires_at <= Utc::now() {
            return Err(ApiError::Expired);
        }

        sqlx::query("UPDATE accounts SET email_verified = true, updated_at = NOW() WHERE id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("DELETE FROM email_verifications WHERE account_id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(account_id)
    }

    // =========================================================================
    // PHONE VERIFICATION
    // =========================================================================

    pub async fn get_phone_verification(
        &self,
        account_id: i64,
    ) -> Result<Option<PhoneVerification>, ApiError> {
        sqlx::query_as::<_, PhoneVerification>(
            "SELECT * FROM phone_verifications WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Resets `attempts=0` for a freshly-issued code.
    pub async fn upsert_phone_verification(
        &self,
        account_id: i64,
        phone: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO phone_verifications (account_id, phone, code, expires_at, attempts, created_at)
            VALUES ($1, $2, $3, $4, 0, NOW())
            ON CONFLICT (account_id) DO UPDATE
            SET phone = $2, code = $3, expires_at = $4, attempts = 0, created_at = NOW()
            "#,
        )
        .bind(account_id)
        .bind(phone)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Implements the verify state machine. Order of checks: absent,
    /// expired, locked, then code comparison — expired MUST be checked
    /// before locked so expired codes never consume an attempt. The read
    /// and any attempt increment happen inside one transaction with a row
    /// lock to stay correct under concurrent submissions.
    pub async fn consume_phone_verification(
        &self,
        account_id: i64,
        submitted_code: &str,
    ) -> Result<PhoneConsumeOutcome, ApiError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row: Option<(String, DateTime<Utc>, i32)> = sqlx::query_as(
            "SELECT code, expires_at, attempts FROM phone_verifications WHERE account_id = $1 FOR UPDATE",
        )
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let Some((stored_code, expires_at, attempts)) = row else {
            return Ok(PhoneConsumeOutcome::Absent);
        };

        if expires_at <= Utc::now() {
            return Ok(PhoneConsumeOutcome::Expired);
        }

        if attempts >= 3 {
            return Ok(PhoneConsumeOutcome::TooManyAttempts);
        }

        if shared::auth::crypto::constant_time_eq(&stored_code, submitted_code) {
            sqlx::query(
                "UPDATE accounts SET phone_verified = true, updated_at = NOW() WHERE id = $1",
            )
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            sqlx::query("DELETE FROM phone_verifications WHERE account_id = $1")
                .bind(account_id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

            tx.commit().await.map_err(db_err)?;
            return Ok(PhoneConsumeOutcome::Success);
        }

        let new_attempts = attempts + 1;
        sqlx::query("UPDATE phone_verifications SET attempts = $1 WHERE account_id = $2")
            .bind(new_attempts)
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        if new_attempts >= 3 {
            Ok(PhoneConsumeOutcome::TooManyAttempts)
        } else {
            Ok(PhoneConsumeOutcome::WrongCode {
                attempts_remaining: 3 - new_attempts,
            })
        }
    }

    // =========================================================================
    // LISTING / SEARCH / DASHBOARD
    // =========================================================================

    /// Cursorless offset pagination; `limit` is clamped to 100.
    pub async fn list_accounts(
        &self,
        filter: &AccountFilter,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Account>, i64), ApiError> {
        let limit = limit.clamp(1, 100);
        let offset = (page.max(1) - 1) * limit;

        let rows = sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::smallint IS NULL OR role = $2)
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filter.status)
        .bind(filter.role)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM accounts
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::smallint IS NULL OR role = $2)
            "#,
        )
        .bind(&filter.status)
        .bind(filter.role)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok((rows, total))
    }

    /// Case-insensitive substring search over the requested fields.
    pub async fn search_accounts(
        &self,
        q: &str,
        fields: &[&str],
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Account>, i64), ApiError> {
        let allowed = ["firstname", "lastname", "username", "email"];
        let columns: Vec<&str> = fields
            .iter()
            .filter(|f| allowed.contains(f))
            .map(|f| match *f {
                "firstname" => "first_name",
                "lastname" => "last_name",
                other => other,
            })
            .collect();
        let columns = if columns.is_empty() {
            vec!["first_name", "last_name", "username", "email"]
        } else {
            columns
        };

        let limit = limit.clamp(1, 100);
        let offset = (page.max(1) - 1) * limit;
        let pattern = format!("%{}%", q.to_lowercase());

        let clause = columns
            .iter()
            .map(|c| format!("LOWER({c}) LIKE $1"))
            .collect::<Vec<_>>()
            .join(" OR ");

        let query = format!(
            "SELECT * FROM accounts WHERE ({clause}) ORDER BY id LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Account>(&query)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let count_query = format!("SELECT COUNT(*) FROM accounts WHERE ({clause})");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        Ok((rows, total))
    }

    pub async fn dashboard_counts(&self) -> Result<DashboardCounts, ApiError> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'active'),
                COUNT(*) FILTER (WHERE status = 'pending'),
                COUNT(*) FILTER (WHERE status = 'suspended'),
                COUNT(*) FILTER (WHERE status = 'locked'),
                COUNT(*) FILTER (WHERE created_at > NOW() - INTERVAL '7 days')
            FROM accounts
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(DashboardCounts {
            total_accounts: row.0,
            active_accounts: row.1,
            pending_accounts: row.2,
            suspended_accounts: row.3,
            locked_accounts: row.4,
            new_accounts_last_7_days: row.5,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_patch_empty_detection() {
        assert!(AccountPatch::default().is_empty());
        assert!(!AccountPatch {
            status: Some("active".to_string()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn duplicate_field_matches_constraint_name_substrings() {
        // Exercised indirectly through create_account_with_credential against
        // a live database; unit-level coverage of the matching rule itself.
        assert_eq!(
            ["username", "email", "phone"]
                .iter()
                .find(|f| "accounts_username_key".contains(*f)),
            Some(&"username")
        );
    }
}
