//! # Verification Service
//!
//! Business logic for the two challenge-response verification flows: email
//! (opaque 64-hex token, 48h TTL) and phone (6-digit code, 15m TTL, 3
//! attempts). Both share one rate-limiter and one `Clock`.
//!
//! ## State Machine (phone)
//!
//! ```text
//! submit(code) when row state =
//!   Absent  -> NotFound
//!   Expired -> Expired            (checked before Locked)
//!   Locked  -> TooManyAttempts
//!   Fresh:
//!     match  -> verified, row deleted
//!     no match -> attempts += 1, WrongCode{attempts_remaining} or TooManyAttempts at 3
//! ```
//!
//! ## Related Documentation
//!
//! - Row-locked atomic updates: [`crate::repository::Store`]
//! - Rate limiting: [`shared::rate_limit::RateLimiter`]

use std::sync::Arc;

use chrono::Duration;
use shared::collaborators::{Clock, Mailer, SMSGateway};
use shared::errors::ApiError;
use shared::rate_limit::{Operation, RateLimiter};
use tracing::{info, warn};

use crate::repository::{PhoneConsumeOutcome, Store};

const EMAIL_RESEND_WINDOW: Duration = Duration::minutes(5);
const EMAIL_TOKEN_TTL: Duration = Duration::hours(48);
const PHONE_SEND_WINDOW: Duration = Duration::minutes(1);
const PHONE_CODE_TTL: Duration = Duration::minutes(15);

/// Result of sending an email-verification challenge. `dev_token_url` is
/// populated only in development mode, per the HTTP boundary contract.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSendResult {
    pub expires_in: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_token_url: Option<String>,
}

#[derive(Clone)]
pub struct VerificationService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    sms: Arc<dyn SMSGateway>,
    clock: Arc<dyn Clock>,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
    dev_mode: bool,
}

impl VerificationService {
    pub fn new(
        store: Store,
        mailer: Arc<dyn Mailer>,
        sms: Arc<dyn SMSGateway>,
        clock: Arc<dyn Clock>,
        rate_limiter: Arc<RateLimiter>,
        base_url: String,
        dev_mode: bool,
    ) -> Self {
        Self {
            store,
            mailer,
            sms,
            clock,
            rate_limiter,
            base_url,
            dev_mode,
        }
    }

    // =========================================================================
    // EMAIL
    // =========================================================================

    pub async fn send_email_verification(&self, account_id: i64) -> Result<EmailSendResult, ApiError> {
        let account = self
            .store
            .get_account_by_id(account_id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{account_id}"),
            })?;

        self.rate_limiter.check(
            Operation::EmailVerificationResend,
            &account_id.to_string(),
            EMAIL_RESEND_WINDOW,
        )?;

        let token = shared::auth::crypto::new_opaque_token()?;
        let expires_at = self.clock.now() + EMAIL_TOKEN_TTL;

        self.store
            .upsert_email_verification(account_id, &account.email, &token, expires_at)
            .await?;

        let url = format!("{}/verify-email?token={}", self.base_url, token);
        let delivered = self
            .mailer
            .send_verification(&account.email, &account.first_name, &url)
            .await;
        if !delivered {
            warn!(account_id, "email verification delivery failed");
        }

        info!(account_id, "email verification challenge issued");

        Ok(EmailSendResult {
            expires_in: "48 hours".to_string(),
            dev_token_url: self.dev_mode.then_some(url),
        })
    }

    /// Confirms an email-verification token. The row is deleted on success,
    /// so a repeat confirmation of the same token returns `VerificationNotFound`.
    pub async fn confirm_email_verification(&self, token: &str) -> Result<(), ApiError> {
        match self.store.consume_email_verification(token).await {
            Ok(account_id) => {
                info!(account_id, "email verified");
                Ok(())
            }
            Err(ApiError::NotFound { resource }) => Err(ApiError::VerificationNotFound { resource }),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // PHONE
    // =========================================================================

    pub async fn send_phone_verification(
        &self,
        account_id: i64,
        carrier: Option<&str>,
    ) -> Result<(), ApiError> {
        let account = self
            .store
            .get_account_by_id(account_id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("account:{account_id}"),
            })?;

        self.rate_limiter.check(
            Operation::PhoneCodeSend,
            &account_id.to_string(),
            PHONE_SEND_WINDOW,
        )?;

        let code = shared::auth::crypto::new_numeric_code()?;
        let expires_at = self.clock.now() + PHONE_CODE_TTL;

        self.store
            .upsert_phone_verification(account_id, &account.phone, &code, expires_at)
            .await?;

        let message = format!("Your verification code is {code}. It expires in 15 minutes.");
        let delivered = self.sms.send(&account.phone, carrier, &message).await;
        if !delivered {
            warn!(account_id, "phone verification delivery failed");
        }

        info!(account_id, "phone verification challenge issued");
        Ok(())
    }

    pub async fn verify_phone_code(&self, account_id: i64, code: &str) -> Result<(), ApiError> {
        match self.store.consume_phone_verification(account_id, code).await? {
            PhoneConsumeOutcome::Success => {
                info!(account_id, "phone verified");
                Ok(())
            }
            PhoneConsumeOutcome::Absent => Err(ApiError::NotFound {
                resource: format!("phone_verification:{account_id}"),
            }),
            PhoneConsumeOutcome::Expired => Err(ApiError::Expired),
            PhoneConsumeOutcome::TooManyAttempts => Err(ApiError::TooManyAttempts),
            PhoneConsumeOutcome::WrongCode { attempts_remaining } => Err(ApiError::BadRequest {
                message: format!("invalid code, {attempts_remaining} attempt(s) remaining"),
            }),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shared::collaborators::test_doubles::{FixedClock, RecordingMailer, RecordingSMSGateway};

    #[test]
    fn email_send_result_hides_dev_url_outside_development() {
        let result = EmailSendResult {
            expires_in: "48 hours".to_string(),
            dev_token_url: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("devTokenUrl"));
    }

    #[test]
    fn email_send_result_exposes_dev_url_in_development() {
        let result = EmailSendResult {
            expires_in: "48 hours".to_string(),
            dev_token_url: Some("https://x.io/verify-email?token=abc".to_string()),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("devTokenUrl"));
    }

    // Smoke-test the collaborator wiring this service depends on; full
    // integration coverage requires a live Postgres `Store`.
    #[tokio::test]
    async fn collaborator_doubles_record_sends() {
        let mailer = RecordingMailer::default();
        let sms = RecordingSMSGateway::default();
        let _clock = FixedClock::new("2024-01-01T00:00:00Z".parse().unwrap());

        mailer
            .send_verification("jane@x.io", "Jane", "https://x.io/verify-email?token=abc")
            .await;
        sms.send("+12065551234", None, "Your verification code is 123456.")
            .await;

        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
        assert_eq!(sms.sent.lock().unwrap().len(), 1);
    }
}
