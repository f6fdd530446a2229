//! # Rate Limiter
//!
//! In-process throttle guarding the handful of account operations that
//! carry explicit per-window limits: email-verification resend, SMS-code
//! send, and password-reset request. Keyed by `(operation, subject)` where
//! `subject` is typically an account id or, for unauthenticated reset
//! requests against an unknown account, the submitted email/IP.
//!
//! A single process-wide table is sufficient for this service's scope
//! (single instance, no cross-node session state per the account
//! lifecycle's non-goals); a multi-instance deployment would back this
//! with a shared store instead, but that is out of scope here.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::rate_limit::{RateLimiter, Operation};
//!
//! let limiter = RateLimiter::new(clock.clone());
//! limiter.check(Operation::EmailVerificationResend, &account_id.to_string(), Duration::minutes(5))?;
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::collaborators::Clock;
use crate::errors::ApiError;

/// The rate-limited operations named in the account lifecycle's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    EmailVerificationResend,
    PhoneCodeSend,
    PasswordResetRequest,
}

/// Tracks the most recent attempt timestamp per `(operation, subject)`.
pub struct RateLimiter {
    clock: std::sync::Arc<dyn Clock>,
    last_attempt: Mutex<HashMap<(Operation, String), DateTime<Utc>>>,
}

impl RateLimiter {
    pub fn new(clock: std::sync::Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_attempt: Mutex::new(HashMap::new()),
        }
    }

    /// Rejects with `ApiError::RateLimited` if `subject` attempted `op`
    /// within `window` of now; otherwise records this attempt and allows it.
    pub fn check(&self, op: Operation, subject: &str, window: Duration) -> Result<(), ApiError> {
        let now = self.clock.now();
        let key = (op, subject.to_string());
        let mut table = self.last_attempt.lock().unwrap();

        if let Some(last) = table.get(&key) {
            let elapsed = now - *last;
            if elapsed < window {
                let retry_after = (window - elapsed).num_seconds().max(0) as u64;
                return Err(ApiError::RateLimited {
                    retry_after_seconds: retry_after,
                });
            }
        }

        table.insert(key, now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::test_doubles::FixedClock;
    use std::sync::Arc;

    fn limiter_at(at: &str) -> (Arc<FixedClock>, RateLimiter) {
        let clock = Arc::new(FixedClock::new(at.parse().unwrap()));
        let limiter = RateLimiter::new(clock.clone());
        (clock, limiter)
    }

    #[test]
    fn first_attempt_always_allowed() {
        let (_clock, limiter) = limiter_at("2024-01-01T00:00:00Z");
        assert!(limiter
            .check(Operation::PhoneCodeSend, "account:1", Duration::minutes(1))
            .is_ok());
    }

    #[test]
    fn second_attempt_within_window_is_rejected() {
        let (_clock, limiter) = limiter_at("2024-01-01T00:00:00Z");
        limiter
            .check(Operation::PhoneCodeSend, "account:1", Duration::minutes(1))
            .unwrap();
        let err = limiter
            .check(Operation::PhoneCodeSend, "account:1", Duration::minutes(1))
            .unwrap_err();
        assert!(matches!(err, ApiError::RateLimited { .. }));
    }

    #[test]
    fn attempt_after_window_elapses_is_allowed() {
        let (clock, limiter) = limiter_at("2024-01-01T00:00:00Z");
        limiter
            .check(Operation::EmailVerificationResend, "account:1", Duration::minutes(5))
            .unwrap();
        clock.advance(Duration::minutes(5) + Duration::seconds(1));
        assert!(limiter
            .check(Operation::EmailVerificationResend, "account:1", Duration::minutes(5))
            .is_ok());
    }

    #[test]
    fn different_subjects_do_not_share_a_window() {
        let (_clock, limiter) = limiter_at("2024-01-01T00:00:00Z");
        limiter
            .check(Operation::PasswordResetRequest, "jane@x.io", Duration::minutes(5))
            .unwrap();
        assert!(limiter
            .check(Operation::PasswordResetRequest, "john@x.io", Duration::minutes(5))
            .is_ok());
    }

    #[test]
    fn different_operations_on_same_subject_do_not_share_a_window() {
        let (_clock, limiter) = limiter_at("2024-01-01T00:00:00Z");
        limiter
            .check(Operation::EmailVerificationResend, "account:1", Duration::minutes(5))
            .unwrap();
        assert!(limiter
            .check(Operation::PhoneCodeSend, "account:1", Duration::minutes(1))
            .is_ok());
    }
}
