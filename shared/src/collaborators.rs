//! # External Collaborators
//!
//! Trait boundaries around the three systems the account core depends on but
//! does not own: outbound mail, outbound SMS, and wall-clock time. Service
//! code is written against these traits so tests can swap in deterministic
//! doubles instead of hitting the network or the system clock.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::collaborators::{Mailer, WebhookMailer};
//!
//! let mailer: Arc<dyn Mailer> = Arc::new(WebhookMailer::new(config.delivery.mail_webhook_url.clone()));
//! mailer.send_verification("jane@x.io", "Jane", &url).await;
//! ```
//!
//! `Mailer` and `SMSGateway` report delivery success as `bool` rather than
//! `Result` — a failed send is logged by the collaborator itself and never
//! rolls back the transaction that already committed the verification row
//! (delivery is best-effort by design).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

// =============================================================================
// Clock
// =============================================================================

/// Wall-clock time, injected so rate limiting and expiry checks are
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// Mailer
// =============================================================================

/// Sends the two mail-backed challenges the core issues links for.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the email-verification link; `url` embeds the opaque token.
    async fn send_verification(&self, to: &str, first_name: &str, url: &str) -> bool;

    /// Sends the password-reset link; `url` embeds the signed reset token.
    async fn send_reset(&self, to: &str, first_name: &str, url: &str) -> bool;
}

/// Best-effort email sink: logs the send, and if a webhook URL is
/// configured, POSTs the payload to it. A webhook failure is logged and
/// reported as `false`; it never rolls back the transaction that already
/// committed the verification/reset row.
pub struct WebhookMailer {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl WebhookMailer {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, kind: &str, to: &str, first_name: &str, url: &str) -> bool {
        tracing::info!(to, kind, "sending email");
        let Some(webhook) = &self.webhook_url else {
            return true;
        };
        let body = serde_json::json!({ "to": to, "firstName": first_name, "url": url, "kind": kind });
        match self.client.post(webhook).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "mail webhook returned non-success");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "mail webhook request failed");
                false
            }
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send_verification(&self, to: &str, first_name: &str, url: &str) -> bool {
        self.post("email_verification", to, first_name, url).await
    }

    async fn send_reset(&self, to: &str, first_name: &str, url: &str) -> bool {
        self.post("password_reset", to, first_name, url).await
    }
}

// =============================================================================
// SMS Gateway
// =============================================================================

/// Sends a pre-formatted message (carrying the 6-digit code) to a number.
#[async_trait]
pub trait SMSGateway: Send + Sync {
    async fn send(&self, to: &str, carrier_hint: Option<&str>, message: &str) -> bool;
}

/// Best-effort SMS sink, mirroring [`WebhookMailer`].
pub struct WebhookSMSGateway {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl WebhookSMSGateway {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SMSGateway for WebhookSMSGateway {
    async fn send(&self, to: &str, carrier_hint: Option<&str>, message: &str) -> bool {
        tracing::info!(to, carrier_hint, "sending sms");
        let Some(url) = &self.webhook_url else {
            return true;
        };
        let body = serde_json::json!({ "to": to, "carrier": carrier_hint, "message": message });
        match self.client.post(url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "sms webhook returned non-success");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "sms webhook request failed");
                false
            }
        }
    }
}

#[cfg(test)]
pub mod test_doubles {
    use super::*;
    use std::sync::Mutex;

    /// Deterministic clock for tests, advanced manually.
    pub struct FixedClock(pub Mutex<DateTime<Utc>>);

    impl FixedClock {
        pub fn new(at: DateTime<Utc>) -> Self {
            Self(Mutex::new(at))
        }

        pub fn advance(&self, delta: chrono::Duration) {
            let mut guard = self.0.lock().unwrap();
            *guard = *guard + delta;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Records every call instead of sending anything. `kind` is either
    /// `"verification"` or `"reset"`.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_verification(&self, to: &str, first_name: &str, url: &str) -> bool {
            self.sent.lock().unwrap().push((
                "verification".to_string(),
                to.to_string(),
                format!("{first_name}:{url}"),
            ));
            true
        }

        async fn send_reset(&self, to: &str, first_name: &str, url: &str) -> bool {
            self.sent.lock().unwrap().push((
                "reset".to_string(),
                to.to_string(),
                format!("{first_name}:{url}"),
            ));
            true
        }
    }

    #[derive(Default)]
    pub struct RecordingSMSGateway {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SMSGateway for RecordingSMSGateway {
        async fn send(&self, to: &str, _carrier_hint: Option<&str>, message: &str) -> bool {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), message.to_string()));
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_doubles::*;
    use super::*;

    #[tokio::test]
    async fn recording_mailer_captures_sends() {
        let mailer = RecordingMailer::default();
        assert!(
            mailer
                .send_verification("jane@x.io", "Jane", "https://x.io/verify?token=abc")
                .await
        );
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "verification");
        assert_eq!(sent[0].1, "jane@x.io");
    }

    #[test]
    fn fixed_clock_advances_deterministically() {
        let start: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(chrono::Duration::minutes(5));
        assert_eq!(clock.now(), start + chrono::Duration::minutes(5));
    }
}
