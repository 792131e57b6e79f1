//! Mock mailer for testing.

use crate::error::{AuthError, Result};
use crate::providers::Mailer;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// One captured email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    /// Recipient address.
    pub to: String,

    /// Subject line.
    pub subject: String,

    /// Plain-text body.
    pub text_body: String,

    /// HTML body.
    pub html_body: String,
}

/// Mock mailer.
///
/// Captures sent mail instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockMailer {
    /// Create a new mock mailer that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail with
    /// [`AuthError::EmailDelivery`].
    pub fn fail_sends(&self, fail: bool) {
        if let Ok(mut guard) = self.fail.lock() {
            *guard = fail;
        }
    }

    /// All mail captured so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// The most recently captured mail.
    #[must_use]
    pub fn last(&self) -> Option<SentMail> {
        self.sent.lock().ok().and_then(|guard| guard.last().cloned())
    }
}

impl Mailer for MockMailer {
    fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        let sent = Arc::clone(&self.sent);
        let fail = Arc::clone(&self.fail);
        let mail = SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            text_body: text_body.to_string(),
            html_body: html_body.to_string(),
        };

        async move {
            let failing = fail
                .lock()
                .map(|guard| *guard)
                .map_err(|_| AuthError::EmailDelivery("mailer mutex poisoned".to_string()))?;

            if failing {
                return Err(AuthError::EmailDelivery("simulated failure".to_string()));
            }

            sent.lock()
                .map_err(|_| AuthError::EmailDelivery("mailer mutex poisoned".to_string()))?
                .push(mail);

            Ok(())
        }
    }
}
