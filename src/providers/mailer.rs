//! Mailer trait.
//!
//! The notification-dispatcher boundary: the core renders the verification
//! mail and hands it over fully formed; transport belongs to the
//! implementation.

use crate::error::Result;

/// Mailer.
///
/// Abstracts over email delivery (SMTP relay, API-based services, console
/// output in development).
pub trait Mailer: Send + Sync {
    /// Send one email.
    ///
    /// # Arguments
    ///
    /// - `to`: Recipient address
    /// - `subject`: Subject line
    /// - `text_body`: Plain-text body
    /// - `html_body`: HTML body
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::EmailDelivery`] if the message cannot
    /// be built or handed to the transport. Callers must not retry the
    /// login-request path automatically on failure.
    fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
