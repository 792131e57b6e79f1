//! SMTP mailer implementation using Lettre.

use crate::error::{AuthError, Result};
use crate::providers::Mailer;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::future::Future;

/// SMTP mailer using Lettre.
///
/// Sends real email via an SMTP relay, suitable for production use.
///
/// # Examples
///
/// ```ignore
/// use sigil_auth::providers::SmtpMailer;
///
/// let mailer = SmtpMailer::new(
///     "smtp.example.com".to_string(),
///     587,
///     "noreply@example.com".to_string(),
///     "app_password".to_string(),
///     "noreply@example.com".to_string(),
///     "Example App".to_string(),
/// );
/// ```
#[derive(Clone)]
pub struct SmtpMailer {
    /// SMTP server address.
    smtp_server: String,

    /// SMTP server port.
    smtp_port: u16,

    /// SMTP credentials.
    credentials: Credentials,

    /// Sender email address.
    from_email: String,

    /// Sender display name.
    from_name: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer.
    ///
    /// # Arguments
    ///
    /// - `smtp_server`: SMTP server address
    /// - `smtp_port`: SMTP server port (usually 587 for TLS)
    /// - `smtp_username`: SMTP authentication username
    /// - `smtp_password`: SMTP authentication password
    /// - `from_email`: Sender email address
    /// - `from_name`: Sender display name
    #[must_use]
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        let credentials = Credentials::new(smtp_username, smtp_password);

        Self {
            smtp_server,
            smtp_port,
            credentials,
            from_email,
            from_name,
        }
    }

    /// Build an SMTP transport.
    ///
    /// A fresh transport per send avoids connection-pooling staleness.
    fn build_transport(&self) -> Result<SmtpTransport> {
        let transport = SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| AuthError::EmailDelivery(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build();

        Ok(transport)
    }

    /// Build the "From" header.
    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

impl Mailer for SmtpMailer {
    fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        let this = self.clone();
        let to = to.to_string();
        let subject = subject.to_string();
        let text_body = text_body.to_string();
        let html_body = html_body.to_string();

        async move {
            let message = Message::builder()
                .from(this.from_header().parse().map_err(|e| {
                    AuthError::EmailDelivery(format!("Invalid from address: {e}"))
                })?)
                .to(to
                    .parse()
                    .map_err(|e| AuthError::EmailDelivery(format!("Invalid to address: {e}")))?)
                .subject(subject)
                .multipart(MultiPart::alternative_plain_html(text_body, html_body))
                .map_err(|e| AuthError::EmailDelivery(format!("Failed to build email: {e}")))?;

            let transport = this.build_transport()?;

            tokio::task::spawn_blocking(move || {
                transport
                    .send(&message)
                    .map_err(|e| AuthError::EmailDelivery(format!("Failed to send email: {e}")))
            })
            .await
            .map_err(|e| AuthError::EmailDelivery(format!("Email task failed: {e}")))?
            .map(|_| ())
        }
    }
}
