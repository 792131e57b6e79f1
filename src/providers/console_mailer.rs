//! Console mailer for development and testing.

use crate::error::Result;
use crate::providers::Mailer;
use std::future::Future;
use tracing::info;

/// Console mailer.
///
/// Logs mail to the console instead of sending it. Useful for development
/// where you don't want to deliver real email.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Create a new console mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Mailer for ConsoleMailer {
    fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        _html_body: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        let to = to.to_string();
        let subject = subject.to_string();
        let text_body = text_body.to_string();

        async move {
            info!(to = %to, subject = %subject, "📧 Email (Development Mode)");

            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║ To: {to:<57}║");
            println!("║ Subject: {subject:<52}║");
            println!("╠══════════════════════════════════════════════════════════════╣");
            for line in text_body.lines() {
                println!("║ {line:<61}║");
            }
            println!("╚══════════════════════════════════════════════════════════════╝\n");

            Ok(())
        }
    }
}
