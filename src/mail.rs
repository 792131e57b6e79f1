//! Verification mail rendering.
//!
//! The core assembles the template context (verification URL, expiry) and
//! renders the message here; transport stays behind the
//! [`Mailer`](crate::providers::Mailer) trait.

use chrono::{DateTime, Utc};

/// Rendered context for one verification mail.
#[derive(Debug, Clone)]
pub struct VerificationMail {
    /// The full magic link.
    pub verify_url: String,

    /// When the link stops working.
    pub expiry_date: DateTime<Utc>,
}

impl VerificationMail {
    /// Create a mail context.
    #[must_use]
    pub const fn new(verify_url: String, expiry_date: DateTime<Utc>) -> Self {
        Self {
            verify_url,
            expiry_date,
        }
    }

    /// Minutes until the link expires, floored at zero.
    #[must_use]
    pub fn expires_in_minutes(&self) -> i64 {
        (self.expiry_date - Utc::now()).num_minutes().max(0)
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        "Sign in to your account".to_string()
    }

    /// Plain-text body.
    #[must_use]
    pub fn text_body(&self) -> String {
        format!(
            "Click the link below to sign in to your account.\n\
             This link can be used once and expires in {} minutes.\n\
             \n\
             {}\n\
             \n\
             If you didn't request this email, you can safely ignore it.\n",
            self.expires_in_minutes(),
            self.verify_url,
        )
    }

    /// HTML body.
    #[must_use]
    pub fn html_body(&self) -> String {
        let verify_url = &self.verify_url;
        let expires_minutes = self.expires_in_minutes();

        format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Sign in to your account</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Sign in to your account</h2>
        <p>Click the link below to sign in to your account. This link can be used once and expires in {expires_minutes} minutes.</p>
        <p style="margin: 30px 0;">
            <a href="{verify_url}"
               style="display: inline-block; background-color: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">
                Sign In
            </a>
        </p>
        <p style="color: #666; font-size: 14px;">
            If you didn't request this email, you can safely ignore it.
        </p>
        <p style="color: #666; font-size: 12px; margin-top: 40px;">
            Or copy and paste this link into your browser:<br>
            {verify_url}
        </p>
    </div>
</body>
</html>
            "#
        )
    }
}
