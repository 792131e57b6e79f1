//! External collaborator interfaces.
//!
//! Traits for everything the token lifecycle depends on but does not own:
//! durable token storage, email dispatch, the user directory, and the
//! hosting session layer. The engine and the authenticator depend on these
//! traits; deployments provide concrete implementations, tests provide
//! mocks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod console_mailer;
pub mod mailer;
pub mod session;
pub mod smtp_mailer;
pub mod token_store;
pub mod user_directory;

pub use console_mailer::ConsoleMailer;
pub use mailer::Mailer;
pub use session::SessionGateway;
pub use smtp_mailer::SmtpMailer;
pub use token_store::TokenStore;
pub use user_directory::UserDirectory;

/// Unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// User account record, as surfaced by the [`UserDirectory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Account ID.
    pub user_id: UserId,

    /// Email address.
    pub email: String,

    /// Display name.
    pub name: Option<String>,

    /// Deactivated accounts must not authenticate.
    pub is_active: bool,

    /// Account created timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Construct an active user with the given email.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(),
            email: email.into(),
            name: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
