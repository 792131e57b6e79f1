//! Mock providers for testing.
//!
//! Deterministic in-memory doubles for every collaborator trait. The
//! in-memory token store ([`crate::stores::InMemoryTokenStore`]) doubles
//! as the store mock.

pub mod mailer;
pub mod session;
pub mod user_directory;

pub use mailer::{MockMailer, SentMail};
pub use session::MockSessionGateway;
pub use user_directory::MockUserDirectory;
