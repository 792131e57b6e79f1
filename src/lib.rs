//! # Sigil: Magic-Link Authentication
//!
//! This crate issues and validates single-use, time-limited authentication
//! tokens ("magic links") that let a user authenticate by email possession
//! rather than a password.
//!
//! ## Features
//!
//! - **Single-use tokens**: atomic consume, no replay
//! - **Time-limited**: expired links disable themselves on first use
//! - **Client binding**: optional same-IP and same-browser checks, with
//!   prefix-level IP anonymization
//! - **Pluggable**: storage, mail transport, user directory, and session
//!   layer are traits
//! - **Testable**: the whole flow runs at memory speed against mocks
//!
//! ## Flow
//!
//! ```text
//! request_login(email) → Token created → mail dispatched
//! user visits {base}/verify/{id}/{secret}/
//! verify(id, secret, ctx) → validity check → consume → session established
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sigil_auth::{AuthConfig, Authenticator, RequestContext};
//! use sigil_auth::mocks::{MockMailer, MockSessionGateway, MockUserDirectory};
//! use sigil_auth::providers::User;
//! use sigil_auth::stores::InMemoryTokenStore;
//!
//! # async fn example() -> sigil_auth::Result<()> {
//! let users = MockUserDirectory::new();
//! users.add_user(User::new("a@example.com"));
//!
//! let auth = Authenticator::new(
//!     AuthConfig::new("https://app.example.com"),
//!     InMemoryTokenStore::new(),
//!     MockMailer::new(),
//!     users,
//!     MockSessionGateway::new(),
//! );
//!
//! let ctx = RequestContext::new().with_remote_addr("203.0.113.7");
//! let receipt = auth.request_login("a@example.com", None, &ctx).await?;
//! # let _ = receipt;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod error;
pub mod ip;
pub mod lifecycle;
pub mod mail;
pub mod providers;
pub mod request;
pub mod stores;
pub mod token;
pub mod verify;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use config::AuthConfig;
pub use error::{AuthError, Result};
pub use lifecycle::TokenLifecycleEngine;
pub use request::RequestContext;
pub use token::{Token, TokenId};
pub use verify::{Authenticated, Authenticator, BrowserCookie, LoginReceipt};
