//! Session gateway trait.

use crate::error::Result;
use super::User;

/// Session gateway.
///
/// The single thing the core asks of the hosting session layer: mark the
/// current abstract session as authenticated for a user. Session storage,
/// expiry, and transport (cookies, JWTs) are the host's business.
pub trait SessionGateway: Send + Sync {
    /// Establish an authenticated session for `user`.
    ///
    /// # Errors
    ///
    /// Returns error if the session layer rejects the login.
    fn establish(&self, user: &User) -> impl std::future::Future<Output = Result<()>> + Send;
}
