//! User directory trait.

use crate::error::Result;
use super::User;

/// User directory.
///
/// Read-only lookup against the account system. The core never creates
/// accounts; signup lives elsewhere.
pub trait UserDirectory: Send + Sync {
    /// Find the account registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Directory query fails
    /// - No matching account → [`crate::AuthError::UserNotFound`]
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<User>> + Send;
}
