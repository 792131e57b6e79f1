//! Token store trait.
//!
//! Durable storage for [`Token`] records, keyed by [`TokenId`]. The store
//! owns the persisted representation; the lifecycle engine operates on an
//! in-memory handle and writes mutations back through the conditional
//! transition methods.

use crate::error::Result;
use crate::token::{Token, TokenId};
use chrono::{DateTime, Utc};

/// Token store.
///
/// # Implementation Notes
///
/// - Records are never deleted by the core; retention is an operational
///   concern of the deployment.
/// - **CRITICAL**: `mark_consumed` MUST be an atomic conditional update
///   ("set `consumed_at` where both terminal timestamps are unset"). Two
///   near-simultaneous verifications of the same token must observe
///   exactly one `true` result between them.
/// - `mark_disabled` is conditional on `disabled_at` being unset; a second
///   call is a harmless no-op reporting `false`.
/// - A transition reported as `true` must be durably persisted before the
///   call returns; a partial write is an error, not a success.
pub trait TokenStore: Send + Sync {
    /// Persist a freshly created token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::Storage`] if the record cannot be
    /// persisted.
    fn insert(&self, token: &Token) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fetch a token by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::Storage`] if the lookup fails. A
    /// missing record is `Ok(None)`, not an error.
    fn get(&self, id: TokenId) -> impl std::future::Future<Output = Result<Option<Token>>> + Send;

    /// Atomically set `consumed_at = at` iff both `consumed_at` and
    /// `disabled_at` are unset.
    ///
    /// # Returns
    ///
    /// `true` iff this call performed the transition. `false` means the
    /// token was already terminal (or does not exist): the caller lost
    /// the race.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::Storage`] if the update fails.
    fn mark_consumed(
        &self,
        id: TokenId,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Atomically set `disabled_at = at` iff `disabled_at` is unset.
    ///
    /// # Returns
    ///
    /// `true` iff this call performed the transition.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::Storage`] if the update fails.
    fn mark_disabled(
        &self,
        id: TokenId,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}
