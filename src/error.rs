//! Error types for magic-link authentication operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the token lifecycle and verification flow.
///
/// Rejection-class variants (`TokenExpired`, `TokenConsumed`,
/// `TokenDisabled`, `ContextMismatch`) are internal: the verification
/// entry point collapses them into [`AuthError::InvalidToken`] before they
/// reach a caller, so the verifying client never learns *why* a token was
/// rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Token Rejection (internal reasons, collapsed for callers)
    // ═══════════════════════════════════════════════════════════

    /// No token matches the supplied id/secret pair.
    ///
    /// Deliberately indistinguishable from a secret mismatch.
    #[error("Token not found")]
    TokenNotFound,

    /// Token lifetime has elapsed.
    #[error("Token has expired")]
    TokenExpired,

    /// Token has already been used to authenticate.
    #[error("Token has already been consumed")]
    TokenConsumed,

    /// Token has been permanently disabled by a failed validity check.
    #[error("Token has been disabled")]
    TokenDisabled,

    /// The verifying request's IP or browser cookie does not match the
    /// one recorded at creation.
    #[error("Request context does not match token binding")]
    ContextMismatch,

    /// Generic caller-facing verification failure.
    #[error("Invalid token")]
    InvalidToken,

    // ═══════════════════════════════════════════════════════════
    // Caller Bugs
    // ═══════════════════════════════════════════════════════════

    /// Malformed IP address input.
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    // ═══════════════════════════════════════════════════════════
    // Collaborator Errors
    // ═══════════════════════════════════════════════════════════

    /// No account exists for the token's bound email.
    #[error("No user found for email")]
    UserNotFound,

    /// Token store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Token record could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Email dispatch failed.
    #[error("Failed to send email: {0}")]
    EmailDelivery(String),
}

impl AuthError {
    /// Returns `true` for rejection-class errors that the verification
    /// entry point collapses into [`AuthError::InvalidToken`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use sigil_auth::AuthError;
    /// assert!(AuthError::TokenExpired.is_token_rejection());
    /// assert!(!AuthError::Storage("down".into()).is_token_rejection());
    /// ```
    #[must_use]
    pub const fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            Self::TokenNotFound
                | Self::TokenExpired
                | Self::TokenConsumed
                | Self::TokenDisabled
                | Self::ContextMismatch
                | Self::InvalidToken
        )
    }

    /// Returns `true` if this error is due to invalid caller input rather
    /// than a system failure.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sigil_auth::AuthError;
    /// assert!(AuthError::InvalidAddress("nope".into()).is_user_error());
    /// assert!(!AuthError::Storage("down".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidAddress(_) | Self::InvalidToken)
    }
}
