//! The token entity.
//!
//! A [`Token`] is the single-use credential record binding an email to a
//! secret, an expiry, and optional client-context constraints. It is plain
//! data: all transitions are performed by the lifecycle engine through the
//! token store, never by the entity itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a token.
///
/// Opaque, assigned at creation, and safe to expose in URLs; it carries no
/// secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub uuid::Uuid);

impl TokenId {
    /// Generate a new random `TokenId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for TokenId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}

/// Single-use magic-link token.
///
/// All fields except `consumed_at` and `disabled_at` are fixed at creation.
/// The two terminal timestamps each transition from `None` to `Some`
/// exactly once, via the store's conditional updates.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Public lookup key.
    pub id: TokenId,

    /// Lower-cased email address this token authenticates.
    pub email: String,

    /// High-entropy random string accompanying the id in the
    /// verification link. Compared in full, constant-time, by the
    /// lifecycle engine.
    pub secret: String,

    /// Destination after successful verification.
    pub redirect_url: String,

    /// Requester IP at creation time, anonymized per policy.
    ///
    /// `None` when the login request carried no usable address.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ip_address: Option<String>,

    /// Browser-binding cookie value.
    ///
    /// Present only when same-browser binding was enabled at creation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cookie_value: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// `created_at` plus the configured lifetime.
    pub expiry_date: DateTime<Utc>,

    /// Set once, when the token successfully authenticates.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub consumed_at: Option<DateTime<Utc>>,

    /// Set once, when the token fails a validity check.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub disabled_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Whether the token has been used to authenticate.
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Whether the token has been permanently disabled.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled_at.is_some()
    }

    /// Whether the token's lifetime has elapsed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }
}

// Manual Debug: the secret and the cookie value must never reach logs.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .field("ip_address", &self.ip_address)
            .field(
                "cookie_value",
                &self.cookie_value.as_ref().map(|_| "<redacted>"),
            )
            .field("created_at", &self.created_at)
            .field("expiry_date", &self.expiry_date)
            .field("consumed_at", &self.consumed_at)
            .field("disabled_at", &self.disabled_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_token() -> Token {
        let now = Utc::now();
        Token {
            id: TokenId::new(),
            email: "user@example.com".to_string(),
            secret: "s3cr3t-material".to_string(),
            redirect_url: "/".to_string(),
            ip_address: Some("192.168.0.0".to_string()),
            cookie_value: Some("cookie-material".to_string()),
            created_at: now,
            expiry_date: now + Duration::seconds(300),
            consumed_at: None,
            disabled_at: None,
        }
    }

    #[test]
    fn test_token_id_round_trips_through_display() {
        let id = TokenId::new();
        let parsed: TokenId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_fresh_token_is_neither_consumed_nor_disabled() {
        let token = sample_token();
        assert!(!token.is_consumed());
        assert!(!token.is_disabled());
        assert!(!token.is_expired(Utc::now()));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let token = sample_token();
        assert!(!token.is_expired(token.expiry_date));
        assert!(token.is_expired(token.expiry_date + Duration::seconds(1)));
    }

    #[test]
    fn test_debug_redacts_secret_material() {
        let token = sample_token();
        let debug = format!("{token:?}");
        assert!(!debug.contains("s3cr3t-material"));
        assert!(!debug.contains("cookie-material"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("user@example.com"));
    }

    #[test]
    fn test_serialized_record_omits_unset_terminal_fields() {
        let token = sample_token();
        let json = serde_json::to_value(&token).unwrap();
        assert!(json.get("consumed_at").is_none());
        assert!(json.get("disabled_at").is_none());

        let mut consumed = sample_token();
        consumed.consumed_at = Some(Utc::now());
        let json = serde_json::to_value(&consumed).unwrap();
        assert!(json.get("consumed_at").is_some());
    }
}
