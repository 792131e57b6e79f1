//! Token lifecycle engine.
//!
//! Owns token creation, the fixed-order validity check, and the terminal
//! disable/consume transitions. The engine is stateless: it operates on
//! [`Token`] handles fetched from the store and writes every mutation back
//! through the store's conditional updates.
//!
//! # Validity check order
//!
//! 1. already disabled → invalid, no side effect
//! 2. already consumed → invalid, no side effect
//! 3. expired → disable, invalid
//! 4. same-IP binding mismatch → disable, invalid
//! 5. same-browser binding mismatch → disable, invalid
//! 6. valid
//!
//! A failed check other than 1–2 permanently burns the token: one bad
//! verification attempt ends the link, there are no silent retries.

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::ip::anonymize_default;
use crate::providers::TokenStore;
use crate::request::RequestContext;
use crate::token::{Token, TokenId};
use chrono::{Duration, Utc};
use rand::Rng;

/// Length of the verification secret.
pub const SECRET_LENGTH: usize = 128;

/// Length of the browser-binding cookie value.
pub const COOKIE_LENGTH: usize = 64;

/// Alphabet for generated secrets: alphanumerics plus the URL-unreserved
/// punctuation, so secrets survive as path segments unescaped.
const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                abcdefghijklmnopqrstuvwxyz\
                                0123456789-._~";

/// Generate a random string of `len` chars over [`TOKEN_ALPHABET`].
///
/// `thread_rng` is a CSPRNG, so the output is suitable for bearer
/// secrets.
fn random_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_ALPHABET.len());
            TOKEN_ALPHABET[idx] as char
        })
        .collect()
}

/// Token lifecycle engine.
///
/// Generic over the [`TokenStore`] so the validity algorithm unit-tests
/// against the in-memory store at memory speed.
#[derive(Debug, Clone)]
pub struct TokenLifecycleEngine<S> {
    store: S,
    config: AuthConfig,
}

impl<S: TokenStore> TokenLifecycleEngine<S> {
    /// Create an engine over `store` with the given policy.
    #[must_use]
    pub const fn new(config: AuthConfig, store: S) -> Self {
        Self { store, config }
    }

    /// The policy this engine was constructed with.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create and persist a new token for `email`.
    ///
    /// The email is lower-cased here regardless of upstream handling.
    /// `ip_address` is the raw effective client address; anonymization is
    /// applied per policy before storage. The browser cookie value is
    /// generated only when same-browser binding is enabled.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidAddress`] if `ip_address` cannot be parsed
    ///   while anonymization is enabled
    /// - [`AuthError::Storage`] if the record cannot be persisted
    pub async fn create(
        &self,
        email: &str,
        redirect_url: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<Token> {
        let created_at = Utc::now();
        let expiry_date = created_at + Duration::seconds(self.lifetime_seconds());

        let ip_address = match ip_address {
            Some(addr) if self.config.anonymize_ip_address => Some(anonymize_default(addr)?),
            Some(addr) => Some(addr.to_string()),
            None => None,
        };

        let cookie_value = self
            .config
            .require_same_browser
            .then(|| random_string(COOKIE_LENGTH));

        let token = Token {
            id: TokenId::new(),
            email: email.to_lowercase(),
            secret: random_string(SECRET_LENGTH),
            redirect_url: redirect_url
                .unwrap_or(&self.config.default_redirect_url)
                .to_string(),
            ip_address,
            cookie_value,
            created_at,
            expiry_date,
            consumed_at: None,
            disabled_at: None,
        };

        self.store.insert(&token).await?;

        tracing::info!(
            token_id = %token.id,
            email = %token.email,
            expiry_date = %token.expiry_date,
            "Created login token"
        );

        Ok(token)
    }

    /// Fetch the token identified by `id` iff `secret` matches.
    ///
    /// An unknown id and a secret mismatch are deliberately
    /// indistinguishable: both report [`AuthError::TokenNotFound`], so the
    /// lookup cannot be used as a secret-guessing oracle. The comparison
    /// is full-length and constant-time.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenNotFound`] for unknown id or wrong secret
    /// - [`AuthError::Storage`] if the lookup fails
    pub async fn lookup_for_verification(&self, id: TokenId, secret: &str) -> Result<Token> {
        let token = self.store.get(id).await?.ok_or(AuthError::TokenNotFound)?;

        if constant_time_eq::constant_time_eq(secret.as_bytes(), token.secret.as_bytes()) {
            Ok(token)
        } else {
            Err(AuthError::TokenNotFound)
        }
    }

    /// Run the fixed-order validity check against a verification request.
    ///
    /// Returns `Ok(true)` when the token may authenticate. On an expiry,
    /// IP, or browser failure the token is disabled (persisted through the
    /// store) before `Ok(false)` is returned; a token that is already
    /// terminal is reported invalid without further effect. The specific
    /// rejection reason goes to logging only.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Storage`] if a disable transition cannot be
    ///   persisted; never reported as a verdict
    /// - [`AuthError::InvalidAddress`] if the request address cannot be
    ///   parsed while anonymization is enabled
    pub async fn is_valid(&self, token: &mut Token, ctx: &RequestContext) -> Result<bool> {
        match self.validate(token, ctx).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_token_rejection() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// As [`is_valid`](Self::is_valid), but reporting the rejection
    /// reason. Used by the verification orchestrator, which logs the
    /// reason and collapses it before it reaches the client.
    ///
    /// # Errors
    ///
    /// Rejection-class variants ([`AuthError::TokenDisabled`],
    /// [`AuthError::TokenConsumed`], [`AuthError::TokenExpired`],
    /// [`AuthError::ContextMismatch`]) describe the verdict;
    /// [`AuthError::Storage`] and [`AuthError::InvalidAddress`] propagate
    /// as in [`is_valid`](Self::is_valid).
    pub async fn validate(&self, token: &mut Token, ctx: &RequestContext) -> Result<()> {
        if token.is_disabled() {
            return Err(AuthError::TokenDisabled);
        }

        if token.is_consumed() {
            return Err(AuthError::TokenConsumed);
        }

        if token.is_expired(Utc::now()) {
            self.disable(token).await?;
            return Err(AuthError::TokenExpired);
        }

        if self.config.require_same_ip && !self.request_ip_matches(token, ctx)? {
            self.disable(token).await?;
            return Err(AuthError::ContextMismatch);
        }

        if self.config.require_same_browser && !self.request_cookie_matches(token, ctx) {
            self.disable(token).await?;
            return Err(AuthError::ContextMismatch);
        }

        Ok(())
    }

    /// Mark `token` consumed.
    ///
    /// Must only be called after a successful validity check. The store
    /// update is conditional on the token still being non-terminal, so of
    /// two concurrent verifications exactly one observes success here.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenConsumed`] if another request won the race (or
    ///   the token turned terminal in between)
    /// - [`AuthError::Storage`] if the update fails
    pub async fn consume(&self, token: &mut Token) -> Result<()> {
        let now = Utc::now();

        if !self.store.mark_consumed(token.id, now).await? {
            tracing::warn!(token_id = %token.id, "Lost consume race; token already terminal");
            return Err(AuthError::TokenConsumed);
        }

        token.consumed_at = Some(now);

        tracing::info!(token_id = %token.id, email = %token.email, "Token consumed");

        Ok(())
    }

    /// Mark `token` permanently disabled.
    ///
    /// Calling this twice is harmless; the second call is a no-op at the
    /// store and the first timestamp wins.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the update fails; the token must
    /// not be treated as disabled in that case.
    pub async fn disable(&self, token: &mut Token) -> Result<()> {
        let now = Utc::now();

        if self.store.mark_disabled(token.id, now).await? {
            token.disabled_at = Some(now);
            tracing::info!(token_id = %token.id, "Token disabled");
        } else if token.disabled_at.is_none() {
            // Another writer got there first; reflect terminality locally.
            token.disabled_at = Some(now);
        }

        Ok(())
    }

    fn request_ip_matches(&self, token: &Token, ctx: &RequestContext) -> Result<bool> {
        let Some(stored) = token.ip_address.as_deref() else {
            tracing::warn!(token_id = %token.id, "Same-IP binding required but token has no stored address");
            return Ok(false);
        };

        let Some(request_ip) = ctx.client_ip() else {
            tracing::warn!(token_id = %token.id, "Same-IP binding required but request has no address");
            return Ok(false);
        };

        let effective = if self.config.anonymize_ip_address {
            anonymize_default(&request_ip)?
        } else {
            request_ip
        };

        let matches = effective == stored;
        if !matches {
            tracing::warn!(token_id = %token.id, "Verification request IP does not match token");
        }

        Ok(matches)
    }

    fn request_cookie_matches(&self, token: &Token, ctx: &RequestContext) -> bool {
        let Some(stored) = token.cookie_value.as_deref() else {
            tracing::warn!(token_id = %token.id, "Same-browser binding required but token has no cookie value");
            return false;
        };

        let Some(presented) = ctx.cookie(&self.config.cookie_name) else {
            tracing::warn!(token_id = %token.id, "Verification request carries no browser cookie");
            return false;
        };

        let matches =
            constant_time_eq::constant_time_eq(presented.as_bytes(), stored.as_bytes());
        if !matches {
            tracing::warn!(token_id = %token.id, "Verification request cookie does not match token");
        }

        matches
    }

    #[allow(clippy::cast_possible_wrap)]
    fn lifetime_seconds(&self) -> i64 {
        self.config.max_token_lifetime as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::InMemoryTokenStore;

    fn engine(config: AuthConfig) -> TokenLifecycleEngine<InMemoryTokenStore> {
        TokenLifecycleEngine::new(config, InMemoryTokenStore::new())
    }

    #[test]
    fn test_random_string_length_and_alphabet() {
        let s = random_string(SECRET_LENGTH);
        assert_eq!(s.len(), SECRET_LENGTH);
        assert!(s.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));

        // Two draws must differ.
        assert_ne!(random_string(SECRET_LENGTH), random_string(SECRET_LENGTH));
    }

    #[tokio::test]
    async fn test_create_populates_the_record() {
        let engine = engine(AuthConfig::default());
        let token = engine
            .create("User@Example.COM", Some("/dashboard"), Some("192.168.178.1"))
            .await
            .unwrap();

        assert_eq!(token.email, "user@example.com");
        assert_eq!(token.secret.len(), SECRET_LENGTH);
        assert_eq!(token.redirect_url, "/dashboard");
        assert_eq!(token.ip_address.as_deref(), Some("192.168.178.1"));
        assert!(token.cookie_value.is_none());
        assert!(token.consumed_at.is_none());
        assert!(token.disabled_at.is_none());
    }

    #[tokio::test]
    async fn test_expiry_is_exactly_created_at_plus_lifetime() {
        let engine = engine(AuthConfig::default().with_max_token_lifetime(300));
        let token = engine.create("a@example.com", None, None).await.unwrap();

        assert_eq!(token.expiry_date, token.created_at + Duration::seconds(300));
    }

    #[tokio::test]
    async fn test_redirect_defaults_to_configured_url() {
        let engine = engine(AuthConfig::default().with_default_redirect_url("/home"));
        let token = engine.create("a@example.com", None, None).await.unwrap();
        assert_eq!(token.redirect_url, "/home");
    }

    #[tokio::test]
    async fn test_cookie_value_only_under_browser_binding() {
        let engine = engine(AuthConfig::default().with_require_same_browser(true));
        let token = engine.create("a@example.com", None, None).await.unwrap();

        let cookie = token.cookie_value.as_deref().unwrap();
        assert_eq!(cookie.len(), COOKIE_LENGTH);
        assert_ne!(cookie, token.secret);
    }

    #[tokio::test]
    async fn test_create_anonymizes_ip_per_policy() {
        let engine = engine(AuthConfig::default().with_anonymize_ip_address(true));
        let token = engine
            .create("a@example.com", None, Some("192.168.178.1"))
            .await
            .unwrap();

        assert_eq!(token.ip_address.as_deref(), Some("192.168.0.0"));
    }

    #[tokio::test]
    async fn test_create_rejects_garbage_ip_under_anonymization() {
        let engine = engine(AuthConfig::default().with_anonymize_ip_address(true));
        let result = engine.create("a@example.com", None, Some("not-an-ip")).await;
        assert!(matches!(result, Err(AuthError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_lookup_is_uniform_for_unknown_id_and_wrong_secret() {
        let engine = engine(AuthConfig::default());
        let token = engine.create("a@example.com", None, None).await.unwrap();

        let unknown_id = engine
            .lookup_for_verification(TokenId::new(), &token.secret)
            .await;
        let wrong_secret = engine
            .lookup_for_verification(token.id, "guessed-secret")
            .await;

        assert_eq!(unknown_id, Err(AuthError::TokenNotFound));
        assert_eq!(wrong_secret, Err(AuthError::TokenNotFound));
    }

    #[tokio::test]
    async fn test_lookup_returns_token_on_exact_secret() {
        let engine = engine(AuthConfig::default());
        let token = engine.create("a@example.com", None, None).await.unwrap();

        let found = engine
            .lookup_for_verification(token.id, &token.secret)
            .await
            .unwrap();
        assert_eq!(found.id, token.id);
    }

    #[tokio::test]
    async fn test_fresh_token_is_valid_under_default_context() {
        let engine = engine(AuthConfig::default());
        let mut token = engine.create("a@example.com", None, None).await.unwrap();

        assert!(engine.is_valid(&mut token, &RequestContext::new()).await.unwrap());
        assert!(token.disabled_at.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_disabled_on_check() {
        let engine = engine(AuthConfig::default().with_max_token_lifetime(0));
        let mut token = engine.create("a@example.com", None, None).await.unwrap();

        assert!(!engine.is_valid(&mut token, &RequestContext::new()).await.unwrap());
        assert!(token.is_disabled());

        // The disable was persisted, not just local.
        let stored = engine
            .lookup_for_verification(token.id, &token.secret)
            .await
            .unwrap();
        assert!(stored.disabled_at.is_some());
    }

    #[tokio::test]
    async fn test_consumed_token_never_validates_again() {
        let engine = engine(AuthConfig::default());
        let mut token = engine.create("a@example.com", None, None).await.unwrap();

        assert!(engine.is_valid(&mut token, &RequestContext::new()).await.unwrap());
        engine.consume(&mut token).await.unwrap();

        assert!(!engine.is_valid(&mut token, &RequestContext::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_disabled_token_is_invalid_irrespective_of_expiry() {
        let engine = engine(AuthConfig::default().with_max_token_lifetime(3600));
        let mut token = engine.create("a@example.com", None, None).await.unwrap();

        engine.disable(&mut token).await.unwrap();
        assert!(!engine.is_valid(&mut token, &RequestContext::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_consume_loses() {
        let engine = engine(AuthConfig::default());
        let mut token = engine.create("a@example.com", None, None).await.unwrap();

        engine.consume(&mut token).await.unwrap();
        let second = engine.consume(&mut token).await;
        assert_eq!(second, Err(AuthError::TokenConsumed));
    }

    #[tokio::test]
    async fn test_double_disable_is_harmless() {
        let engine = engine(AuthConfig::default());
        let mut token = engine.create("a@example.com", None, None).await.unwrap();

        engine.disable(&mut token).await.unwrap();
        let first = token.disabled_at;
        engine.disable(&mut token).await.unwrap();
        assert_eq!(token.disabled_at, first);
    }

    #[tokio::test]
    async fn test_same_ip_binding_round_trip_raw_policy() {
        let engine = engine(AuthConfig::default().with_require_same_ip(true));
        let mut token = engine
            .create("a@example.com", None, Some("203.0.113.7"))
            .await
            .unwrap();

        let same = RequestContext::new().with_remote_addr("203.0.113.7");
        assert!(engine.is_valid(&mut token, &same).await.unwrap());

        let mut other_token = engine
            .create("a@example.com", None, Some("203.0.113.7"))
            .await
            .unwrap();
        let other = RequestContext::new().with_remote_addr("203.0.113.8");
        assert!(!engine.is_valid(&mut other_token, &other).await.unwrap());
        assert!(other_token.is_disabled());
    }

    #[tokio::test]
    async fn test_anonymized_policy_accepts_the_shared_prefix() {
        let config = AuthConfig::default()
            .with_require_same_ip(true)
            .with_anonymize_ip_address(true);
        let engine = engine(config);

        // Different host, same /16.
        let mut token = engine
            .create("a@example.com", None, Some("192.168.178.1"))
            .await
            .unwrap();
        let same_net = RequestContext::new().with_remote_addr("192.168.4.200");
        assert!(engine.is_valid(&mut token, &same_net).await.unwrap());

        // Different /16 still fails.
        let mut token = engine
            .create("a@example.com", None, Some("192.168.178.1"))
            .await
            .unwrap();
        let other_net = RequestContext::new().with_remote_addr("192.169.0.1");
        assert!(!engine.is_valid(&mut token, &other_net).await.unwrap());
        assert!(token.is_disabled());
    }

    #[tokio::test]
    async fn test_ip_binding_honors_forwarded_for_last_hop() {
        let engine = engine(AuthConfig::default().with_require_same_ip(true));
        let mut token = engine
            .create("a@example.com", None, Some("172.16.0.9"))
            .await
            .unwrap();

        let ctx = RequestContext::new()
            .with_header("X-Forwarded-For", "203.0.113.7, 172.16.0.9")
            .with_remote_addr("10.0.0.1");
        assert!(engine.is_valid(&mut token, &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn test_ip_binding_fails_closed_without_stored_address() {
        let engine = engine(AuthConfig::default().with_require_same_ip(true));
        let mut token = engine.create("a@example.com", None, None).await.unwrap();

        let ctx = RequestContext::new().with_remote_addr("203.0.113.7");
        assert!(!engine.is_valid(&mut token, &ctx).await.unwrap());
        assert!(token.is_disabled());
    }

    #[tokio::test]
    async fn test_browser_binding_round_trip() {
        let config = AuthConfig::default().with_require_same_browser(true);
        let cookie_name = config.cookie_name.clone();
        let engine = engine(config);

        let mut token = engine.create("a@example.com", None, None).await.unwrap();
        let cookie = token.cookie_value.clone().unwrap();

        let same = RequestContext::new().with_cookie(cookie_name.clone(), cookie);
        assert!(engine.is_valid(&mut token, &same).await.unwrap());

        let mut other_token = engine.create("a@example.com", None, None).await.unwrap();
        let wrong = RequestContext::new().with_cookie(cookie_name, "forged-value");
        assert!(!engine.is_valid(&mut other_token, &wrong).await.unwrap());
        assert!(other_token.is_disabled());
    }

    #[tokio::test]
    async fn test_browser_binding_fails_closed_without_cookie() {
        let engine = engine(AuthConfig::default().with_require_same_browser(true));
        let mut token = engine.create("a@example.com", None, None).await.unwrap();

        assert!(!engine.is_valid(&mut token, &RequestContext::new()).await.unwrap());
        assert!(token.is_disabled());
    }

    #[tokio::test]
    async fn test_validate_reports_reasons_in_fixed_order() {
        let engine = engine(AuthConfig::default().with_max_token_lifetime(0));
        let mut token = engine.create("a@example.com", None, None).await.unwrap();

        // First check: expiry fires and disables.
        let verdict = engine.validate(&mut token, &RequestContext::new()).await;
        assert_eq!(verdict, Err(AuthError::TokenExpired));

        // Re-check: the terminal state now wins over expiry.
        let verdict = engine.validate(&mut token, &RequestContext::new()).await;
        assert_eq!(verdict, Err(AuthError::TokenDisabled));
    }
}
