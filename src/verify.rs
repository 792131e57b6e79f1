//! Verification orchestrator.
//!
//! The only consumer-facing entry points into the core from the routing
//! layer: [`Authenticator::request_login`] dispatches a magic link,
//! [`Authenticator::verify`] turns a visited link into an authenticated
//! session.

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::lifecycle::TokenLifecycleEngine;
use crate::mail::VerificationMail;
use crate::providers::{Mailer, SessionGateway, TokenStore, User, UserDirectory};
use crate::request::RequestContext;
use crate::token::{Token, TokenId};

/// Browser-binding cookie for the routing layer to set on the
/// link-dispatch response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCookie {
    /// Cookie name, from [`AuthConfig::cookie_name`].
    pub name: String,

    /// The token's cookie value.
    pub value: String,

    /// Minimum cookie lifetime in seconds. Never shorter than the token
    /// lifetime: binding is meaningless if the cookie dies first.
    pub max_age: u64,
}

/// Result of a successful login request.
#[derive(Debug, Clone)]
pub struct LoginReceipt {
    /// Id of the created token.
    pub token_id: TokenId,

    /// Cookie to set when same-browser binding is enabled.
    pub browser_cookie: Option<BrowserCookie>,
}

/// Result of a successful verification.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// The resolved account.
    pub user: User,

    /// The email the token was bound to.
    pub email: String,

    /// Where to send the user next.
    pub redirect_url: String,
}

/// Verification orchestrator.
///
/// Thin coordinator over the lifecycle engine and the external
/// collaborators: mailer, user directory, session gateway.
#[derive(Debug, Clone)]
pub struct Authenticator<S, M, U, G> {
    engine: TokenLifecycleEngine<S>,
    mailer: M,
    users: U,
    sessions: G,
}

impl<S, M, U, G> Authenticator<S, M, U, G>
where
    S: TokenStore,
    M: Mailer,
    U: UserDirectory,
    G: SessionGateway,
{
    /// Create an authenticator.
    #[must_use]
    pub const fn new(config: AuthConfig, store: S, mailer: M, users: U, sessions: G) -> Self {
        Self {
            engine: TokenLifecycleEngine::new(config, store),
            mailer,
            users,
            sessions,
        }
    }

    /// The lifecycle engine, for callers that need direct token access.
    #[must_use]
    pub const fn engine(&self) -> &TokenLifecycleEngine<S> {
        &self.engine
    }

    /// Handle a login request: create a token for `email` and dispatch
    /// the verification link.
    ///
    /// The user directory is deliberately not consulted, and the receipt
    /// shape does not depend on whether an account exists: the caller
    /// renders the same "check your email" confirmation either way, so
    /// responses cannot be used to enumerate accounts.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Storage`] if the token cannot be persisted
    /// - [`AuthError::EmailDelivery`] if dispatch fails; the caller must
    ///   surface a generic failure and not retry automatically (retries
    ///   mean duplicate emails)
    /// - [`AuthError::InvalidAddress`] if the request address cannot be
    ///   parsed while anonymization is enabled
    pub async fn request_login(
        &self,
        email: &str,
        redirect_url: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<LoginReceipt> {
        let ip = ctx.client_ip();
        let token = self
            .engine
            .create(email, redirect_url, ip.as_deref())
            .await?;

        let mail = VerificationMail::new(self.verify_url(&token), token.expiry_date);
        self.mailer
            .send(
                &token.email,
                &mail.subject(),
                &mail.text_body(),
                &mail.html_body(),
            )
            .await?;

        tracing::info!(token_id = %token.id, "Verification link dispatched");

        let browser_cookie = token.cookie_value.clone().map(|value| BrowserCookie {
            name: self.engine.config().cookie_name.clone(),
            value,
            max_age: self.engine.config().max_token_lifetime,
        });

        Ok(LoginReceipt {
            token_id: token.id,
            browser_cookie,
        })
    }

    /// Verify a visited link and establish a session.
    ///
    /// Looks the token up, runs the validity check, consumes the token,
    /// resolves the bound email to an account, and asks the session
    /// gateway to log it in. Validate-then-consume is serialized by the
    /// store's conditional update: of two concurrent calls on the same
    /// token, exactly one returns `Authenticated`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] for every token-rejection reason
    ///   (unknown id, wrong secret, expired, already used, disabled,
    ///   binding mismatch, lost race); the distinction is logged, never
    ///   returned
    /// - [`AuthError::UserNotFound`] if no active account matches the
    ///   bound email; the caller decides how to surface it
    /// - [`AuthError::Storage`] if the store fails
    pub async fn verify(
        &self,
        id: TokenId,
        secret: &str,
        ctx: &RequestContext,
    ) -> Result<Authenticated> {
        let mut token = match self.engine.lookup_for_verification(id, secret).await {
            Ok(token) => token,
            Err(err) => return Err(Self::collapse(id, err)),
        };

        if let Err(err) = self.engine.validate(&mut token, ctx).await {
            return Err(Self::collapse(id, err));
        }

        if let Err(err) = self.engine.consume(&mut token).await {
            return Err(Self::collapse(id, err));
        }

        let user = self.users.find_by_email(&token.email).await?;
        if !user.is_active {
            tracing::warn!(token_id = %id, "Account is deactivated");
            return Err(AuthError::UserNotFound);
        }

        self.sessions.establish(&user).await?;

        tracing::info!(token_id = %id, email = %token.email, "Login verified");

        Ok(Authenticated {
            email: token.email.clone(),
            redirect_url: token.redirect_url.clone(),
            user,
        })
    }

    /// The verification link for `token`: `{base}/verify/{id}/{secret}/`.
    ///
    /// Both parts travel as path segments, not query parameters, to keep
    /// the secret out of typical query-string logging.
    #[must_use]
    pub fn verify_url(&self, token: &Token) -> String {
        let base = self.engine.config().base_url.trim_end_matches('/');
        format!("{base}/verify/{}/{}/", token.id, token.secret)
    }

    /// Collapse a rejection-class error into the generic caller-facing
    /// outcome, logging the real reason.
    fn collapse(id: TokenId, err: AuthError) -> AuthError {
        if err.is_token_rejection() {
            tracing::warn!(token_id = %id, reason = %err, "Verification rejected");
            AuthError::InvalidToken
        } else {
            err
        }
    }
}
