//! Authentication configuration.
//!
//! Configuration is an explicit value handed to the lifecycle engine and
//! the authenticator at construction time, never read from ambient global
//! state. This keeps policy deterministic under test.

/// Magic-link authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL for verification links (e.g., "https://app.example.com").
    ///
    /// Links are formatted as: `{base_url}/verify/{id}/{secret}/`
    pub base_url: String,

    /// Token lifetime in seconds.
    ///
    /// Default: 300 (5 minutes)
    pub max_token_lifetime: u64,

    /// Require the verifying request to originate from the same IP
    /// address (or the same network prefix, under
    /// [`anonymize_ip_address`](Self::anonymize_ip_address)) as the
    /// login request.
    pub require_same_ip: bool,

    /// Require the verifying request to present the browser cookie set
    /// when the link was dispatched.
    pub require_same_browser: bool,

    /// Store and compare IP addresses as network prefixes (/16 for IPv4,
    /// /64 for IPv6) instead of full addresses.
    ///
    /// Default: false
    pub anonymize_ip_address: bool,

    /// Name of the browser-binding cookie.
    pub cookie_name: String,

    /// Destination after successful verification when the login request
    /// did not supply one.
    pub default_redirect_url: String,
}

impl AuthConfig {
    /// Create a new configuration with default policy.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for your application (e.g., "https://app.example.com")
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the token lifetime in seconds.
    #[must_use]
    pub const fn with_max_token_lifetime(mut self, seconds: u64) -> Self {
        self.max_token_lifetime = seconds;
        self
    }

    /// Enable or disable same-IP binding.
    #[must_use]
    pub const fn with_require_same_ip(mut self, required: bool) -> Self {
        self.require_same_ip = required;
        self
    }

    /// Enable or disable same-browser binding.
    #[must_use]
    pub const fn with_require_same_browser(mut self, required: bool) -> Self {
        self.require_same_browser = required;
        self
    }

    /// Enable or disable IP anonymization.
    #[must_use]
    pub const fn with_anonymize_ip_address(mut self, anonymize: bool) -> Self {
        self.anonymize_ip_address = anonymize;
        self
    }

    /// Set the browser-binding cookie name.
    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the default post-verification redirect.
    #[must_use]
    pub fn with_default_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.default_redirect_url = url.into();
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            max_token_lifetime: 300,
            require_same_ip: false,
            require_same_browser: false,
            anonymize_ip_address: false,
            cookie_name: "sigil_browser".to_string(),
            default_redirect_url: "/".to_string(),
        }
    }
}
