//! Request context.
//!
//! The small explicit value the hosting layer hands to the core at
//! creation and verification time. Exactly three things are consulted:
//! headers, the peer address, and cookies.

use std::collections::HashMap;

/// Client-request context.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Request headers. Looked up case-insensitively.
    pub headers: HashMap<String, String>,

    /// Directly observed peer address, if any.
    pub remote_addr: Option<String>,

    /// Request cookies by name.
    pub cookies: HashMap<String, String>,
}

impl RequestContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the peer address.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Set a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Look up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The effective client IP address of this request.
    ///
    /// Prefers the last entry of the `X-Forwarded-For` chain (the hop
    /// closest to the trusted edge) and falls back to the peer address.
    /// Returns `None` when neither is available. Performs no
    /// anonymization; callers apply [`crate::ip::anonymize`] explicitly so
    /// the policy is evaluated identically at creation and verification.
    #[must_use]
    pub fn client_ip(&self) -> Option<String> {
        if let Some(forwarded) = self.header("x-forwarded-for") {
            if let Some(last) = forwarded.rsplit(',').next() {
                let last = last.trim();
                if !last.is_empty() {
                    return Some(last.to_string());
                }
            }
        }

        self.remote_addr
            .as_deref()
            .filter(|addr| !addr.is_empty())
            .map(ToString::to_string)
    }

    /// Look up a cookie value by name.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_for_prefers_last_hop() {
        let ctx = RequestContext::new()
            .with_header("X-Forwarded-For", "203.0.113.7, 10.0.0.2, 172.16.0.9")
            .with_remote_addr("127.0.0.1");

        assert_eq!(ctx.client_ip().as_deref(), Some("172.16.0.9"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let ctx = RequestContext::new().with_header("X-FORWARDED-FOR", "198.51.100.4");
        assert_eq!(ctx.client_ip().as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_falls_back_to_remote_addr() {
        let ctx = RequestContext::new().with_remote_addr("192.0.2.17");
        assert_eq!(ctx.client_ip().as_deref(), Some("192.0.2.17"));
    }

    #[test]
    fn test_no_address_available() {
        assert_eq!(RequestContext::new().client_ip(), None);

        let ctx = RequestContext::new().with_header("x-forwarded-for", "  ,  ");
        assert_eq!(ctx.client_ip(), None);
    }

    #[test]
    fn test_cookie_lookup() {
        let ctx = RequestContext::new().with_cookie("sigil_browser", "abc123");
        assert_eq!(ctx.cookie("sigil_browser"), Some("abc123"));
        assert_eq!(ctx.cookie("other"), None);
    }
}
