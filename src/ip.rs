//! IP address anonymization.
//!
//! Replaces an address with its containing network prefix at a configured
//! bit length, for storage and comparison. Pure; no state.

use crate::error::{AuthError, Result};
use ipnet::{Ipv4Net, Ipv6Net};
use std::net::IpAddr;

/// Default IPv4 prefix length used for anonymization.
pub const DEFAULT_IPV4_PREFIX_BITS: u8 = 16;

/// Default IPv6 prefix length used for anonymization.
pub const DEFAULT_IPV6_PREFIX_BITS: u8 = 64;

/// Truncate `address` to the network address of its containing prefix.
///
/// Non-network-aligned input is permitted and rounds down to its
/// containing network. The result is rendered in canonical textual form.
///
/// # Examples
///
/// ```
/// # use sigil_auth::ip::anonymize;
/// assert_eq!(anonymize("192.168.178.1", 16, 64).unwrap(), "192.168.0.0");
/// assert_eq!(
///     anonymize("d641:187c:53a8:da5e:0c9c:d2d9:922c:f447", 16, 64).unwrap(),
///     "d641:187c:53a8:da5e::"
/// );
/// ```
///
/// # Errors
///
/// Returns [`AuthError::InvalidAddress`] on unparseable input or a prefix
/// length exceeding the address width. Both indicate caller misuse and
/// must propagate, never be swallowed.
pub fn anonymize(address: &str, ipv4_prefix_bits: u8, ipv6_prefix_bits: u8) -> Result<String> {
    let addr: IpAddr = address
        .trim()
        .parse()
        .map_err(|_| AuthError::InvalidAddress(address.to_string()))?;

    let network = match addr {
        IpAddr::V4(v4) => Ipv4Net::new(v4, ipv4_prefix_bits)
            .map_err(|_| AuthError::InvalidAddress(address.to_string()))?
            .network()
            .to_string(),
        IpAddr::V6(v6) => Ipv6Net::new(v6, ipv6_prefix_bits)
            .map_err(|_| AuthError::InvalidAddress(address.to_string()))?
            .network()
            .to_string(),
    };

    Ok(network)
}

/// [`anonymize`] with the default /16 (IPv4) and /64 (IPv6) prefixes.
///
/// # Errors
///
/// Returns [`AuthError::InvalidAddress`] on unparseable input.
pub fn anonymize_default(address: &str) -> Result<String> {
    anonymize(address, DEFAULT_IPV4_PREFIX_BITS, DEFAULT_IPV6_PREFIX_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_rounds_down_to_network() {
        assert_eq!(anonymize("192.168.178.1", 16, 64).unwrap(), "192.168.0.0");
        assert_eq!(anonymize("127.0.0.1", 16, 64).unwrap(), "127.0.0.0");
        assert_eq!(anonymize("10.20.30.40", 8, 64).unwrap(), "10.0.0.0");
    }

    #[test]
    fn test_ipv6_rounds_down_to_network() {
        assert_eq!(
            anonymize("d641:187c:53a8:da5e:0c9c:d2d9:922c:f447", 16, 64).unwrap(),
            "d641:187c:53a8:da5e::"
        );
        assert_eq!(anonymize("::1", 16, 64).unwrap(), "::");
    }

    #[test]
    fn test_network_aligned_input_is_a_fixed_point() {
        assert_eq!(anonymize("192.168.0.0", 16, 64).unwrap(), "192.168.0.0");
        let once = anonymize("fe80::dead:beef", 16, 64).unwrap();
        assert_eq!(anonymize(&once, 16, 64).unwrap(), once);
    }

    #[test]
    fn test_whitespace_is_tolerated() {
        assert_eq!(anonymize(" 127.0.0.1 ", 16, 64).unwrap(), "127.0.0.0");
    }

    #[test]
    fn test_unparseable_input_propagates() {
        assert!(matches!(
            anonymize("not-an-address", 16, 64),
            Err(AuthError::InvalidAddress(_))
        ));
        assert!(matches!(
            anonymize("", 16, 64),
            Err(AuthError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_oversized_prefix_is_rejected() {
        assert!(matches!(
            anonymize("127.0.0.1", 33, 64),
            Err(AuthError::InvalidAddress(_))
        ));
        assert!(matches!(
            anonymize("::1", 16, 129),
            Err(AuthError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_shared_prefix_collapses_to_same_network() {
        let a = anonymize("192.168.1.10", 16, 64).unwrap();
        let b = anonymize("192.168.250.9", 16, 64).unwrap();
        assert_eq!(a, b);

        let c = anonymize("10.0.0.1", 16, 64).unwrap();
        assert_ne!(a, c);
    }
}
