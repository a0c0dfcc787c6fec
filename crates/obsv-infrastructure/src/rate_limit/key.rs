//! Client key derivation
//!
//! Isolated behind a strategy trait so header-trust policy is testable
//! independent of the counting logic. The hint struct is framework-neutral;
//! the server crate fills it from the inbound request.

use std::net::IpAddr;

/// Raw material for deriving a client key from a request
#[derive(Debug, Clone, Default)]
pub struct ClientHint {
    /// `X-Forwarded-For` header, verbatim
    pub forwarded_for: Option<String>,
    /// `X-Real-IP` header
    pub real_ip: Option<String>,
    /// `CF-Connecting-IP` header
    pub cf_connecting_ip: Option<String>,
    /// Transport-level peer address
    pub remote_addr: Option<IpAddr>,
}

/// Strategy for turning a request into a rate-limit key
pub trait ClientKeyStrategy: Send + Sync {
    /// Derive the key a request is counted under
    fn client_key(&self, hint: &ClientHint) -> String;
}

/// IP-based key derivation
///
/// With `trust_proxy_headers` set, proxy headers are consulted in order
/// (`X-Forwarded-For` first entry, then `X-Real-IP`, then
/// `CF-Connecting-IP`) before the transport address. Untrusted deployments
/// only ever see the transport address or `"unknown"`.
#[derive(Debug, Clone)]
pub struct IpKeyStrategy {
    /// Whether proxy-supplied headers may be believed
    pub trust_proxy_headers: bool,
}

impl ClientKeyStrategy for IpKeyStrategy {
    fn client_key(&self, hint: &ClientHint) -> String {
        if self.trust_proxy_headers {
            if let Some(forwarded) = &hint.forwarded_for {
                if let Some(first) = forwarded.split(',').next() {
                    let first = first.trim();
                    if !first.is_empty() {
                        return first.to_string();
                    }
                }
            }
            if let Some(real_ip) = &hint.real_ip {
                if !real_ip.trim().is_empty() {
                    return real_ip.trim().to_string();
                }
            }
            if let Some(cf_ip) = &hint.cf_connecting_ip {
                if !cf_ip.trim().is_empty() {
                    return cf_ip.trim().to_string();
                }
            }
        }

        hint.remote_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint() -> ClientHint {
        ClientHint {
            forwarded_for: Some("203.0.113.7, 10.0.0.1".to_string()),
            real_ip: Some("198.51.100.2".to_string()),
            cf_connecting_ip: Some("192.0.2.9".to_string()),
            remote_addr: Some("127.0.0.1".parse().unwrap()),
        }
    }

    #[test]
    fn test_trusted_prefers_forwarded_for_first_entry() {
        let strategy = IpKeyStrategy {
            trust_proxy_headers: true,
        };
        assert_eq!(strategy.client_key(&hint()), "203.0.113.7");
    }

    #[test]
    fn test_trusted_fallback_order() {
        let strategy = IpKeyStrategy {
            trust_proxy_headers: true,
        };

        let mut h = hint();
        h.forwarded_for = None;
        assert_eq!(strategy.client_key(&h), "198.51.100.2");

        h.real_ip = None;
        assert_eq!(strategy.client_key(&h), "192.0.2.9");

        h.cf_connecting_ip = None;
        assert_eq!(strategy.client_key(&h), "127.0.0.1");

        h.remote_addr = None;
        assert_eq!(strategy.client_key(&h), "unknown");
    }

    #[test]
    fn test_untrusted_ignores_headers() {
        let strategy = IpKeyStrategy {
            trust_proxy_headers: false,
        };
        assert_eq!(strategy.client_key(&hint()), "127.0.0.1");

        let mut h = hint();
        h.remote_addr = None;
        assert_eq!(strategy.client_key(&h), "unknown");
    }

    #[test]
    fn test_empty_header_values_skipped() {
        let strategy = IpKeyStrategy {
            trust_proxy_headers: true,
        };
        let h = ClientHint {
            forwarded_for: Some("  ".to_string()),
            real_ip: Some(String::new()),
            cf_connecting_ip: None,
            remote_addr: Some("127.0.0.1".parse().unwrap()),
        };
        assert_eq!(strategy.client_key(&h), "127.0.0.1");
    }
}
