use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::errors::ConfigError;

/// An upstream resolver accepting DNS-over-TLS queries.
///
/// `tls_name` is the certificate hostname used for server-name verification;
/// the connection itself goes to `address:port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub name: &'static str,
    pub address: IpAddr,
    pub port: u16,
    pub tls_name: &'static str,
}

impl Provider {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.address, self.port)
    }
}

// Provider names keep the original configuration surface, misspelling included.
const BUILTIN_PROVIDERS: &[Provider] = &[
    Provider {
        name: "cloudfare1",
        address: IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
        port: 853,
        tls_name: "cloudflare-dns.com",
    },
    Provider {
        name: "cloudfare2",
        address: IpAddr::V4(Ipv4Addr::new(1, 0, 0, 1)),
        port: 853,
        tls_name: "cloudflare-dns.com",
    },
    Provider {
        name: "google1",
        address: IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
        port: 853,
        tls_name: "dns.google",
    },
    Provider {
        name: "google2",
        address: IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
        port: 853,
        tls_name: "dns.google",
    },
];

/// Static registry of upstream providers. Populated once, never mutated, so
/// it can be shared across listeners without synchronization.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: &'static [Provider],
}

impl ProviderRegistry {
    pub fn builtin() -> Self {
        Self {
            providers: BUILTIN_PROVIDERS,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Resolve a configured provider name, or fail with the list of known
    /// names. Only ever called at startup; unknown names never reach request
    /// handling.
    pub fn resolve(&self, name: &str) -> Result<&Provider, ConfigError> {
        self.lookup(name).ok_or_else(|| ConfigError::UnknownProvider {
            name: name.to_string(),
            known: self.names().join(", "),
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_four_providers() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.names().len(), 4);
    }

    #[test]
    fn lookup_known_provider() {
        let registry = ProviderRegistry::builtin();
        let provider = registry.lookup("cloudfare1").unwrap();
        assert_eq!(provider.address, IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)));
        assert_eq!(provider.port, 853);
        assert_eq!(provider.tls_name, "cloudflare-dns.com");
    }

    #[test]
    fn lookup_unknown_provider_returns_none() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.lookup("quad9").is_none());
    }

    #[test]
    fn resolve_unknown_provider_lists_known_names() {
        let registry = ProviderRegistry::builtin();
        let err = registry.resolve("quad9").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("quad9"));
        assert!(msg.contains("cloudfare1"));
        assert!(msg.contains("google2"));
    }

    #[test]
    fn all_builtin_providers_use_dot_port() {
        let registry = ProviderRegistry::builtin();
        for name in registry.names() {
            assert_eq!(registry.lookup(name).unwrap().port, 853);
        }
    }
}
