//! DNS-over-TLS upstream transport (RFC 7858).
//!
//! One connection per round trip: TCP connect, TLS handshake, framed
//! exchange, drop. The rustls `ClientConfig` is built once and shared;
//! session resumption via the rustls session cache still amortizes repeat
//! handshakes to the same provider. Connection pooling and per-request
//! deadlines are deliberate non-features of this relay.

use super::DnsTransport;
use crate::framing::{read_frame, write_frame, MAX_FRAME_LEN};
use async_trait::async_trait;
use dot_relay_domain::{Provider, RelayError};
use rustls::pki_types::ServerName;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

/// Shared TLS config — built once, reused for all upstream connections.
static SHARED_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
});

pub struct TlsTransport {
    server_addr: SocketAddr,
    tls_name: String,
}

impl TlsTransport {
    pub fn new(server_addr: SocketAddr, tls_name: String) -> Self {
        Self {
            server_addr,
            tls_name,
        }
    }

    pub fn for_provider(provider: &Provider) -> Self {
        Self::new(provider.socket_addr(), provider.tls_name.to_string())
    }

    async fn connect(&self) -> Result<TlsStream<TcpStream>, RelayError> {
        let connector = tokio_rustls::TlsConnector::from(SHARED_TLS_CONFIG.clone());

        let server_name = ServerName::try_from(self.tls_name.clone()).map_err(|e| {
            RelayError::TlsHandshake {
                server: self.server_label(),
                detail: format!("Invalid TLS name '{}': {e}", self.tls_name),
            }
        })?;

        let tcp_stream = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::ConnectionRefused => RelayError::TransportConnectionRefused {
                    server: self.server_label(),
                    detail: e.to_string(),
                },
                io::ErrorKind::TimedOut => RelayError::TransportTimeout {
                    server: self.server_label(),
                },
                _ => RelayError::Io(format!("Connect to {} failed: {e}", self.server_addr)),
            })?;

        let tls_stream = connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| RelayError::TlsHandshake {
                server: self.server_label(),
                detail: e.to_string(),
            })?;

        debug!(server = %self.server_addr, tls_name = %self.tls_name, "TLS connection established");
        Ok(tls_stream)
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(&self, query_bytes: &[u8]) -> Result<Vec<u8>, RelayError> {
        let mut stream = self.connect().await?;

        write_frame(&mut stream, query_bytes).await?;
        let response_bytes = read_frame(&mut stream, MAX_FRAME_LEN).await?;

        debug!(
            server = %self.server_addr,
            response_len = response_bytes.len(),
            "TLS response received"
        );

        Ok(response_bytes)
    }

    fn server_label(&self) -> String {
        format!("{} ({})", self.server_addr, self.tls_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_construction() {
        let addr: SocketAddr = "1.1.1.1:853".parse().unwrap();
        let transport = TlsTransport::new(addr, "cloudflare-dns.com".to_string());
        assert_eq!(transport.server_addr, addr);
        assert_eq!(transport.tls_name, "cloudflare-dns.com");
    }

    #[test]
    fn for_provider_uses_registry_endpoint() {
        let registry = dot_relay_domain::ProviderRegistry::builtin();
        let provider = registry.lookup("google1").unwrap();
        let transport = TlsTransport::for_provider(provider);
        assert_eq!(transport.server_addr, "8.8.8.8:853".parse().unwrap());
        assert_eq!(transport.tls_name, "dns.google");
    }

    #[test]
    fn shared_tls_config_builds() {
        let _config = &*SHARED_TLS_CONFIG;
    }
}
