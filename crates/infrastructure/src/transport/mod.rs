pub mod tls;

use async_trait::async_trait;
use dot_relay_domain::RelayError;

pub use tls::TlsTransport;

/// One encrypted round trip: send an encoded query, read one complete
/// response. The upstream endpoint is captured at construction.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(&self, query_bytes: &[u8]) -> Result<Vec<u8>, RelayError>;

    /// Human-readable endpoint label, for logs and error messages.
    fn server_label(&self) -> String;
}
