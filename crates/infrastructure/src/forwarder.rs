//! One upstream round trip per inbound query.
//!
//! The forwarder owns the correlation invariant: whatever transaction ID the
//! codec put on the wire upstream, the bytes handed back carry the client's
//! original ID.

use crate::codec;
use crate::transport::DnsTransport;
use dot_relay_domain::{QueryDescriptor, RelayError};
use tracing::debug;

pub struct Forwarder<T: DnsTransport> {
    transport: T,
}

impl<T: DnsTransport> Forwarder<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn server_label(&self) -> String {
        self.transport.server_label()
    }

    /// Encode a fresh query for the descriptor's question, run the encrypted
    /// round trip, and re-tag the response with the inbound transaction ID.
    pub async fn forward(&self, descriptor: &QueryDescriptor) -> Result<Vec<u8>, RelayError> {
        let query_bytes = codec::encode_upstream_query(descriptor)?;

        let mut response_bytes = self.transport.send(&query_bytes).await?;

        codec::overwrite_transaction_id(&mut response_bytes, descriptor.transaction_id)?;

        debug!(
            name = %descriptor.name,
            transaction_id = descriptor.transaction_id,
            response_len = response_bytes.len(),
            "Forwarded query upstream"
        );

        Ok(response_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every query with a canned response and records what it saw.
    struct MockTransport {
        response: Vec<u8>,
        seen: Mutex<Vec<Vec<u8>>>,
    }

    impl MockTransport {
        fn answering_with(response: Vec<u8>) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DnsTransport for MockTransport {
        async fn send(&self, query_bytes: &[u8]) -> Result<Vec<u8>, RelayError> {
            self.seen.lock().unwrap().push(query_bytes.to_vec());
            Ok(self.response.clone())
        }

        fn server_label(&self) -> String {
            "mock".to_string()
        }
    }

    struct RefusingTransport;

    #[async_trait]
    impl DnsTransport for RefusingTransport {
        async fn send(&self, _query_bytes: &[u8]) -> Result<Vec<u8>, RelayError> {
            Err(RelayError::TransportConnectionRefused {
                server: "mock".to_string(),
                detail: "refused".to_string(),
            })
        }

        fn server_label(&self) -> String {
            "mock".to_string()
        }
    }

    fn descriptor() -> QueryDescriptor {
        QueryDescriptor::new(0x1234, "example.com.".to_string(), 1, 1)
    }

    #[tokio::test]
    async fn response_carries_inbound_transaction_id() {
        // Upstream answers with a different wire ID (0xbeef).
        let mut upstream_response =
            codec::encode_upstream_query(&QueryDescriptor::new(0, "example.com.".to_string(), 1, 1))
                .unwrap();
        upstream_response[0..2].copy_from_slice(&0xbeefu16.to_be_bytes());

        let forwarder = Forwarder::new(MockTransport::answering_with(upstream_response));
        let response = forwarder.forward(&descriptor()).await.unwrap();

        assert_eq!(u16::from_be_bytes([response[0], response[1]]), 0x1234);
    }

    #[tokio::test]
    async fn upstream_query_preserves_question() {
        let canned = codec::encode_upstream_query(&descriptor()).unwrap();
        let transport = MockTransport::answering_with(canned);
        let forwarder = Forwarder::new(transport);

        forwarder.forward(&descriptor()).await.unwrap();

        let seen = forwarder.transport.seen.lock().unwrap();
        let sent = decode(&seen[0]).unwrap();
        assert_eq!(sent.name, "example.com.");
        assert_eq!(sent.record_type, 1);
        assert_eq!(sent.record_class, 1);
    }

    #[tokio::test]
    async fn transport_failure_is_surfaced() {
        let forwarder = Forwarder::new(RefusingTransport);
        let err = forwarder.forward(&descriptor()).await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::TransportConnectionRefused { .. }
        ));
    }

    #[tokio::test]
    async fn short_upstream_response_is_rejected() {
        let forwarder = Forwarder::new(MockTransport::answering_with(vec![0u8; 4]));
        let err = forwarder.forward(&descriptor()).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidUpstreamResponse(_)));
    }
}
