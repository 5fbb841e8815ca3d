use crate::codec;
use crate::forwarder::Forwarder;
use crate::framing;
use crate::transport::DnsTransport;
use dot_relay_domain::RelayError;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Plaintext DNS over TCP: each accepted connection carries exactly one
/// length-prefixed request and receives one length-prefixed response, then
/// the connection is dropped. No pipelining.
pub struct TcpRelayListener<T: DnsTransport> {
    listener: TcpListener,
    buffer_size: usize,
    forwarder: Arc<Forwarder<T>>,
}

impl<T: DnsTransport> TcpRelayListener<T> {
    pub async fn bind(
        addr: SocketAddr,
        buffer_size: usize,
        forwarder: Arc<Forwarder<T>>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(listen = %listener.local_addr()?, buffer_size, "TCP listener bound");
        Ok(Self {
            listener,
            buffer_size,
            forwarder,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve forever. Returns only on an unrecoverable accept error.
    pub async fn run(self) -> io::Result<()> {
        loop {
            let (mut stream, peer) = self.listener.accept().await?;
            debug!(%peer, "Accepted TCP connection");

            if let Err(e) = self.serve_connection(&mut stream, peer).await {
                warn!(%peer, error = %e, "Dropping TCP request");
            }
            // Stream drops here; one request per connection.
        }
    }

    async fn serve_connection(
        &self,
        stream: &mut TcpStream,
        peer: SocketAddr,
    ) -> Result<(), RelayError> {
        let request = framing::read_frame(stream, self.buffer_size).await?;

        let descriptor = codec::decode(&request)?;
        let response = self.forwarder.forward(&descriptor).await?;

        debug!(%peer, response_len = response.len(), "Sending TCP response");
        framing::write_frame(stream, &response).await
    }
}
