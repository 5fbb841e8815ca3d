use crate::codec;
use crate::forwarder::Forwarder;
use crate::transport::DnsTransport;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// Plaintext DNS over UDP: one datagram in, one datagram out, no connection
/// state. Requests are handled strictly one at a time.
pub struct UdpRelayListener<T: DnsTransport> {
    socket: UdpSocket,
    buffer_size: usize,
    forwarder: Arc<Forwarder<T>>,
}

impl<T: DnsTransport> UdpRelayListener<T> {
    pub async fn bind(
        addr: SocketAddr,
        buffer_size: usize,
        forwarder: Arc<Forwarder<T>>,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!(listen = %socket.local_addr()?, buffer_size, "UDP listener bound");
        Ok(Self {
            socket,
            buffer_size,
            forwarder,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serve forever. Returns only on an unrecoverable socket error.
    pub async fn run(self) -> io::Result<()> {
        let mut buf = vec![0u8; self.buffer_size];

        loop {
            let (len, peer) = self.socket.recv_from(&mut buf).await?;
            debug!(%peer, len, "Received UDP query");

            let descriptor = match codec::decode(&buf[..len]) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    debug!(%peer, error = %e, "Dropping undecodable query");
                    continue;
                }
            };

            let response = match self.forwarder.forward(&descriptor).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        %peer,
                        name = %descriptor.name,
                        upstream = %self.forwarder.server_label(),
                        error = %e,
                        "Dropping query: upstream exchange failed"
                    );
                    continue;
                }
            };

            debug!(%peer, response_len = response.len(), "Sending UDP response");
            if let Err(e) = self.socket.send_to(&response, peer).await {
                warn!(%peer, error = %e, "Failed to send UDP response");
            }
        }
    }
}
