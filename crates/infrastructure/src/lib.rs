pub mod codec;
pub mod forwarder;
pub mod framing;
pub mod listener;
pub mod transport;

pub use forwarder::Forwarder;
pub use listener::{TcpRelayListener, UdpRelayListener};
pub use transport::{DnsTransport, TlsTransport};
