//! Client-facing listeners, one per protocol.
//!
//! Each listener is a single receive → decode → forward → respond loop.
//! Per-request failures are logged and dropped; the loop itself only ends on
//! an unrecoverable socket error, which the supervisor treats as fatal.

pub mod tcp;
pub mod udp;

pub use tcp::TcpRelayListener;
pub use udp::UdpRelayListener;
