use thiserror::Error;

/// Per-request errors. Every variant is recoverable at the listener level:
/// the request is dropped and the loop keeps serving.
#[derive(Error, Debug, Clone)]
pub enum RelayError {
    #[error("Failed to decode inbound query: {0}")]
    Decode(String),

    #[error("Failed to encode upstream query: {0}")]
    Encode(String),

    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Connection refused by {server}: {detail}")]
    TransportConnectionRefused { server: String, detail: String },

    #[error("TLS handshake failed with {server}: {detail}")]
    TlsHandshake { server: String, detail: String },

    #[error("Invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RelayError {
    fn from(e: std::io::Error) -> Self {
        RelayError::Io(e.to_string())
    }
}

/// Startup-time errors. All fatal: logged once, process exits non-zero.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Unknown DNS-over-TLS provider '{name}' (known: {known})")]
    UnknownProvider { name: String, known: String },

    #[error("Unknown protocol '{0}'. Expected 'udp', 'tcp' or 'multi'")]
    UnknownProtocol(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
