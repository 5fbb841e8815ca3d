use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::provider::ProviderRegistry;

/// Which client-facing listeners to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListenProtocol {
    #[default]
    Udp,
    Tcp,
    /// Both UDP and TCP, concurrently.
    Multi,
}

impl FromStr for ListenProtocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(ListenProtocol::Udp),
            "tcp" => Ok(ListenProtocol::Tcp),
            "multi" => Ok(ListenProtocol::Multi),
            other => Err(ConfigError::UnknownProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for ListenProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenProtocol::Udp => write!(f, "udp"),
            ListenProtocol::Tcp => write!(f, "tcp"),
            ListenProtocol::Multi => write!(f, "multi"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Inbound read cap. The default suits UDP's classic 512-byte limit;
    /// larger messages are truncated at the transport layer.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            buffer_size: default_buffer_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Name of the DNS-over-TLS provider; must exist in the registry.
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub protocol: ListenProtocol,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            protocol: ListenProtocol::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main configuration for the relay. Read once at startup, immutable after.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line overrides, applied on top of file and environment values.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub buffer_size: Option<usize>,
    pub provider: Option<String>,
    pub protocol: Option<ListenProtocol>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration. Priority order:
    ///
    /// 1. Explicitly provided path
    /// 2. `dot-relay.toml` in the current directory
    /// 3. `/etc/dot-relay/config.toml`
    /// 4. Defaults
    ///
    /// Environment variables (`LISTEN_IP`, `LISTEN_PORT`, `BUFFER_SIZE`,
    /// `DNS_PROVIDER`, `PROTO`) override file values; CLI flags override both.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("dot-relay.toml").exists() {
            Self::from_file("dot-relay.toml")?
        } else if std::path::Path::new("/etc/dot-relay/config.toml").exists() {
            Self::from_file("/etc/dot-relay/config.toml")?
        } else {
            Self::default()
        };

        config.apply_env()?;
        config.apply_cli_overrides(overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(addr) = std::env::var("LISTEN_IP") {
            self.server.bind_address = addr;
        }
        if let Ok(port) = std::env::var("LISTEN_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Validation(format!("Invalid LISTEN_PORT '{port}'")))?;
        }
        if let Ok(size) = std::env::var("BUFFER_SIZE") {
            self.server.buffer_size = size
                .parse()
                .map_err(|_| ConfigError::Validation(format!("Invalid BUFFER_SIZE '{size}'")))?;
        }
        if let Ok(provider) = std::env::var("DNS_PROVIDER") {
            self.upstream.provider = provider;
        }
        if let Ok(proto) = std::env::var("PROTO") {
            self.upstream.protocol = proto.parse()?;
        }
        Ok(())
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(addr) = overrides.bind_address {
            self.server.bind_address = addr;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(size) = overrides.buffer_size {
            self.server.buffer_size = size;
        }
        if let Some(provider) = overrides.provider {
            self.upstream.provider = provider;
        }
        if let Some(protocol) = overrides.protocol {
            self.upstream.protocol = protocol;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate against the provider registry. Runs before any socket is
    /// opened; failure here terminates the process.
    pub fn validate(&self, registry: &ProviderRegistry) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "Listen port cannot be 0".to_string(),
            ));
        }
        if self.server.buffer_size < 12 {
            return Err(ConfigError::Validation(format!(
                "Buffer size {} is smaller than a DNS header",
                self.server.buffer_size
            )));
        }
        registry.resolve(&self.upstream.provider)?;
        Ok(())
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    53
}

fn default_buffer_size() -> usize {
    512
}

fn default_provider() -> String {
    "cloudfare1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
