pub mod config;
pub mod errors;
pub mod provider;
pub mod query;

pub use config::{CliOverrides, Config, ListenProtocol, LoggingConfig};
pub use errors::{ConfigError, RelayError};
pub use provider::{Provider, ProviderRegistry};
pub use query::QueryDescriptor;
