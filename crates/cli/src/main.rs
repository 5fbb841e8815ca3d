use anyhow::Context;
use clap::Parser;
use dot_relay_domain::{CliOverrides, Config, ListenProtocol, ProviderRegistry};
use dot_relay_infrastructure::{Forwarder, TcpRelayListener, TlsTransport, UdpRelayListener};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

mod bootstrap;

#[derive(Parser)]
#[command(name = "dot-relay")]
#[command(version)]
#[command(about = "Local DNS proxy that forwards queries over DNS-over-TLS")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Bind address for the client-facing listeners
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Listen port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Inbound read cap in bytes
    #[arg(long)]
    buffer_size: Option<usize>,

    /// DNS-over-TLS provider name
    #[arg(long)]
    provider: Option<String>,

    /// Listener protocol (udp, tcp, or multi for both)
    #[arg(long)]
    proto: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let protocol = cli
        .proto
        .as_deref()
        .map(str::parse::<ListenProtocol>)
        .transpose()?;

    let overrides = CliOverrides {
        bind_address: cli.bind,
        port: cli.port,
        buffer_size: cli.buffer_size,
        provider: cli.provider,
        protocol,
        log_level: cli.log_level,
    };

    let config = Config::load(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    info!("Starting dot-relay v{}", env!("CARGO_PKG_VERSION"));

    // Provider resolution happens before any socket is opened; an unknown
    // name must never survive past startup.
    let registry = ProviderRegistry::builtin();
    config.validate(&registry).inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    let provider = registry.resolve(&config.upstream.provider)?;

    info!(
        provider = %provider,
        protocol = %config.upstream.protocol,
        "Upstream provider selected"
    );

    let forwarder = Arc::new(Forwarder::new(TlsTransport::for_provider(provider)));

    let listen_addr: SocketAddr = format!(
        "{}:{}",
        config.server.bind_address, config.server.port
    )
    .parse()
    .with_context(|| format!("Invalid listen address '{}'", config.server.bind_address))?;
    let buffer_size = config.server.buffer_size;

    match config.upstream.protocol {
        ListenProtocol::Udp => {
            let listener = UdpRelayListener::bind(listen_addr, buffer_size, forwarder)
                .await
                .with_context(|| format!("Failed to bind UDP listener on {listen_addr}"))?;
            listener.run().await.context("UDP listener failed")?;
        }
        ListenProtocol::Tcp => {
            let listener = TcpRelayListener::bind(listen_addr, buffer_size, forwarder)
                .await
                .with_context(|| format!("Failed to bind TCP listener on {listen_addr}"))?;
            listener.run().await.context("TCP listener failed")?;
        }
        ListenProtocol::Multi => {
            // Bind both up front so a bad address fails fast; after that the
            // listeners are isolated — one dying does not stop the other.
            let udp = UdpRelayListener::bind(listen_addr, buffer_size, forwarder.clone())
                .await
                .with_context(|| format!("Failed to bind UDP listener on {listen_addr}"))?;
            let tcp = TcpRelayListener::bind(listen_addr, buffer_size, forwarder)
                .await
                .with_context(|| format!("Failed to bind TCP listener on {listen_addr}"))?;

            let mut listeners: JoinSet<()> = JoinSet::new();
            listeners.spawn(async move {
                if let Err(e) = udp.run().await {
                    error!(error = %e, "UDP listener terminated");
                }
            });
            listeners.spawn(async move {
                if let Err(e) = tcp.run().await {
                    error!(error = %e, "TCP listener terminated");
                }
            });

            while listeners.join_next().await.is_some() {}
        }
    }

    Ok(())
}
