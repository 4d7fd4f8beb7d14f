//! Hearth admin console daemon
//!
//! Binds a telnet-compatible command console against a host object graph
//! loaded from a definition file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hearth_console::ConsoleServer;
use hearth_core::config::{load_config, ConsoleConfig};
use hearth_core::HostApi;
use hearth_host::{HostDefinition, MemoryHost};

#[derive(Parser)]
#[command(name = "hearth-console")]
#[command(about = "Hearth admin console daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Path to a host definition file; omitted means the built-in sample
    #[arg(short, long)]
    definition: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = if let Some(config_path) = &args.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        ConsoleConfig::default()
    };
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }

    let host = if let Some(definition_path) = &args.definition {
        let definition = HostDefinition::load(definition_path)
            .with_context(|| format!("Failed to load host definition from {:?}", definition_path))?;
        MemoryHost::from_definition(&definition)
    } else {
        tracing::info!("No host definition given, using the built-in sample graph");
        MemoryHost::sample()
    };
    let host: Arc<dyn HostApi> = Arc::new(host);
    tracing::info!("Hearth v{} starting...", host.version());

    let cancel = CancellationToken::new();

    // Shutdown on Ctrl+C or SIGTERM
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    let server = ConsoleServer::new(&config, host);
    server.run(cancel).await?;

    tracing::info!("Console shutdown complete");
    Ok(())
}
