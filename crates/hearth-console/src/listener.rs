//! Console listener
//!
//! Binds the configured address and spawns one session task per accepted
//! connection. The registry is shared across all sessions; commands can be
//! added or removed while sessions are live.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use hearth_core::auth::is_hash;
use hearth_core::config::ConsoleConfig;
use hearth_core::HostApi;

use crate::commands::register_builtins;
use crate::dispatch::Dispatcher;
use crate::registry::{CommandHandler, CommandRegistry};
use crate::session::Session;

/// TCP console server bound to one host object graph
pub struct ConsoleServer {
    host: Arc<dyn HostApi>,
    registry: Arc<CommandRegistry>,
    bind_address: String,
    updates_allowed: bool,
    credential: Option<String>,
}

impl ConsoleServer {
    /// Build a server with the built-in command set registered.
    pub fn new(config: &ConsoleConfig, host: Arc<dyn HostApi>) -> Self {
        let credential = config.credential().map(str::to_string);
        match &credential {
            None => {
                tracing::warn!("you should set a password for the console");
            }
            Some(hash) if !is_hash(hash) => {
                tracing::error!(
                    "value given for 'hashed_password' is not a valid hash value, \
                     login will not be possible"
                );
            }
            Some(_) => {}
        }

        let registry = Arc::new(CommandRegistry::new());
        register_builtins(&registry);

        Self {
            host,
            registry,
            bind_address: config.bind_address.clone(),
            updates_allowed: config.updates_allowed,
            credential,
        }
    }

    /// The shared command registry, for plugin wiring.
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Register an additional command; a duplicate name replaces the
    /// previous entry.
    pub fn add_command(&self, name: &str, handler: CommandHandler, usage: Option<&str>) {
        self.registry.register(name, handler, usage);
    }

    /// Remove a command. Returns false when no such command was registered.
    pub fn remove_command(&self, name: &str) -> bool {
        self.registry.unregister(name)
    }

    /// Bind the configured address and serve until cancelled.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(&self.bind_address)
            .await
            .with_context(|| format!("failed to bind to {}", self.bind_address))?;
        self.serve(listener, cancel).await
    }

    /// Accept loop on an already-bound listener.
    pub async fn serve(&self, listener: TcpListener, cancel: CancellationToken) -> Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!("console listening on {}", local_addr);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("console listener shutting down");
                    return Ok(());
                }
                result = listener.accept() => {
                    match result {
                        Ok((socket, peer_addr)) => {
                            tracing::debug!("incoming connection from {}", peer_addr);
                            self.spawn_session(socket, peer_addr.to_string());
                        }
                        Err(e) => {
                            tracing::error!("failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }
    }

    fn spawn_session(&self, socket: tokio::net::TcpStream, source: String) {
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.host),
            self.updates_allowed,
        );
        let session = Session::new(
            socket,
            source.clone(),
            self.host.version(),
            self.credential.clone(),
            dispatcher,
        );

        tokio::spawn(async move {
            match session.run().await {
                Ok(()) => tracing::debug!("session from {} closed", source),
                Err(e) => tracing::warn!("session from {} closed with error: {}", source, e),
            }
        });
    }
}
