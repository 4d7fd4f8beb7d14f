//! Command dispatch
//!
//! Splits a raw input line into command name and argument string, resolves
//! the registry entry and runs the handler. A failing handler is contained
//! here: it is logged, the session gets a generic failure message naming
//! the command, and the connection stays open.

use std::sync::Arc;

use hearth_core::HostApi;

use crate::registry::CommandRegistry;

/// Output collector handed to command handlers
#[derive(Default)]
pub struct Reply {
    buf: String,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: &str) {
        self.buf.push_str(data);
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

/// Everything a handler may touch for one invocation
pub struct CommandContext {
    pub host: Arc<dyn HostApi>,
    pub updates_allowed: bool,
    /// Argument string: the line with the command token stripped, trimmed
    pub arg: String,
    /// Remote address of the session issuing the command
    pub source: String,
}

/// Result of dispatching one line
pub enum Dispatch {
    /// A registered command ran; this is what the session should print
    Handled(String),
    /// No registered command matched the first token
    Unknown,
}

/// Per-session binding of the shared registry to the host graph
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    host: Arc<dyn HostApi>,
    updates_allowed: bool,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        host: Arc<dyn HostApi>,
        updates_allowed: bool,
    ) -> Self {
        Self {
            registry,
            host,
            updates_allowed,
        }
    }

    /// Dispatch one raw input line.
    ///
    /// The first whitespace-delimited token is the command name and must
    /// match a registered name exactly; there is no prefix matching.
    pub fn dispatch(&self, line: &str, source: &str) -> Dispatch {
        let line = line.trim();
        let mut parts = line.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or("");
        if name.is_empty() {
            return Dispatch::Unknown;
        }

        let Some(entry) = self.registry.lookup(name) else {
            return Dispatch::Unknown;
        };

        let ctx = CommandContext {
            host: Arc::clone(&self.host),
            updates_allowed: self.updates_allowed,
            arg: parts.next().unwrap_or("").trim().to_string(),
            source: source.to_string(),
        };

        let mut reply = Reply::new();
        match (entry.handler)(&mut reply, &ctx) {
            Ok(()) => Dispatch::Handled(reply.into_string()),
            Err(e) => {
                tracing::error!(command = name, error = %e, "command handler failed");
                Dispatch::Handled(format!(
                    "Error \"{}\" occurred when executing command \"{}\".\nSee log for details\n",
                    e, name
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::register_builtins;
    use hearth_host::MemoryHost;

    fn dispatcher(updates_allowed: bool) -> Dispatcher {
        let registry = Arc::new(CommandRegistry::new());
        register_builtins(&registry);
        let host: Arc<dyn HostApi> = Arc::new(MemoryHost::sample());
        Dispatcher::new(registry, host, updates_allowed)
    }

    fn output(dispatch: Dispatch) -> String {
        match dispatch {
            Dispatch::Handled(out) => out,
            Dispatch::Unknown => panic!("expected a handled command"),
        }
    }

    #[test]
    fn test_unknown_command() {
        let d = dispatcher(false);
        assert!(matches!(d.dispatch("zzz", "test"), Dispatch::Unknown));
    }

    #[test]
    fn test_empty_line_is_unknown() {
        let d = dispatcher(false);
        assert!(matches!(d.dispatch("", "test"), Dispatch::Unknown));
        assert!(matches!(d.dispatch("   ", "test"), Dispatch::Unknown));
    }

    #[test]
    fn test_exact_token_match_only() {
        let d = dispatcher(false);
        // "lax" must not resolve through the "la" handler.
        assert!(matches!(d.dispatch("lax", "test"), Dispatch::Unknown));
    }

    #[test]
    fn test_argument_split_and_trim() {
        let d = dispatcher(true);
        let out = output(d.dispatch("up   kitchen.light =  on", "10.0.0.1:1"));
        assert!(out.is_empty(), "successful update is silent, got: {out}");

        let out = output(d.dispatch("dump kitchen.light", "10.0.0.1:1"));
        assert!(out.contains("value = true"));
        assert!(out.contains("changed_by = CLI:10.0.0.1:1"));
    }

    #[test]
    fn test_handler_fault_is_contained() {
        let registry = Arc::new(CommandRegistry::new());
        registry.register(
            "boom",
            Arc::new(|_reply, _ctx| anyhow::bail!("kaput")),
            Some("boom: always fails"),
        );
        let host: Arc<dyn HostApi> = Arc::new(MemoryHost::sample());
        let d = Dispatcher::new(registry, host, false);

        let out = output(d.dispatch("boom now", "test"));
        assert!(out.contains("Error \"kaput\" occurred when executing command \"boom\"."));
        assert!(out.contains("See log for details\n"));
    }

    #[test]
    fn test_read_only_dispatch_is_idempotent() {
        let d = dispatcher(false);
        let first = output(d.dispatch("la", "test"));
        let second = output(d.dispatch("la", "test"));
        assert_eq!(first, second);
        assert!(first.starts_with("Items:\n======\n"));
    }
}
