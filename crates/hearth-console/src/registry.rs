//! Command registry
//!
//! Maps command names to handlers plus usage text. The registry is shared
//! read-mostly across all sessions; mutation happens at plugin wiring time
//! and must stay safe against concurrent lookups, so the map sits behind a
//! read/write lock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::dispatch::{CommandContext, Reply};

/// A command handler: writes its output into the reply buffer, reads the
/// host through the context
pub type CommandHandler =
    Arc<dyn Fn(&mut Reply, &CommandContext) -> anyhow::Result<()> + Send + Sync>;

/// One registered command
#[derive(Clone)]
pub struct CommandEntry {
    pub handler: CommandHandler,
    /// Usage text for `help`; commands registered without one are hidden
    pub usage: Option<String>,
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, CommandEntry>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Registering an existing name overwrites the
    /// previous entry; the collision is logged.
    pub fn register(&self, name: &str, handler: CommandHandler, usage: Option<&str>) {
        let mut commands = self.commands.write().expect("registry lock poisoned");
        let entry = CommandEntry {
            handler,
            usage: usage.map(str::to_string),
        };
        if commands.insert(name.to_string(), entry).is_some() {
            tracing::warn!(command = name, "command registered twice, previous handler replaced");
        }
    }

    /// Remove a command. Returns whether it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.commands
            .write()
            .expect("registry lock poisoned")
            .remove(name)
            .is_some()
    }

    /// Exact-match lookup by command name
    pub fn lookup(&self, name: &str) -> Option<CommandEntry> {
        self.commands
            .read()
            .expect("registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Usage lines of all visible commands, sorted by command token
    pub fn usages(&self) -> Vec<String> {
        let commands = self.commands.read().expect("registry lock poisoned");
        let mut named: Vec<(&String, &String)> = commands
            .iter()
            .filter_map(|(name, entry)| entry.usage.as_ref().map(|u| (name, u)))
            .collect();
        named.sort_by(|a, b| a.0.cmp(b.0));
        named.into_iter().map(|(_, usage)| usage.clone()).collect()
    }
}
