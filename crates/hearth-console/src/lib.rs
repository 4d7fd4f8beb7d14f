//! hearth-console: Command-line admin console for the Hearth host
//!
//! A stateful, line-oriented, telnet-compatible session handler over raw
//! TCP. Each accepted connection gets its own session task; after an
//! optional echo-suppressed password challenge, every newline-terminated
//! line is dispatched against a shared command registry, and the handlers
//! read or mutate the host's live object graph.

pub mod commands;
pub mod dispatch;
pub mod listener;
pub mod registry;
pub mod session;
pub mod telnet;

pub use dispatch::{CommandContext, Dispatch, Dispatcher, Reply};
pub use listener::ConsoleServer;
pub use registry::{CommandEntry, CommandHandler, CommandRegistry};
