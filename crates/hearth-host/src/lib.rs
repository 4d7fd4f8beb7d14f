//! hearth-host: In-memory host object graph
//!
//! A self-contained implementation of the host contract from
//! `hearth-core`: an item tree with typed values and change history,
//! logics, a scheduler with registration-ordered tasks, named in-memory
//! logs, and a thread-name registry. The console binary serves this graph
//! directly; the test suites use it as their fake host.

pub mod definition;
mod graph;
mod item;
mod log;
mod logic;
mod scheduler;

pub use definition::{HostDefinition, ItemDef, LogicDef, TaskDef};
pub use graph::MemoryHost;
