//! hearth-core: Core abstractions and configuration for the Hearth console
//!
//! This crate provides the host collaborator contract, credential
//! primitives, configuration structures, and shared error types used by
//! the console engine and host implementations.

pub mod auth;
pub mod config;
pub mod error;
pub mod host;
pub mod time;

pub use error::{ConfigError, HostError};
pub use host::{HostApi, ItemHandle, ItemRef, ItemValue, LogEntry, LogHandle, LogRef, LogicHandle, LogicRef};
