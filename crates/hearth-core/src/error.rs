//! Core error types for the Hearth console

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised by host object graph operations
#[derive(Error, Debug)]
pub enum HostError {
    /// Item has no type, so it cannot carry a value
    #[error("item '{path}' has no type and cannot hold a value")]
    UntypedItem { path: String },

    /// Raw value cannot be coerced to the item's type
    #[error("cannot parse '{raw}' as {item_type} for item '{path}'")]
    InvalidValue {
        path: String,
        item_type: String,
        raw: String,
    },
}
