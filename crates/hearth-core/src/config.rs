//! Console configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Configuration for the admin console listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Address to bind the console listener to
    pub bind_address: String,

    /// Whether mutating commands (item updates, logic control) are allowed
    pub updates_allowed: bool,

    /// Hashed credential required to log on. Absent, empty or the literal
    /// `none` means no password is required.
    pub hashed_password: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:2323".to_string(),
            updates_allowed: false,
            hashed_password: None,
        }
    }
}

impl ConsoleConfig {
    /// The configured credential, with the "not set" spellings folded to
    /// `None`
    pub fn credential(&self) -> Option<&str> {
        match self.hashed_password.as_deref() {
            None => None,
            Some(h) if h.is_empty() || h.eq_ignore_ascii_case("none") => None,
            Some(h) => Some(h),
        }
    }
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}
