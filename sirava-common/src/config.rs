//! Configuration loading and config file resolution
//!
//! Settings priority (highest first):
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! Levels 1 and 2 are applied by the binary through clap; this module
//! resolves and loads level 3 on top of level 4.

use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SIRAVA_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP listen address for `serve`
    pub bind_address: SocketAddr,

    /// Persisted program guide document
    pub store_path: PathBuf,

    /// Directory served for paths not handled by the API
    pub static_dir: PathBuf,

    /// Logging configuration (optional)
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            store_path: PathBuf::from("output.xml"),
            static_dir: PathBuf::from("."),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration, falling back to defaults when no file exists
    ///
    /// A config file that exists but cannot be read or parsed is an error;
    /// an absent one only produces a warning.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let Some(path) = resolve_config_file(cli_path) else {
            warn!("No config file found, using built-in defaults");
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Locate the config file
///
/// An explicitly requested file (argument or `SIRAVA_CONFIG`) is returned
/// even if missing so that loading reports it; the per-user and system
/// locations are only used when they exist.
pub fn resolve_config_file(cli_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: ~/.config/sirava/config.toml, then /etc/sirava/config.toml
    let user_config = dirs::config_dir().map(|d| d.join("sirava").join("config.toml"));
    let system_config = PathBuf::from("/etc/sirava/config.toml");

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|path| path.exists())
}
