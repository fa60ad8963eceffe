//! Configuration file handling.
//!
//! The optional config file lives at `<config dir>/atem/config.toml`:
//!
//! ```toml
//! address = "192.168.10.240"
//! library = "/opt/atem/lib/libatem_bridge.so"
//! ```
//!
//! Command-line flags and environment variables take precedence over it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{AtemError, Result};

/// Settings read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default switcher address.
    pub address: Option<String>,
    /// Path to the atem_bridge shared library.
    pub library: Option<PathBuf>,
}

impl Config {
    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("atem").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when present and an empty config otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(default) if default.is_file() => default,
                _ => {
                    trace!("No config file found; using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!(path = %path.display(), "Loading config file");
        let text = std::fs::read_to_string(&path).map_err(|e| {
            AtemError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
            .map_err(|e| AtemError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply command-line/environment overrides.
    #[must_use]
    pub fn with_overrides(mut self, address: Option<String>, library: Option<PathBuf>) -> Self {
        if address.is_some() {
            self.address = address;
        }
        if library.is_some() {
            self.library = library;
        }
        self
    }

    /// The switcher address, or a config error when none was given anywhere.
    pub fn require_address(&self) -> Result<&str> {
        self.address
            .as_deref()
            .filter(|address| !address.trim().is_empty())
            .ok_or_else(|| {
                AtemError::Config(
                    "no switcher address; pass --address, set ATEM_ADDRESS, or add `address` to the config file"
                        .to_string(),
                )
            })
    }
}
