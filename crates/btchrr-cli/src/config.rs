//! Config file loading

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use btchrr_batch::BatchOptions;
use serde::{Deserialize, Serialize};

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub batch: BatchOptions,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn,btchrr=info".to_string(),
            json: false,
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("btchrr"))
}

pub fn default_config_file() -> Result<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

impl Config {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load `explicit` if given, else the default location when it exists,
    /// else built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_file() {
            Ok(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }
}
