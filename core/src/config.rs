//! Config module - optional defaults that don't belong on the command line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings loaded from `<config_dir>/chatarchive/config.toml`. Absence of
/// the file is not an error; `Config::default()` applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Config version, for future migrations.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Default verbosity (0-3) when `--verbose` isn't passed on the CLI.
    #[serde(default = "default_verbosity")]
    pub default_verbosity: u8,

    /// Override the bundled default CSS asset.
    #[serde(default)]
    pub css_path: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

fn default_verbosity() -> u8 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            default_verbosity: default_verbosity(),
            css_path: None,
        }
    }
}

/// Default config directory (`~/.config/chatarchive/`).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("chatarchive"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default config file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from an explicit path. A parse error here is a setup
    /// error (§7); callers distinguish it from corrupt *state*, which is
    /// merely logged and treated as empty.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("cannot parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load config from the default path; a missing file falls back to
    /// `Config::default()`.
    pub fn load_default() -> Result<Self> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("cannot serialize config to TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("cannot write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn save_default(&self) -> Result<PathBuf> {
        let path = default_config_path();
        self.save(&path)?;
        Ok(path)
    }
}
