//! Configuration loading.
//!
//! The bot takes its channel and log file from the command line, the way
//! the original two-argument invocation worked; everything else has
//! boundary defaults that a TOML file can override.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// IRC server host.
    #[serde(default = "default_server")]
    pub server: String,
    /// IRC server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Desired nickname.
    #[serde(default = "default_nickname")]
    pub nickname: String,
    /// Channel to join and log.
    pub channel: String,
    /// Activity log file path.
    pub log_path: PathBuf,
    /// Keep a users database (disable for the plain logging variant).
    #[serde(default = "default_true")]
    pub track_users: bool,
    /// Users database path. The working-directory-relative default only
    /// applies here at the boundary; components receive the path explicitly.
    #[serde(default = "default_users_db")]
    pub users_db: PathBuf,
}

fn default_server() -> String {
    "irc.oftc.net".to_string()
}

fn default_port() -> u16 {
    6667
}

fn default_nickname() -> String {
    "linkbot".to_string()
}

fn default_true() -> bool {
    true
}

fn default_users_db() -> PathBuf {
    PathBuf::from("users_db")
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build a configuration from the two positional CLI arguments, with
    /// defaults for everything else.
    pub fn from_args(channel: String, log_path: PathBuf) -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            nickname: default_nickname(),
            channel,
            log_path,
            track_users: true,
            users_db: default_users_db(),
        }
    }

    /// Users database path, or `None` for the plain logging variant.
    pub fn registry_path(&self) -> Option<&Path> {
        self.track_users.then_some(self.users_db.as_path())
    }
}
