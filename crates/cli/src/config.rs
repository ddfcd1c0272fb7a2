// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! State directory and configuration management.
//!
//! Everything tally keeps lives in one state directory:
//! - `config.toml`: the `[remote]` section (endpoint URL and timings)
//! - `queue.db`: the record store
//! - `tally.log`: log output of `tally run`
//! - `tally.lock`: held by `tally run` so only one engine drains the store

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::SyncConfig;

const STATE_DIR_NAME: &str = "tally";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "queue.db";
const LOG_FILE_NAME: &str = "tally.log";
const LOCK_FILE_NAME: &str = "tally.lock";

/// Remote URL written by `tally init` when none is given.
pub const DEFAULT_REMOTE_URL: &str = "http://localhost:5000";

/// Configuration stored in `<state_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub remote: RemoteConfig,
}

/// Remote endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL; records are posted to `{url}/api/sync/{kind}`.
    pub url: String,
    /// Period of the background sync trigger in seconds (default: 30).
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    /// Upper bound on a single transmission in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Reachability polling period for `tally run` in seconds (default: 5).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    /// Max time to wait for a reachability probe in milliseconds (default: 2000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_sync_interval_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_probe_interval_secs() -> u64 {
    5
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

impl RemoteConfig {
    /// Creates a remote config with default timings.
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            sync_interval_secs: default_sync_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }

    /// Validates that the URL is an http(s) URL.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        let url = &self.url;
        let rest = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => None,
            Some(_) => Some(format!("invalid remote URL '{}': missing host", url)),
            None => Some(format!(
                "invalid remote URL '{}': must be http:// or https://",
                url
            )),
        }
    }

    /// Validates the URL and rejects zero periods.
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = self.validate_url() {
            return Some(msg);
        }
        if self.sync_interval_secs == 0 {
            return Some("sync_interval_secs must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Some("request_timeout_secs must be greater than 0".to_string());
        }
        if self.probe_interval_secs == 0 {
            return Some("probe_interval_secs must be greater than 0".to_string());
        }
        if self.probe_timeout_ms == 0 {
            return Some("probe_timeout_ms must be greater than 0".to_string());
        }
        None
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Engine configuration derived from these timings.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            interval: self.sync_interval(),
            request_timeout: self.request_timeout(),
        }
    }
}

impl Config {
    /// Creates a config for the given remote URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is not http(s).
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let remote = RemoteConfig::new(url);
        if let Some(msg) = remote.validate_url() {
            return Err(Error::Config(msg));
        }
        Ok(Config { remote })
    }

    /// Loads configuration from the given state directory.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)?;
        if let Some(msg) = config.remote.validate() {
            return Err(Error::Config(msg));
        }
        Ok(config)
    }

    /// Saves configuration to the given state directory.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(state_dir.join(CONFIG_FILE_NAME), content)?;
        Ok(())
    }
}

/// Resolve the state directory.
///
/// Order: explicit path, `$TALLY_STATE_DIR`, `$XDG_STATE_HOME/tally`,
/// the platform state dir, then `~/.local/state/tally`.
pub fn resolve_state_dir(explicit: Option<&Path>) -> PathBuf {
    state_dir_from(
        explicit.map(Path::to_path_buf),
        env::state_dir(),
        env::xdg_state_home(),
        dirs::state_dir(),
    )
}

fn state_dir_from(
    explicit: Option<PathBuf>,
    env_dir: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    platform_state_dir: Option<PathBuf>,
) -> PathBuf {
    explicit
        .or(env_dir)
        .or_else(|| xdg_state_home.map(|d| d.join(STATE_DIR_NAME)))
        .or_else(|| platform_state_dir.map(|d| d.join(STATE_DIR_NAME)))
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/state").join(STATE_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(STATE_DIR_NAME))
}

/// Path of the record store database.
pub fn db_path(state_dir: &Path) -> PathBuf {
    state_dir.join(DB_FILE_NAME)
}

/// Path of the `tally run` log file.
pub fn log_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOG_FILE_NAME)
}

/// Path of the `tally run` lock file.
pub fn lock_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOCK_FILE_NAME)
}

/// Returns true if the state directory holds a config file.
pub fn is_initialized(state_dir: &Path) -> bool {
    state_dir.join(CONFIG_FILE_NAME).is_file()
}

/// Load the config of an initialized state directory.
///
/// # Errors
///
/// Returns [`Error::NotInitialized`] if `tally init` has not run there.
pub fn load_initialized(state_dir: &Path) -> Result<Config> {
    if !is_initialized(state_dir) {
        return Err(Error::NotInitialized(state_dir.display().to_string()));
    }
    Config::load(state_dir)
}

/// Create the state directory and write a fresh config.
///
/// # Errors
///
/// Returns [`Error::AlreadyInitialized`] if a config already exists.
pub fn init_state_dir(state_dir: &Path, url: &str) -> Result<Config> {
    if is_initialized(state_dir) {
        return Err(Error::AlreadyInitialized(state_dir.display().to_string()));
    }
    let config = Config::new(url)?;
    fs::create_dir_all(state_dir)?;
    config.save(state_dir)?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
