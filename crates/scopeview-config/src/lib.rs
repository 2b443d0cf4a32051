//! Configuration for scopeview.
//!
//! Layered with figment: built-in defaults, then a TOML file (platform
//! config dir or an explicit path), then `SCOPEVIEW_*` environment
//! variables. Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the Scope app server.
    pub api_url: String,

    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Seconds between topology polls.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Quiet period before a terminal resize is measured.
    #[serde(default = "default_resize_debounce")]
    pub resize_debounce_ms: u64,

    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_frame_rate")]
    pub frame_rate_ms: u64,

    /// Fetch topologies on start even when the route already did.
    #[serde(default)]
    pub always_fetch_topologies: bool,

    /// Carry the route in the location fragment (`#!/state/...`).
    #[serde(default = "default_hashbang")]
    pub hashbang: bool,

    /// Topology opened when the route names none.
    #[serde(default = "default_topology")]
    pub default_topology: String,

    /// Log file path. Defaults to `scopeview.log` in the platform cache dir.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            insecure: false,
            request_timeout_secs: default_request_timeout(),
            refresh_interval_secs: default_refresh_interval(),
            resize_debounce_ms: default_resize_debounce(),
            tick_rate_ms: default_tick_rate(),
            frame_rate_ms: default_frame_rate(),
            always_fetch_topologies: false,
            hashbang: default_hashbang(),
            default_topology: default_topology(),
            log_file: None,
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:4040".into()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_refresh_interval() -> u64 {
    5
}
fn default_resize_debounce() -> u64 {
    200
}
fn default_tick_rate() -> u64 {
    250
}
fn default_frame_rate() -> u64 {
    33
}
fn default_hashbang() -> bool {
    true
}
fn default_topology() -> String {
    "containers".into()
}

impl Config {
    /// Parsed app server URL.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_url).map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Validation {
                field: "api_url".into(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn frame_rate(&self) -> Duration {
        Duration::from_millis(self.frame_rate_ms)
    }

    /// Check values that deserialize fine but can't work at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_url()?;
        for (field, value) in [
            ("refresh_interval_secs", self.refresh_interval_secs),
            ("tick_rate_ms", self.tick_rate_ms),
            ("frame_rate_ms", self.frame_rate_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }

    /// Log file, falling back to the platform cache directory.
    pub fn log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            ProjectDirs::from("io", "scopeview", "scopeview").map_or_else(
                || std::env::temp_dir().join("scopeview.log"),
                |dirs| dirs.cache_dir().join("scopeview.log"),
            )
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "scopeview", "scopeview").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("scopeview");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SCOPEVIEW_"))
        .extract()?;
    config.validate()?;
    Ok(config)
}
