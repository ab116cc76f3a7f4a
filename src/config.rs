//! Configuration: `~/.geotime/config.json`, then environment, then CLI flags.
//!
//! Every field has a default, so a missing file (or a file that only sets a
//! few keys) is fine. A file that is not valid JSON is an error.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: '{value}'")]
    Env { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the `/api/*` proxy.
    pub api_base: String,
    /// UI language code; `None` keeps the built-in English labels.
    pub language: Option<String>,
    /// Per-request deadline. Unset means no deadline beyond the transport's own.
    pub timeout_secs: Option<u64>,
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
}

/// Upstream services behind the proxy (and behind `--direct` lookups).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub geocode_url: String,
    pub locationiq_key: Option<String>,
    pub timezone_url: String,
    pub geonames_user: Option<String>,
    pub sunrise_url: String,
    pub ip_locate_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `<lang>.json` translation maps and `language.json`.
    pub i18n_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".into(),
            language: None,
            timeout_secs: None,
            upstream: UpstreamConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocode_url: "https://us1.locationiq.com/v1/search".into(),
            locationiq_key: None,
            timezone_url: "http://api.geonames.org/timezoneJSON".into(),
            geonames_user: None,
            sunrise_url: "https://api.sunrise-sunset.org/json".into(),
            ip_locate_url: "https://ipapi.co/json/".into(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            i18n_dir: PathBuf::from("i18n"),
        }
    }
}

impl Config {
    /// Load `path` (or `~/.geotime/config.json`) and apply the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load_from(&Self::default_path())?,
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load a specific file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".geotime")
            .join("config.json")
    }

    /// Override fields from environment variables, read through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("GEOTIME_API_BASE") {
            self.api_base = v;
        }
        if let Some(v) = var("GEOTIME_LANG") {
            self.language = Some(v);
        }
        if let Some(v) = var("GEOTIME_TIMEOUT_SECS") {
            let secs = v.parse().map_err(|_| ConfigError::Env {
                key: "GEOTIME_TIMEOUT_SECS",
                value: v.clone(),
            })?;
            self.timeout_secs = Some(secs);
        }
        if let Some(v) = var("GEOTIME_HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("PORT") {
            self.server.port = v.parse().map_err(|_| ConfigError::Env {
                key: "PORT",
                value: v.clone(),
            })?;
        }
        if let Some(v) = var("GEOTIME_I18N_DIR") {
            self.server.i18n_dir = PathBuf::from(v);
        }
        if let Some(v) = var("LOCATIONIQ_KEY") {
            self.upstream.locationiq_key = Some(v);
        }
        if let Some(v) = var("GEONAMES_USER") {
            self.upstream.geonames_user = Some(v);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
