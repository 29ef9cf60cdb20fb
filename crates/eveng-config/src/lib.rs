//! Connection settings for the EVE-NG connector.
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then `EVE_NG_*` environment variables. The result converts into the
//! `SessionConfig` the connector logs in with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use eveng_core::SessionConfig;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "EVE_NG_";

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "EVE_NG_LOG";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("missing {field}: set it in the config file or EVE_NG_{env}")]
    Missing { field: &'static str, env: &'static str },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Request timeout: a humantime string (`"30s"`, `"2m"`) or whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Timeout {
    Seconds(u64),
    Text(String),
}

impl Default for Timeout {
    fn default() -> Self {
        Self::Seconds(DEFAULT_TIMEOUT_SECS)
    }
}

impl Timeout {
    pub fn duration(&self) -> Result<Duration, ConfigError> {
        let duration = match self {
            Self::Seconds(secs) => Duration::from_secs(*secs),
            Self::Text(text) => {
                humantime::parse_duration(text.trim()).map_err(|e| ConfigError::Validation {
                    field: "timeout",
                    reason: format!("'{text}': {e}"),
                })?
            }
        };
        if duration.is_zero() {
            return Err(ConfigError::Validation {
                field: "timeout",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(duration)
    }
}

/// Everything needed to reach one EVE-NG server.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Platform root URL, e.g. `https://eve.lab.local`.
    pub endpoint: Option<String>,

    pub username: Option<String>,

    /// Never written back to disk.
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,

    /// Accept self-signed certificates. `EVE_NG_INSECURE` in the environment.
    #[serde(default)]
    pub insecure_skip_verify: bool,

    #[serde(default)]
    pub timeout: Timeout,
}

impl Settings {
    /// Validate and convert into a session configuration.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        let endpoint = non_empty(self.endpoint.as_deref()).ok_or(ConfigError::Missing {
            field: "endpoint",
            env: "ENDPOINT",
        })?;
        let endpoint = Url::parse(endpoint).map_err(|e| ConfigError::Validation {
            field: "endpoint",
            reason: format!("'{endpoint}': {e}"),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "endpoint",
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        let username = non_empty(self.username.as_deref()).ok_or(ConfigError::Missing {
            field: "username",
            env: "USERNAME",
        })?;
        let password = self.password.clone().ok_or(ConfigError::Missing {
            field: "password",
            env: "PASSWORD",
        })?;

        Ok(SessionConfig {
            endpoint,
            username: username.to_owned(),
            password,
            insecure_skip_verify: self.insecure_skip_verify,
            timeout: self.timeout.duration()?,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "eveng").map_or_else(
        || PathBuf::from(".eveng").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

fn env() -> Env {
    Env::prefixed(ENV_PREFIX)
        .ignore(&["log"])
        .map(|key| {
            // Keys arrive with their original casing (`INSECURE`).
            if key.as_str().eq_ignore_ascii_case("insecure") {
                "insecure_skip_verify".into()
            } else {
                key.as_str().to_owned().into()
            }
        })
}

/// The layered figment: defaults, then `file` (or the default path),
/// then the environment.
pub fn figment(file: Option<&Path>) -> Figment {
    let path = file.map_or_else(config_path, Path::to_path_buf);
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(env())
}

/// Load settings. A missing file is not an error.
pub fn load(file: Option<&Path>) -> Result<Settings, ConfigError> {
    Ok(figment(file).extract()?)
}

/// Load and convert in one step.
pub fn load_session_config(file: Option<&Path>) -> Result<SessionConfig, ConfigError> {
    load(file)?.to_session_config()
}

/// Write `settings` as TOML, creating parent directories. The password is
/// left out.
pub fn save(settings: &Settings, file: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, toml::to_string_pretty(settings)?)?;
    Ok(())
}

// ── Tracing ─────────────────────────────────────────────────────────

/// Install a fmt subscriber. `EVE_NG_LOG` wins over `verbosity` when set.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
