//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILJSON_CONFIG` (environment variable)
//! 2. `~/.config/mailjson/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailjson\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// HTTP fetching used for remote sources and body links.
    pub fetch: FetchConfig,
    /// Resolution engine limits.
    pub resolve: ResolveConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// HTTP fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds (0 = no timeout).
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Largest response body accepted, in bytes (default: 10485760 = 10 MB).
    pub max_body_bytes: u64,
}

/// Resolution engine limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Overall deadline for one resolution in seconds (0 = unbounded).
    pub deadline_secs: u64,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("mailjson/{}", env!("CARGO_PKG_VERSION")),
            max_body_bytes: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self { deadline_secs: 120 }
    }
}

impl FetchConfig {
    /// Per-request timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        secs_to_duration(self.timeout_secs)
    }
}

impl ResolveConfig {
    /// Overall resolution deadline, `None` when unbounded.
    pub fn deadline(&self) -> Option<Duration> {
        secs_to_duration(self.deadline_secs)
    }
}

fn secs_to_duration(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILJSON_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailjson").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailjson")
}
