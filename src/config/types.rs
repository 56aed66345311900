//! Configuration types and structures.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default cookie carrying the session token.
pub const DEFAULT_SESSION_COOKIE: &str = "devboard.session-token";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub board: BoardConfig,
}

impl Config {
    /// Load a single YAML file with no tier merging.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        // Empty or comment-only files parse as null
        let config: Option<Config> = serde_yaml::from_str(&content)?;
        Ok(config.unwrap_or_default())
    }
}

/// HTTP server and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("devboard/devboard.db")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Session handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of sessions issued by `devboard session` and `seed` (default: 30 days).
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,

    /// Cookie name checked when no bearer token is present.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            cookie_name: default_cookie_name(),
        }
    }
}

impl AuthConfig {
    pub fn session_ttl_ms(&self) -> i64 {
        (self.session_ttl_hours as i64).saturating_mul(3_600_000)
    }
}

fn default_session_ttl_hours() -> u64 {
    24 * 30
}

fn default_cookie_name() -> String {
    DEFAULT_SESSION_COOKIE.to_string()
}

/// Permanent removal of soft-deleted tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Run the background sweep while serving.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Tasks soft-deleted longer than this many days are purged (default: 30).
    #[serde(default = "default_retention_days")]
    pub days: u32,

    /// Seconds between background sweeps (default: one day).
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Bearer secret for `/api/cron/cleanup-tasks`. The endpoint refuses all
    /// callers when unset.
    #[serde(default)]
    pub cron_secret: Option<String>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            days: default_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
            cron_secret: None,
        }
    }
}

impl RetentionConfig {
    pub fn retention_ms(&self) -> i64 {
        i64::from(self.days) * 86_400_000
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn default_true() -> bool {
    true
}

fn default_retention_days() -> u32 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    86_400
}

/// Client board behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// How long an undo action stays available (default: 6000 ms).
    #[serde(default = "default_undo_timeout_ms")]
    pub undo_timeout_ms: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            undo_timeout_ms: default_undo_timeout_ms(),
        }
    }
}

impl BoardConfig {
    pub fn undo_timeout(&self) -> Duration {
        Duration::from_millis(self.undo_timeout_ms)
    }
}

fn default_undo_timeout_ms() -> u64 {
    6000
}
