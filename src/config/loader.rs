//! Configuration loader with tier-based merging.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/devboard/)
    Project = 1,
    /// User-level config (~/.devboard/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where each tier lives.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit config file; bypasses tier merging entirely.
    pub explicit: Option<PathBuf>,
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let explicit = std::env::var("DEVBOARD_CONFIG_PATH").ok().map(PathBuf::from);

        // User dir: DEVBOARD_USER_DIR or ~/.devboard
        let user_dir = std::env::var("DEVBOARD_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".devboard")));

        // Project dir: DEVBOARD_PROJECT_DIR or $CWD/devboard
        let project_dir = std::env::var("DEVBOARD_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("devboard")));

        Self {
            explicit,
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit: None,
            project_dir,
            user_dir,
        }
    }
}

/// Read a tier's `config.yaml`, if present and parseable.
fn read_tier(dir: Option<&Path>, tier: ConfigTier) -> Option<(PathBuf, Value)> {
    let file = dir?.join("config.yaml");
    if !file.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(&file) {
        Ok(content) => content,
        Err(e) => {
            warn!(tier = %tier, path = %file.display(), "Failed to read config: {}", e);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => Some((file, value)),
        Err(e) => {
            warn!(tier = %tier, path = %file.display(), "Ignoring invalid config: {}", e);
            None
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: Config,
    /// Highest-priority config file that contributed (if any)
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        if let Some(explicit) = &paths.explicit {
            let mut config = Config::load(explicit)
                .with_context(|| format!("loading config file {}", explicit.display()))?;
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            return Ok(Self {
                config_path: Some(explicit.clone()),
                paths,
                config,
            });
        }

        let mut configs: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut config_path = None;

        for (dir, tier) in [
            (paths.project_dir.as_deref(), ConfigTier::Project),
            (paths.user_dir.as_deref(), ConfigTier::User),
        ] {
            if let Some((file, value)) = read_tier(dir, tier) {
                configs.push(value);
                config_path = Some(file);
            }
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Get the config file path that was used.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Apply environment-tier overrides. `lookup` abstracts `std::env::var`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(db_path) = lookup("DEVBOARD_DB_PATH") {
        config.server.db_path = PathBuf::from(db_path);
    }

    if let Some(host) = lookup("DEVBOARD_HOST") {
        config.server.host = host;
    }

    if let Some(port) = lookup("DEVBOARD_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "Ignoring invalid DEVBOARD_PORT"),
        }
    }

    if let Some(secret) = lookup("CRON_SECRET").filter(|s| !s.is_empty()) {
        config.retention.cron_secret = Some(secret);
    }
}
