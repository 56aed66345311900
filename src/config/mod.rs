//! Unified configuration system.
//!
//! Consolidates configuration from tiers with field-by-field YAML merging:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/devboard/config.yaml`
//! 3. **User** - `~/.devboard/config.yaml`
//! 4. **Environment** - variables below
//!
//! ## Environment Variables
//! - `DEVBOARD_CONFIG_PATH` - Explicit config file (skips tiers 1-3 merging)
//! - `DEVBOARD_DB_PATH` - Database path
//! - `DEVBOARD_HOST` / `DEVBOARD_PORT` - Bind address
//! - `CRON_SECRET` - Bearer secret for the cleanup endpoint
//! - `DEVBOARD_USER_DIR` - User config dir (default: `~/.devboard`)
//! - `DEVBOARD_PROJECT_DIR` - Project config dir (default: `./devboard`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier, apply_env_overrides};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
