//! User preference snapshot
//!
//! UserData carries serde derives because it is persisted in SQLite as
//! key/value pairs and exchanged over the REST API as-is.

use serde::{Deserialize, Serialize};

/// Preferences consulted by the apply/revert use cases
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserData {
    /// Apply a package's settings when it is launched from a shortcut or the app list
    pub use_auto_launch: bool,
    /// Run the usage-stats launch detection loop
    pub use_usage_stats_service: bool,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            use_auto_launch: false,
            use_usage_stats_service: false,
        }
    }
}

impl UserData {
    /// Load from environment variables, using defaults for missing values
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            use_auto_launch: env_or("APP_SETTINGS_AUTO_LAUNCH", defaults.use_auto_launch),
            use_usage_stats_service: env_or(
                "APP_SETTINGS_USAGE_STATS_SERVICE",
                defaults.use_usage_stats_service,
            ),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
