//! Foreground transitions reported by the usage-stats source

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeCycle {
    /// An activity of the package came to the foreground
    Resumed,
    /// An activity of the package left the foreground
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub package_name: String,
    pub lifecycle: LifeCycle,
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    pub fn resumed(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            lifecycle: LifeCycle::Resumed,
            timestamp: Utc::now(),
        }
    }

    pub fn paused(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            lifecycle: LifeCycle::Paused,
            timestamp: Utc::now(),
        }
    }
}
