//! Outcome codes produced by one apply/revert invocation

use serde::{Deserialize, Serialize};

/// Result of applying or reverting the rule set of a single package.
///
/// Every invocation returns exactly one of these. Only `NoPermission` and
/// `InvalidValues` describe gateway failures; `EmptyAppSettings` and
/// `DisabledAppSettings` are informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppSettingsOutcome {
    Success,
    Failure,
    NoPermission,
    InvalidValues,
    EmptyAppSettings,
    DisabledAppSettings,
}

impl AppSettingsOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AppSettingsOutcome::Success)
    }

    /// User-facing message for toast/notification collaborators
    pub fn message(&self) -> &'static str {
        match self {
            AppSettingsOutcome::Success => "App settings applied",
            AppSettingsOutcome::Failure => "Something went wrong",
            AppSettingsOutcome::NoPermission => {
                "Not allowed to modify the settings database. Grant WRITE_SECURE_SETTINGS from an elevated shell."
            }
            AppSettingsOutcome::InvalidValues => "Could not apply settings, check the keys and values",
            AppSettingsOutcome::EmptyAppSettings => "No settings configured for this app",
            AppSettingsOutcome::DisabledAppSettings => "All settings for this app are disabled",
        }
    }
}

/// Outcome reported by the launch-detection loop, tagged with the package on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForegroundServiceOutcome {
    Success { package_name: String },
    Failure,
    NoPermission,
    InvalidValues,
    EmptyAppSettings,
    DisabledAppSettings,
}

impl ForegroundServiceOutcome {
    pub fn from_outcome(outcome: AppSettingsOutcome, package_name: &str) -> Self {
        match outcome {
            AppSettingsOutcome::Success => ForegroundServiceOutcome::Success {
                package_name: package_name.to_string(),
            },
            AppSettingsOutcome::Failure => ForegroundServiceOutcome::Failure,
            AppSettingsOutcome::NoPermission => ForegroundServiceOutcome::NoPermission,
            AppSettingsOutcome::InvalidValues => ForegroundServiceOutcome::InvalidValues,
            AppSettingsOutcome::EmptyAppSettings => ForegroundServiceOutcome::EmptyAppSettings,
            AppSettingsOutcome::DisabledAppSettings => ForegroundServiceOutcome::DisabledAppSettings,
        }
    }
}

/// Shell command that grants the secure settings permission to `app_package_name`
pub fn permission_grant_command(app_package_name: &str) -> String {
    format!("pm grant {} android.permission.WRITE_SECURE_SETTINGS", app_package_name)
}
