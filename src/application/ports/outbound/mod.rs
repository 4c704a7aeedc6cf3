//! Outbound ports - Interfaces that the application requires from external systems

mod app_setting_repository_port;
mod package_port;
mod settings_store_port;
mod usage_stats_port;
mod user_data_port;

pub use app_setting_repository_port::{AppSettingRepositoryPort, RepositoryError};
pub use package_port::{PackageError, PackagePort};
pub use settings_store_port::{SettingsStoreError, SettingsStorePort, WriteOutcome};
pub use usage_stats_port::{UsageStatsError, UsageStatsPort};
pub use user_data_port::{UserDataError, UserDataRepositoryPort};
