//! Device adapters
//!
//! The device backend drives the platform through its shell tools
//! (`cmd settings`, `cmd package`, `dumpsys`). The memory backend keeps
//! everything in process and is selected with `PLATFORM_BACKEND=memory`.

mod command;
mod command_package_source;
mod command_settings_store;
mod dumpsys_usage_stats;
mod memory;

pub use command_package_source::CommandPackageSource;
pub use command_settings_store::CommandSettingsStore;
pub use dumpsys_usage_stats::DumpsysUsageStatsSource;
pub use memory::{InMemoryPackageSource, InMemorySettingsStore, InMemoryUsageStats};
