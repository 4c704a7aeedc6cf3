//! Application services - Use case implementations
//!
//! Each service accepts its outbound ports as `Arc<dyn Port>` and never
//! touches a concrete adapter.

pub mod app_settings_service;
pub mod apply_app_settings_service;
pub mod foreground_service;
pub mod secure_settings_service;
pub mod user_data_service;

pub use app_settings_service::{AppSettingsService, AppSettingsServiceError, UpdateAppSettingRequest};
pub use apply_app_settings_service::{ApplyAppSettingsService, ApplyMode};
pub use foreground_service::ForegroundService;
pub use secure_settings_service::SecureSettingsService;
pub use user_data_service::UserDataService;
