//! Domain entities - Core business objects with identity

mod app_setting;

pub use app_setting::{AppSetting, AppSettingValidationError, NewAppSetting};
