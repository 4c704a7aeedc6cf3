//! Value objects - Immutable objects defined by their attributes

mod ids;
mod outcome;
mod secure_setting;
mod setting_type;
mod usage_event;
mod user_data;

pub use ids::AppSettingId;
pub use outcome::{permission_grant_command, AppSettingsOutcome, ForegroundServiceOutcome};
pub use secure_setting::SecureSetting;
pub use setting_type::SettingType;
pub use usage_event::{LifeCycle, UsageEvent};
pub use user_data::UserData;
