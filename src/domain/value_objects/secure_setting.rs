use serde::{Deserialize, Serialize};

use super::SettingType;

/// A row currently present in one of the device settings tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureSetting {
    pub setting_type: SettingType,
    pub id: Option<i64>,
    pub name: Option<String>,
    pub value: Option<String>,
}
