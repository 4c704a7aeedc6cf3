//! AppSetting entity - One settings key toggled when a target package is launched

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AppSettingId, SettingType};

/// A rule mapping one settings key to a launch/revert value pair for a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSetting {
    /// Assigned by storage; `None` until first persisted
    pub id: Option<AppSettingId>,
    /// Only enabled rules are written
    pub enabled: bool,
    pub setting_type: SettingType,
    /// Target app the rule belongs to
    pub package_name: String,
    /// Display name
    pub label: String,
    /// Key inside the `setting_type` namespace
    pub key: String,
    /// Written when the target app comes to the foreground
    pub value_on_launch: String,
    /// Written when the target app leaves the foreground
    pub value_on_revert: String,
}

impl AppSetting {
    pub fn new(
        package_name: impl Into<String>,
        setting_type: SettingType,
        key: impl Into<String>,
        value_on_launch: impl Into<String>,
        value_on_revert: impl Into<String>,
    ) -> Self {
        let key = key.into();
        Self {
            id: None,
            enabled: true,
            setting_type,
            package_name: package_name.into(),
            label: key.clone(),
            key,
            value_on_launch: value_on_launch.into(),
            value_on_revert: value_on_revert.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_id(mut self, id: AppSettingId) -> Self {
        self.id = Some(id);
        self
    }

    /// Value to write for the given direction
    pub fn value_for(&self, on_launch: bool) -> &str {
        if on_launch {
            &self.value_on_launch
        } else {
            &self.value_on_revert
        }
    }

    /// Fields compared when deciding whether two rules carry the same content
    pub fn same_content(&self, other: &AppSetting) -> bool {
        self.enabled == other.enabled
            && self.setting_type == other.setting_type
            && self.package_name == other.package_name
            && self.label == other.label
            && self.key == other.key
            && self.value_on_launch == other.value_on_launch
            && self.value_on_revert == other.value_on_revert
    }

    /// Check the creation invariants, reporting every blank field at once
    pub fn validate(&self) -> Result<(), AppSettingValidationError> {
        let mut fields = Vec::new();
        if self.package_name.trim().is_empty() {
            fields.push("package_name");
        }
        if self.label.trim().is_empty() {
            fields.push("label");
        }
        if self.key.trim().is_empty() {
            fields.push("key");
        }
        if self.value_on_launch.trim().is_empty() {
            fields.push("value_on_launch");
        }
        if self.value_on_revert.trim().is_empty() {
            fields.push("value_on_revert");
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppSettingValidationError { fields })
        }
    }
}

/// Input of the add-setting flow
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppSetting {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub setting_type: SettingType,
    pub package_name: String,
    pub label: String,
    pub key: String,
    pub value_on_launch: String,
    pub value_on_revert: String,
}

fn default_enabled() -> bool {
    true
}

impl From<NewAppSetting> for AppSetting {
    fn from(new: NewAppSetting) -> Self {
        Self {
            id: None,
            enabled: new.enabled,
            setting_type: new.setting_type,
            package_name: new.package_name,
            label: new.label,
            key: new.key,
            value_on_launch: new.value_on_launch,
            value_on_revert: new.value_on_revert,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Fields must not be blank: {}", .fields.join(", "))]
pub struct AppSettingValidationError {
    pub fields: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rule_is_enabled_and_unpersisted() {
        let rule = AppSetting::new("com.example.app", SettingType::System, "k", "1", "0");
        assert!(rule.enabled);
        assert!(rule.id.is_none());
        assert_eq!(rule.label, "k");
        assert_eq!(rule.value_for(true), "1");
        assert_eq!(rule.value_for(false), "0");
    }

    #[test]
    fn test_validate_reports_every_blank_field() {
        let rule = AppSetting::new("com.example.app", SettingType::Secure, " ", "", "0")
            .with_label("");
        let err = rule.validate().unwrap_err();
        assert_eq!(err.fields, vec!["label", "key", "value_on_launch"]);
        assert!(err.to_string().contains("label, key, value_on_launch"));
    }

    #[test]
    fn test_validate_accepts_complete_rule() {
        let rule = AppSetting::new("com.example.app", SettingType::Global, "k", "1", "0")
            .with_label("Animations");
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_same_content_ignores_identity() {
        let a = AppSetting::new("com.example.app", SettingType::System, "k", "1", "0");
        let b = a.clone().with_id(AppSettingId::from_i64(7));
        assert!(a.same_content(&b));
        assert!(!a.same_content(&b.with_enabled(false)));
    }
}
