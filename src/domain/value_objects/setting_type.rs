//! Device settings namespaces

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The platform settings table a rule's key lives in.
///
/// `System` is writable by any app holding the ordinary write-settings grant.
/// `Secure` and `Global` require `WRITE_SECURE_SETTINGS`, which can only be
/// granted from an elevated shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingType {
    System,
    Secure,
    Global,
}

impl SettingType {
    /// Namespace name as understood by the `settings` shell command
    pub fn namespace(&self) -> &'static str {
        match self {
            SettingType::System => "system",
            SettingType::Secure => "secure",
            SettingType::Global => "global",
        }
    }

    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingType::System => "SYSTEM",
            SettingType::Secure => "SECURE",
            SettingType::Global => "GLOBAL",
        }
    }

    pub fn requires_secure_permission(&self) -> bool {
        !matches!(self, SettingType::System)
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown setting type: {0}")]
pub struct ParseSettingTypeError(pub String);

impl FromStr for SettingType {
    type Err = ParseSettingTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SYSTEM" => Ok(SettingType::System),
            "SECURE" => Ok(SettingType::Secure),
            "GLOBAL" => Ok(SettingType::Global),
            _ => Err(ParseSettingTypeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("system".parse::<SettingType>().unwrap(), SettingType::System);
        assert_eq!("Secure".parse::<SettingType>().unwrap(), SettingType::Secure);
        assert_eq!(" GLOBAL ".parse::<SettingType>().unwrap(), SettingType::Global);
        assert!("vendor".parse::<SettingType>().is_err());
    }

    #[test]
    fn test_only_system_is_unprivileged() {
        assert!(!SettingType::System.requires_secure_permission());
        assert!(SettingType::Secure.requires_secure_permission());
        assert!(SettingType::Global.requires_secure_permission());
    }

    #[test]
    fn test_serde_uses_upper_case_names() {
        let json = serde_json::to_string(&SettingType::Global).unwrap();
        assert_eq!(json, "\"GLOBAL\"");
        let parsed: SettingType = serde_json::from_str("\"SECURE\"").unwrap();
        assert_eq!(parsed, SettingType::Secure);
    }

    #[test]
    fn test_usable_as_ordered_map_key() {
        let mut values = std::collections::BTreeMap::new();
        values.insert((SettingType::Global, "k".to_string()), "2");
        values.insert((SettingType::System, "k".to_string()), "1");

        let order: Vec<_> = values.keys().map(|(setting_type, _)| *setting_type).collect();
        assert_eq!(order, vec![SettingType::System, SettingType::Global]);
        assert_eq!(values.get(&(SettingType::System, "k".to_string())), Some(&"1"));
    }
}
