//! Settings gateway backed by the `cmd settings` shell service

use async_trait::async_trait;

use super::command::{self, CommandOutput};
use crate::application::ports::outbound::{SettingsStoreError, SettingsStorePort, WriteOutcome};
use crate::domain::value_objects::{SecureSetting, SettingType};

pub struct CommandSettingsStore {
    program: String,
}

impl CommandSettingsStore {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Map the output of `settings put` onto a write outcome
fn classify_put(output: &CommandOutput) -> WriteOutcome {
    let text = output.combined();

    if text.contains("SecurityException")
        || text.contains("Security exception")
        || text.contains("Permission denial")
        || text.contains("WRITE_SECURE_SETTINGS")
    {
        return WriteOutcome::PermissionDenied;
    }

    if !output.success || text.contains("IllegalArgumentException") {
        return WriteOutcome::InvalidValue;
    }

    WriteOutcome::Applied
}

/// Parse `name=value` lines printed by `settings list`
fn parse_list(setting_type: SettingType, stdout: &str) -> Vec<SecureSetting> {
    let mut settings: Vec<SecureSetting> = stdout
        .lines()
        .filter_map(|line| {
            let (name, value) = line.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(SecureSetting {
                setting_type,
                id: None,
                name: Some(name.to_string()),
                value: match value {
                    "null" => None,
                    other => Some(other.to_string()),
                },
            })
        })
        .collect();

    settings.sort_by(|a, b| a.name.cmp(&b.name));
    settings
}

#[async_trait]
impl SettingsStorePort for CommandSettingsStore {
    async fn put(
        &self,
        setting_type: SettingType,
        key: &str,
        value: &str,
    ) -> Result<WriteOutcome, SettingsStoreError> {
        if !is_valid_key(key) {
            tracing::warn!(%setting_type, key, "Rejecting malformed settings key");
            return Ok(WriteOutcome::InvalidValue);
        }

        let output = command::run(
            &self.program,
            &["settings", "put", setting_type.namespace(), key, value],
        )
        .await
        .map_err(|e| SettingsStoreError::Io(e.to_string()))?;

        let outcome = classify_put(&output);
        if outcome != WriteOutcome::Applied {
            tracing::debug!(
                %setting_type,
                key,
                ?outcome,
                stderr = output.stderr.trim(),
                "Settings write rejected"
            );
        }
        Ok(outcome)
    }

    async fn list(&self, setting_type: SettingType) -> Result<Vec<SecureSetting>, SettingsStoreError> {
        let output = command::run(&self.program, &["settings", "list", setting_type.namespace()])
            .await
            .map_err(|e| SettingsStoreError::Io(e.to_string()))?;

        if !output.success {
            return Err(SettingsStoreError::Unavailable(output.stderr.trim().to_string()));
        }

        Ok(parse_list(setting_type, &output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(success: bool, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            success,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_classify_clean_exit_as_applied() {
        assert_eq!(classify_put(&output(true, "", "")), WriteOutcome::Applied);
    }

    #[test]
    fn test_classify_permission_denial() {
        let denied = output(
            false,
            "",
            "Security exception: Permission denial: writing to settings requires:android.permission.WRITE_SECURE_SETTINGS",
        );
        assert_eq!(classify_put(&denied), WriteOutcome::PermissionDenied);
    }

    #[test]
    fn test_classify_other_failures_as_invalid() {
        assert_eq!(classify_put(&output(false, "", "Bad arguments")), WriteOutcome::InvalidValue);
        assert_eq!(
            classify_put(&output(true, "java.lang.IllegalArgumentException: bad key", "")),
            WriteOutcome::InvalidValue
        );
    }

    #[test]
    fn test_key_validation() {
        assert!(is_valid_key("screen_off_timeout"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("two words"));
    }

    #[test]
    fn test_parse_list_sorts_and_maps_null() {
        let parsed = parse_list(
            SettingType::Global,
            "window_animation_scale=1.0\nadb_enabled=1\nbroken line\nairplane_mode_radios=null\n",
        );
        let names: Vec<_> = parsed.iter().filter_map(|s| s.name.as_deref()).collect();
        assert_eq!(names, vec!["adb_enabled", "airplane_mode_radios", "window_animation_scale"]);
        assert_eq!(parsed[1].value, None);
        assert_eq!(parsed[0].value.as_deref(), Some("1"));
        assert!(parsed.iter().all(|s| s.setting_type == SettingType::Global));
    }

    #[tokio::test]
    async fn test_missing_program_is_an_io_error() {
        let store = CommandSettingsStore::new("/nonexistent/cmd");

        let put = store.put(SettingType::System, "screen_off_timeout", "60000").await;
        assert!(matches!(put, Err(SettingsStoreError::Io(_))));

        let list = store.list(SettingType::Secure).await;
        assert!(matches!(list, Err(SettingsStoreError::Io(_))));
    }
}
