use async_trait::async_trait;

use crate::domain::value_objects::{SecureSetting, SettingType};

/// Classified result of a single settings write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The platform accepted the value
    Applied,
    /// The caller lacks the privilege for this namespace
    PermissionDenied,
    /// The platform rejected the key or value
    InvalidValue,
}

/// Failures that are neither a permission nor a validity rejection
#[derive(Debug, thiserror::Error)]
pub enum SettingsStoreError {
    #[error("Settings command failed to run: {0}")]
    Io(String),
    #[error("Settings provider unavailable: {0}")]
    Unavailable(String),
}

/// Gateway to the device settings provider
///
/// One attempt per call, no retries. Writes across namespaces are not atomic.
#[async_trait]
pub trait SettingsStorePort: Send + Sync {
    async fn put(
        &self,
        setting_type: SettingType,
        key: &str,
        value: &str,
    ) -> Result<WriteOutcome, SettingsStoreError>;

    /// Rows currently present in a namespace, sorted by name
    async fn list(&self, setting_type: SettingType) -> Result<Vec<SecureSetting>, SettingsStoreError>;
}
