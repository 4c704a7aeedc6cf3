use std::sync::Arc;

use crate::application::ports::outbound::{SettingsStoreError, SettingsStorePort};
use crate::domain::value_objects::{SecureSetting, SettingType};

/// Maximum number of matches returned to the key picker
pub const SEARCH_LIMIT: usize = 20;

/// Lookup of the keys currently present on the device, used to help users
/// pick a key when adding a rule
pub struct SecureSettingsService {
    settings_store: Arc<dyn SettingsStorePort>,
}

impl SecureSettingsService {
    pub fn new(settings_store: Arc<dyn SettingsStorePort>) -> Self {
        Self { settings_store }
    }

    pub async fn search(&self, setting_type: SettingType, text: &str) -> Result<Vec<SecureSetting>, SettingsStoreError> {
        let settings = self.settings_store.list(setting_type).await?;

        Ok(settings
            .into_iter()
            .filter(|setting| setting.name.as_deref().is_some_and(|name| name.contains(text)))
            .take(SEARCH_LIMIT)
            .collect())
    }
}
