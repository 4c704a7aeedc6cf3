use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::entities::AppSetting;
use crate::domain::value_objects::AppSettingId;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// Persistence for AppSetting rules
///
/// Every mutation bumps the change counter published through [`subscribe`],
/// which is how per-package observers learn that a fresh snapshot is due.
///
/// [`subscribe`]: AppSettingRepositoryPort::subscribe
#[async_trait]
pub trait AppSettingRepositoryPort: Send + Sync {
    /// Insert the rule, or overwrite the row with the same identity.
    ///
    /// Identity is the id when present, otherwise the
    /// `(package_name, setting_type, key)` triple. Returns the stored rule
    /// with its id assigned.
    async fn upsert(&self, app_setting: &AppSetting) -> Result<AppSetting, RepositoryError>;

    /// Remove by identity; absent rules are not an error
    async fn delete(&self, app_setting: &AppSetting) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: AppSettingId) -> Result<Option<AppSetting>, RepositoryError>;

    /// Current rule set of a package, ordered by id
    async fn get_by_package_name(&self, package_name: &str) -> Result<Vec<AppSetting>, RepositoryError>;

    /// Every stored rule, ordered by id
    async fn get_all(&self) -> Result<Vec<AppSetting>, RepositoryError>;

    /// Bulk delete for orphan cleanup; returns the number of removed rules
    async fn delete_by_package_names(&self, package_names: &[String]) -> Result<u64, RepositoryError>;

    /// Change counter, incremented after every mutation
    fn subscribe(&self) -> watch::Receiver<u64>;
}
