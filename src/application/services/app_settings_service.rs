//! App Settings Service - Management of the rules stored per target package
//!
//! Covers the add-setting flow, in-place edits, enable toggles, deletion,
//! per-package snapshots and live observation, and removal of rules whose
//! package is no longer installed.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::{
    AppSettingRepositoryPort, PackageError, PackagePort, RepositoryError,
};
use crate::domain::entities::{AppSetting, AppSettingValidationError, NewAppSetting};
use crate::domain::value_objects::AppSettingId;

#[derive(Debug, thiserror::Error)]
pub enum AppSettingsServiceError {
    #[error(transparent)]
    Validation(#[from] AppSettingValidationError),
    #[error("A setting with key '{key}' already exists for {package_name}")]
    DuplicateKey { package_name: String, key: String },
    #[error("App setting {0} not found")]
    NotFound(AppSettingId),
    #[error("No installed packages reported, refusing to clean app settings")]
    NoInstalledPackages,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Request to edit an existing rule; the setting type cannot change
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateAppSettingRequest {
    pub enabled: Option<bool>,
    pub label: Option<String>,
    pub key: Option<String>,
    pub value_on_launch: Option<String>,
    pub value_on_revert: Option<String>,
}

pub struct AppSettingsService {
    repository: Arc<dyn AppSettingRepositoryPort>,
    packages: Arc<dyn PackagePort>,
}

impl AppSettingsService {
    pub fn new(repository: Arc<dyn AppSettingRepositoryPort>, packages: Arc<dyn PackagePort>) -> Self {
        Self {
            repository,
            packages,
        }
    }

    /// Validate and store a new rule, refusing a key the package already uses
    #[instrument(skip(self, new), fields(package_name = %new.package_name, key = %new.key))]
    pub async fn add_app_setting(&self, new: NewAppSetting) -> Result<AppSetting, AppSettingsServiceError> {
        let app_setting = AppSetting::from(new);
        app_setting.validate()?;

        let existing = self.repository.get_by_package_name(&app_setting.package_name).await?;
        if existing.iter().any(|rule| rule.key == app_setting.key) {
            return Err(AppSettingsServiceError::DuplicateKey {
                package_name: app_setting.package_name,
                key: app_setting.key,
            });
        }

        let stored = self.repository.upsert(&app_setting).await?;
        info!(id = ?stored.id, "App setting added");
        Ok(stored)
    }

    #[instrument(skip(self, request))]
    pub async fn update_app_setting(
        &self,
        id: AppSettingId,
        request: UpdateAppSettingRequest,
    ) -> Result<AppSetting, AppSettingsServiceError> {
        let mut app_setting = self.require(id).await?;

        if let Some(enabled) = request.enabled {
            app_setting.enabled = enabled;
        }
        if let Some(label) = request.label {
            app_setting.label = label;
        }
        if let Some(key) = request.key {
            app_setting.key = key;
        }
        if let Some(value_on_launch) = request.value_on_launch {
            app_setting.value_on_launch = value_on_launch;
        }
        if let Some(value_on_revert) = request.value_on_revert {
            app_setting.value_on_revert = value_on_revert;
        }
        app_setting.validate()?;

        let siblings = self.repository.get_by_package_name(&app_setting.package_name).await?;
        if siblings
            .iter()
            .any(|rule| rule.id != app_setting.id && rule.key == app_setting.key)
        {
            return Err(AppSettingsServiceError::DuplicateKey {
                package_name: app_setting.package_name,
                key: app_setting.key,
            });
        }

        Ok(self.repository.upsert(&app_setting).await?)
    }

    pub async fn set_enabled(&self, id: AppSettingId, enabled: bool) -> Result<AppSetting, AppSettingsServiceError> {
        let app_setting = self.require(id).await?.with_enabled(enabled);
        debug!(%id, enabled, "Toggling app setting");
        Ok(self.repository.upsert(&app_setting).await?)
    }

    pub async fn delete_app_setting(&self, id: AppSettingId) -> Result<(), AppSettingsServiceError> {
        let app_setting = self.require(id).await?;
        self.repository.delete(&app_setting).await?;
        info!(%id, package_name = %app_setting.package_name, "App setting deleted");
        Ok(())
    }

    pub async fn get_app_setting(&self, id: AppSettingId) -> Result<Option<AppSetting>, AppSettingsServiceError> {
        Ok(self.repository.get_by_id(id).await?)
    }

    pub async fn get_app_settings(&self, package_name: &str) -> Result<Vec<AppSetting>, AppSettingsServiceError> {
        Ok(self.repository.get_by_package_name(package_name).await?)
    }

    /// Live rule set of a package.
    ///
    /// Yields the current snapshot right away, then a new one after every
    /// storage change that alters it. Each observer reads at its own pace and
    /// only ever sees the latest snapshot, never a backlog.
    pub fn observe_app_settings(
        &self,
        package_name: &str,
    ) -> BoxStream<'static, Result<Vec<AppSetting>, RepositoryError>> {
        let state = ObserveState {
            changes: self.repository.subscribe(),
            repository: self.repository.clone(),
            package_name: package_name.to_string(),
            last: None,
            primed: false,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if state.primed && state.changes.changed().await.is_err() {
                    return None;
                }
                state.primed = true;
                let _ = state.changes.borrow_and_update();

                let result = state.repository.get_by_package_name(&state.package_name).await;
                match result {
                    Ok(snapshot) if state.last.as_ref() == Some(&snapshot) => continue,
                    Ok(snapshot) => {
                        state.last = Some(snapshot.clone());
                        return Some((Ok(snapshot), state));
                    }
                    Err(e) => return Some((Err(e), state)),
                }
            }
        })
        .boxed()
    }

    /// Delete rules of packages that are no longer installed; returns their names
    #[instrument(skip(self))]
    pub async fn clean_app_settings(&self) -> Result<Vec<String>, AppSettingsServiceError> {
        let installed: BTreeSet<String> = self
            .packages
            .installed_package_names()
            .await?
            .into_iter()
            .collect();
        if installed.is_empty() {
            return Err(AppSettingsServiceError::NoInstalledPackages);
        }

        let orphaned: Vec<String> = self
            .repository
            .get_all()
            .await?
            .into_iter()
            .map(|rule| rule.package_name)
            .filter(|package_name| !installed.contains(package_name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if !orphaned.is_empty() {
            let removed = self.repository.delete_by_package_names(&orphaned).await?;
            info!(removed, packages = ?orphaned, "Removed app settings of uninstalled packages");
        }
        Ok(orphaned)
    }

    async fn require(&self, id: AppSettingId) -> Result<AppSetting, AppSettingsServiceError> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(AppSettingsServiceError::NotFound(id))
    }
}

struct ObserveState {
    repository: Arc<dyn AppSettingRepositoryPort>,
    changes: watch::Receiver<u64>,
    package_name: String,
    last: Option<Vec<AppSetting>>,
    primed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SettingType;
    use crate::infrastructure::persistence::InMemoryAppSettingRepository;
    use crate::infrastructure::platform::InMemoryPackageSource;

    const PACKAGE: &str = "com.example.app";

    fn service() -> (Arc<InMemoryAppSettingRepository>, Arc<InMemoryPackageSource>, AppSettingsService) {
        let repository = Arc::new(InMemoryAppSettingRepository::new());
        let packages = Arc::new(InMemoryPackageSource::new(vec![PACKAGE.to_string()]));
        let service = AppSettingsService::new(repository.clone(), packages.clone());
        (repository, packages, service)
    }

    fn new_setting(key: &str, label: &str) -> NewAppSetting {
        NewAppSetting {
            enabled: true,
            setting_type: SettingType::System,
            package_name: PACKAGE.to_string(),
            label: label.to_string(),
            key: key.to_string(),
            value_on_launch: "1".to_string(),
            value_on_revert: "0".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_assigns_id() {
        let (_, _, service) = service();
        let stored = service.add_app_setting(new_setting("k", "A")).await.unwrap();
        assert!(stored.id.is_some());
        assert_eq!(service.get_app_settings(PACKAGE).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_fields() {
        let (_, _, service) = service();
        let mut new = new_setting("k", "A");
        new.value_on_revert = "  ".to_string();

        let err = service.add_app_setting(new).await.unwrap_err();
        assert!(matches!(err, AppSettingsServiceError::Validation(e) if e.fields == vec!["value_on_revert"]));
    }

    #[tokio::test]
    async fn test_add_rejects_duplicate_key() {
        let (_, _, service) = service();
        service.add_app_setting(new_setting("k", "A")).await.unwrap();

        let err = service.add_app_setting(new_setting("k", "B")).await.unwrap_err();
        assert!(matches!(err, AppSettingsServiceError::DuplicateKey { .. }));
        assert_eq!(service.get_app_settings(PACKAGE).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_changes_fields_in_place() {
        let (_, _, service) = service();
        let stored = service.add_app_setting(new_setting("k", "A")).await.unwrap();
        let id = stored.id.unwrap();

        let updated = service
            .update_app_setting(
                id,
                UpdateAppSettingRequest {
                    enabled: None,
                    label: Some("B".to_string()),
                    key: None,
                    value_on_launch: Some("2".to_string()),
                    value_on_revert: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.label, "B");
        assert_eq!(updated.value_on_launch, "2");
        assert_eq!(updated.setting_type, SettingType::System);
        assert_eq!(service.get_app_settings(PACKAGE).await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn test_update_cannot_take_sibling_key() {
        let (_, _, service) = service();
        service.add_app_setting(new_setting("a", "A")).await.unwrap();
        let b = service.add_app_setting(new_setting("b", "B")).await.unwrap();

        let err = service
            .update_app_setting(
                b.id.unwrap(),
                UpdateAppSettingRequest {
                    enabled: None,
                    label: None,
                    key: Some("a".to_string()),
                    value_on_launch: None,
                    value_on_revert: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppSettingsServiceError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_toggle_and_delete() {
        let (_, _, service) = service();
        let stored = service.add_app_setting(new_setting("k", "A")).await.unwrap();
        let id = stored.id.unwrap();

        let toggled = service.set_enabled(id, false).await.unwrap();
        assert!(!toggled.enabled);

        service.delete_app_setting(id).await.unwrap();
        assert!(service.get_app_settings(PACKAGE).await.unwrap().is_empty());
        assert!(matches!(
            service.delete_app_setting(id).await.unwrap_err(),
            AppSettingsServiceError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_clean_removes_only_uninstalled_packages() {
        let (repository, _, service) = service();
        service.add_app_setting(new_setting("k", "A")).await.unwrap();
        repository
            .upsert(&AppSetting::new("com.example.gone", SettingType::Secure, "k", "1", "0"))
            .await
            .unwrap();

        let removed = service.clean_app_settings().await.unwrap();

        assert_eq!(removed, vec!["com.example.gone".to_string()]);
        assert_eq!(repository.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clean_refuses_empty_package_list() {
        let (repository, packages, service) = service();
        service.add_app_setting(new_setting("k", "A")).await.unwrap();
        packages.set_packages(Vec::new()).await;

        assert!(matches!(
            service.clean_app_settings().await.unwrap_err(),
            AppSettingsServiceError::NoInstalledPackages
        ));
        assert_eq!(repository.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_observers_see_updates_after_writes() {
        let (repository, _, service) = service();
        let mut first = service.observe_app_settings(PACKAGE);
        let mut second = service.observe_app_settings(PACKAGE);

        assert!(first.next().await.unwrap().unwrap().is_empty());

        let stored = service.add_app_setting(new_setting("k", "A")).await.unwrap();
        // a write to another package does not produce a new snapshot here
        repository
            .upsert(&AppSetting::new("com.example.other", SettingType::System, "k", "1", "0"))
            .await
            .unwrap();

        assert_eq!(first.next().await.unwrap().unwrap(), vec![stored.clone()]);
        // the slow observer skips straight to the latest snapshot
        assert_eq!(second.next().await.unwrap().unwrap(), vec![stored]);
    }
}
