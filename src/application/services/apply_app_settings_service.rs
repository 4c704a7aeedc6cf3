//! Apply App Settings Service - Writes a package's rules to the device settings
//!
//! Applying and reverting share one algorithm and only differ in which value
//! of each rule is written. Writes are best effort: a failing rule never stops
//! the remaining rules, and nothing already written is rolled back. The
//! aggregate outcome ranks failures as
//! `NoPermission > InvalidValues > Failure > Success`.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::application::ports::outbound::{AppSettingRepositoryPort, SettingsStorePort, WriteOutcome};
use crate::domain::entities::AppSetting;
use crate::domain::value_objects::{AppSettingsOutcome, UserData};

/// Which value of a rule is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// `value_on_launch`
    Apply,
    /// `value_on_revert`
    Revert,
}

/// Per-invocation count of gateway results
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct WriteTally {
    applied: usize,
    permission_denied: usize,
    invalid: usize,
    errored: usize,
}

impl WriteTally {
    fn outcome(&self) -> AppSettingsOutcome {
        if self.permission_denied > 0 {
            AppSettingsOutcome::NoPermission
        } else if self.invalid > 0 {
            AppSettingsOutcome::InvalidValues
        } else if self.errored > 0 {
            AppSettingsOutcome::Failure
        } else {
            AppSettingsOutcome::Success
        }
    }
}

pub struct ApplyAppSettingsService {
    repository: Arc<dyn AppSettingRepositoryPort>,
    settings_store: Arc<dyn SettingsStorePort>,
}

impl ApplyAppSettingsService {
    pub fn new(
        repository: Arc<dyn AppSettingRepositoryPort>,
        settings_store: Arc<dyn SettingsStorePort>,
    ) -> Self {
        Self {
            repository,
            settings_store,
        }
    }

    /// Write `value_on_launch` of every enabled rule of the package
    pub async fn apply_app_settings(&self, package_name: &str) -> AppSettingsOutcome {
        self.run(package_name, ApplyMode::Apply).await
    }

    /// Write `value_on_revert` of every enabled rule of the package
    pub async fn revert_app_settings(&self, package_name: &str) -> AppSettingsOutcome {
        self.run(package_name, ApplyMode::Revert).await
    }

    /// Apply path gated on the auto-launch preference snapshot
    pub async fn auto_launch(&self, package_name: &str, user_data: &UserData) -> AppSettingsOutcome {
        if !user_data.use_auto_launch {
            debug!(package_name, "Auto launch disabled, skipping apply");
            return AppSettingsOutcome::Failure;
        }
        self.run(package_name, ApplyMode::Apply).await
    }

    #[instrument(skip(self))]
    pub async fn run(&self, package_name: &str, mode: ApplyMode) -> AppSettingsOutcome {
        let app_settings = match self.repository.get_by_package_name(package_name).await {
            Ok(app_settings) => app_settings,
            Err(e) => {
                error!("Failed to load app settings: {}", e);
                return AppSettingsOutcome::Failure;
            }
        };

        if app_settings.is_empty() {
            return AppSettingsOutcome::EmptyAppSettings;
        }

        let enabled: Vec<&AppSetting> = app_settings.iter().filter(|rule| rule.enabled).collect();
        if enabled.is_empty() {
            return AppSettingsOutcome::DisabledAppSettings;
        }

        let tally = self.write_all(&enabled, mode).await;
        let outcome = tally.outcome();

        info!(
            applied = tally.applied,
            permission_denied = tally.permission_denied,
            invalid = tally.invalid,
            errored = tally.errored,
            ?outcome,
            "App settings {}",
            match mode {
                ApplyMode::Apply => "applied",
                ApplyMode::Revert => "reverted",
            }
        );
        outcome
    }

    async fn write_all(&self, rules: &[&AppSetting], mode: ApplyMode) -> WriteTally {
        let mut tally = WriteTally::default();

        for rule in rules {
            let value = rule.value_for(mode == ApplyMode::Apply);
            match self.settings_store.put(rule.setting_type, &rule.key, value).await {
                Ok(WriteOutcome::Applied) => tally.applied += 1,
                Ok(WriteOutcome::PermissionDenied) => {
                    warn!(setting_type = %rule.setting_type, key = %rule.key, "Permission denied");
                    tally.permission_denied += 1;
                }
                Ok(WriteOutcome::InvalidValue) => {
                    warn!(setting_type = %rule.setting_type, key = %rule.key, value, "Invalid value");
                    tally.invalid += 1;
                }
                Err(e) => {
                    error!(setting_type = %rule.setting_type, key = %rule.key, "Settings write failed: {}", e);
                    tally.errored += 1;
                }
            }
        }

        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::watch;

    use crate::application::ports::outbound::RepositoryError;
    use crate::domain::value_objects::{AppSettingId, SettingType};
    use crate::infrastructure::persistence::InMemoryAppSettingRepository;
    use crate::infrastructure::platform::InMemorySettingsStore;

    const PACKAGE: &str = "com.example.app";

    struct Fixture {
        repository: Arc<InMemoryAppSettingRepository>,
        store: Arc<InMemorySettingsStore>,
        service: ApplyAppSettingsService,
    }

    fn fixture(secure_permission: bool) -> Fixture {
        let repository = Arc::new(InMemoryAppSettingRepository::new());
        let store = Arc::new(InMemorySettingsStore::new(secure_permission));
        let service = ApplyAppSettingsService::new(repository.clone(), store.clone());
        Fixture {
            repository,
            store,
            service,
        }
    }

    fn rule(setting_type: SettingType, key: &str) -> AppSetting {
        AppSetting::new(PACKAGE, setting_type, key, "1", "0")
    }

    struct BrokenRepository;

    #[async_trait]
    impl AppSettingRepositoryPort for BrokenRepository {
        async fn upsert(&self, _: &AppSetting) -> Result<AppSetting, RepositoryError> {
            Err(RepositoryError::Database("closed".to_string()))
        }
        async fn delete(&self, _: &AppSetting) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database("closed".to_string()))
        }
        async fn get_by_id(&self, _: AppSettingId) -> Result<Option<AppSetting>, RepositoryError> {
            Err(RepositoryError::Database("closed".to_string()))
        }
        async fn get_by_package_name(&self, _: &str) -> Result<Vec<AppSetting>, RepositoryError> {
            Err(RepositoryError::Database("closed".to_string()))
        }
        async fn get_all(&self) -> Result<Vec<AppSetting>, RepositoryError> {
            Err(RepositoryError::Database("closed".to_string()))
        }
        async fn delete_by_package_names(&self, _: &[String]) -> Result<u64, RepositoryError> {
            Err(RepositoryError::Database("closed".to_string()))
        }
        fn subscribe(&self) -> watch::Receiver<u64> {
            watch::channel(0).1
        }
    }

    #[tokio::test]
    async fn test_no_rules_is_empty() {
        let f = fixture(true);
        assert_eq!(f.service.apply_app_settings(PACKAGE).await, AppSettingsOutcome::EmptyAppSettings);
        assert_eq!(f.service.revert_app_settings(PACKAGE).await, AppSettingsOutcome::EmptyAppSettings);
    }

    #[tokio::test]
    async fn test_only_disabled_rules_is_disabled_and_writes_nothing() {
        let f = fixture(true);
        f.repository
            .upsert(&rule(SettingType::System, "k").with_enabled(false))
            .await
            .unwrap();

        assert_eq!(f.service.apply_app_settings(PACKAGE).await, AppSettingsOutcome::DisabledAppSettings);
        assert_eq!(f.service.revert_app_settings(PACKAGE).await, AppSettingsOutcome::DisabledAppSettings);
        assert!(f.store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_apply_then_revert_writes_both_values() {
        let f = fixture(true);
        f.repository.upsert(&rule(SettingType::System, "k")).await.unwrap();

        assert_eq!(f.service.apply_app_settings(PACKAGE).await, AppSettingsOutcome::Success);
        assert_eq!(f.store.value(SettingType::System, "k").await.as_deref(), Some("1"));

        assert_eq!(f.service.revert_app_settings(PACKAGE).await, AppSettingsOutcome::Success);
        assert_eq!(f.store.value(SettingType::System, "k").await.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_disabled_rules_are_skipped_among_enabled_ones() {
        let f = fixture(true);
        f.repository.upsert(&rule(SettingType::System, "on")).await.unwrap();
        f.repository
            .upsert(&rule(SettingType::System, "off").with_enabled(false))
            .await
            .unwrap();

        assert_eq!(f.service.apply_app_settings(PACKAGE).await, AppSettingsOutcome::Success);
        let writes = f.store.writes().await;
        assert_eq!(writes, vec![(SettingType::System, "on".to_string(), "1".to_string())]);
    }

    #[tokio::test]
    async fn test_secure_without_permission_is_no_permission() {
        let f = fixture(false);
        f.repository.upsert(&rule(SettingType::Secure, "k")).await.unwrap();

        assert_eq!(f.service.apply_app_settings(PACKAGE).await, AppSettingsOutcome::NoPermission);
    }

    #[tokio::test]
    async fn test_partial_application_survives_permission_failure() {
        let f = fixture(false);
        // the denied write comes first so the system write has to happen after it
        f.repository.upsert(&rule(SettingType::Secure, "secure_key")).await.unwrap();
        f.repository.upsert(&rule(SettingType::System, "system_key")).await.unwrap();

        assert_eq!(f.service.apply_app_settings(PACKAGE).await, AppSettingsOutcome::NoPermission);
        assert_eq!(f.store.value(SettingType::System, "system_key").await.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_invalid_value_is_reported() {
        let f = fixture(true);
        f.store.reject_key("bad").await;
        f.repository.upsert(&rule(SettingType::Global, "bad")).await.unwrap();
        f.repository.upsert(&rule(SettingType::Global, "good")).await.unwrap();

        assert_eq!(f.service.apply_app_settings(PACKAGE).await, AppSettingsOutcome::InvalidValues);
        assert_eq!(f.store.value(SettingType::Global, "good").await.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_permission_outranks_invalid_value() {
        let f = fixture(false);
        f.store.reject_key("bad").await;
        f.repository.upsert(&rule(SettingType::System, "bad")).await.unwrap();
        f.repository.upsert(&rule(SettingType::Secure, "k")).await.unwrap();

        assert_eq!(f.service.revert_app_settings(PACKAGE).await, AppSettingsOutcome::NoPermission);
    }

    #[tokio::test]
    async fn test_unavailable_store_is_failure() {
        let f = fixture(true);
        f.store.set_unavailable(true);
        f.repository.upsert(&rule(SettingType::System, "k")).await.unwrap();

        assert_eq!(f.service.apply_app_settings(PACKAGE).await, AppSettingsOutcome::Failure);
    }

    #[tokio::test]
    async fn test_repository_error_is_failure() {
        let store = Arc::new(InMemorySettingsStore::new(true));
        let service = ApplyAppSettingsService::new(Arc::new(BrokenRepository), store.clone());

        assert_eq!(service.apply_app_settings(PACKAGE).await, AppSettingsOutcome::Failure);
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_auto_launch_respects_preference() {
        let f = fixture(true);
        f.repository.upsert(&rule(SettingType::System, "k")).await.unwrap();

        let off = UserData {
            use_auto_launch: false,
            use_usage_stats_service: false,
        };
        assert_eq!(f.service.auto_launch(PACKAGE, &off).await, AppSettingsOutcome::Failure);
        assert!(f.store.writes().await.is_empty());

        let on = UserData {
            use_auto_launch: true,
            ..off
        };
        assert_eq!(f.service.auto_launch(PACKAGE, &on).await, AppSettingsOutcome::Success);
        assert_eq!(f.store.value(SettingType::System, "k").await.as_deref(), Some("1"));
    }

    #[test]
    fn test_tally_ranking() {
        let tally = WriteTally {
            applied: 3,
            permission_denied: 0,
            invalid: 1,
            errored: 1,
        };
        assert_eq!(tally.outcome(), AppSettingsOutcome::InvalidValues);
        assert_eq!(WriteTally::default().outcome(), AppSettingsOutcome::Success);
    }
}
