//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::watch;

use crate::application::ports::outbound::{
    AppSettingRepositoryPort, PackagePort, SettingsStorePort, UsageStatsPort, UserDataRepositoryPort,
};
use crate::application::services::{
    AppSettingsService, ApplyAppSettingsService, ForegroundService, SecureSettingsService,
    UserDataService,
};
use crate::domain::value_objects::ForegroundServiceOutcome;
use crate::infrastructure::config::{AppConfig, PlatformBackend, StorageBackend};
use crate::infrastructure::persistence::{
    InMemoryAppSettingRepository, InMemoryUserDataRepository, SqliteAppSettingRepository,
    SqliteUserDataRepository,
};
use crate::infrastructure::platform::{
    CommandPackageSource, CommandSettingsStore, DumpsysUsageStatsSource, InMemoryPackageSource,
    InMemorySettingsStore, InMemoryUsageStats,
};

/// Adapters behind every outbound port
pub struct Ports {
    pub app_settings: Arc<dyn AppSettingRepositoryPort>,
    pub user_data: Arc<dyn UserDataRepositoryPort>,
    pub settings_store: Arc<dyn SettingsStorePort>,
    pub packages: Arc<dyn PackagePort>,
    pub usage_stats: Arc<dyn UsageStatsPort>,
}

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    // Application services
    pub app_settings_service: Arc<AppSettingsService>,
    pub apply_service: Arc<ApplyAppSettingsService>,
    pub secure_settings_service: SecureSettingsService,
    pub user_data_service: Arc<UserDataService>,
    pub foreground_service: Arc<ForegroundService>,
    /// Latest outcome of the launch detection loop
    pub launch_status: watch::Sender<Option<ForegroundServiceOutcome>>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let (app_settings, user_data): (Arc<dyn AppSettingRepositoryPort>, Arc<dyn UserDataRepositoryPort>) =
            match config.storage_backend {
                StorageBackend::Sqlite => {
                    let pool = SqlitePoolOptions::new()
                        .max_connections(5)
                        .connect(&config.database_url)
                        .await
                        .with_context(|| format!("Failed to open database {}", config.database_url))?;
                    (
                        Arc::new(SqliteAppSettingRepository::new(pool.clone()).await?),
                        Arc::new(SqliteUserDataRepository::new(pool).await?),
                    )
                }
                StorageBackend::Memory => (
                    Arc::new(InMemoryAppSettingRepository::new()),
                    Arc::new(InMemoryUserDataRepository::new()),
                ),
            };

        let (settings_store, packages, usage_stats): (
            Arc<dyn SettingsStorePort>,
            Arc<dyn PackagePort>,
            Arc<dyn UsageStatsPort>,
        ) = match config.platform_backend {
            PlatformBackend::Device => (
                Arc::new(CommandSettingsStore::new(&config.settings_command)),
                Arc::new(CommandPackageSource::new(&config.settings_command)),
                Arc::new(DumpsysUsageStatsSource::new(&config.dumpsys_command)),
            ),
            PlatformBackend::Memory => (
                Arc::new(InMemorySettingsStore::new(true)),
                Arc::new(InMemoryPackageSource::new(Vec::new())),
                Arc::new(InMemoryUsageStats::new()),
            ),
        };

        Ok(Self::from_ports(
            config,
            Ports {
                app_settings,
                user_data,
                settings_store,
                packages,
                usage_stats,
            },
        ))
    }

    pub fn from_ports(config: AppConfig, ports: Ports) -> Self {
        let apply_service = Arc::new(ApplyAppSettingsService::new(
            ports.app_settings.clone(),
            ports.settings_store.clone(),
        ));
        let app_settings_service = Arc::new(AppSettingsService::new(ports.app_settings, ports.packages));
        let secure_settings_service = SecureSettingsService::new(ports.settings_store);
        let user_data_service = Arc::new(UserDataService::new(ports.user_data));
        let foreground_service = Arc::new(ForegroundService::new(ports.usage_stats, apply_service.clone()));
        let (launch_status, _) = watch::channel(None);

        Self {
            config,
            app_settings_service,
            apply_service,
            secure_settings_service,
            user_data_service,
            foreground_service,
            launch_status,
        }
    }
}
