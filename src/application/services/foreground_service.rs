//! Foreground Service - Applies and reverts rules as apps come and go
//!
//! Consumes usage events: a resumed package gets its settings applied and,
//! when that succeeds, is remembered; a paused event for the remembered
//! package reverts it. Pauses of any other package are ignored, since events
//! of different packages may arrive out of order. Calls are neither
//! deduplicated nor debounced.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::application::ports::outbound::{UsageStatsError, UsageStatsPort};
use crate::application::services::ApplyAppSettingsService;
use crate::domain::value_objects::{ForegroundServiceOutcome, LifeCycle, UsageEvent};

pub struct ForegroundService {
    usage_stats: Arc<dyn UsageStatsPort>,
    apply_service: Arc<ApplyAppSettingsService>,
    package_name_to_revert: Mutex<Option<String>>,
}

impl ForegroundService {
    pub fn new(usage_stats: Arc<dyn UsageStatsPort>, apply_service: Arc<ApplyAppSettingsService>) -> Self {
        Self {
            usage_stats,
            apply_service,
            package_name_to_revert: Mutex::new(None),
        }
    }

    pub async fn is_permission_granted(&self) -> bool {
        self.usage_stats.is_permission_granted().await
    }

    /// Drain pending usage events and handle them in order
    pub async fn poll(&self) -> Result<Vec<ForegroundServiceOutcome>, UsageStatsError> {
        let events = self.usage_stats.query_events().await?;

        let mut outcomes = Vec::with_capacity(events.len());
        for event in &events {
            outcomes.push(self.handle_event(event).await);
        }
        Ok(outcomes)
    }

    #[instrument(skip(self), fields(package_name = %event.package_name, lifecycle = ?event.lifecycle))]
    pub async fn handle_event(&self, event: &UsageEvent) -> ForegroundServiceOutcome {
        match event.lifecycle {
            LifeCycle::Resumed => {
                let outcome = self.apply_service.apply_app_settings(&event.package_name).await;
                if outcome.is_success() {
                    *self.package_name_to_revert.lock().await = Some(event.package_name.clone());
                }
                ForegroundServiceOutcome::from_outcome(outcome, &event.package_name)
            }
            LifeCycle::Paused => {
                let package_name = {
                    let mut remembered = self.package_name_to_revert.lock().await;
                    if remembered.as_deref() == Some(event.package_name.as_str()) {
                        remembered.take()
                    } else {
                        match remembered.as_deref() {
                            Some(applied) => debug!(applied, "Paused package is not the applied one, keeping settings"),
                            None => debug!("Nothing applied, nothing to revert"),
                        }
                        None
                    }
                };
                let Some(package_name) = package_name else {
                    return ForegroundServiceOutcome::EmptyAppSettings;
                };
                let outcome = self.apply_service.revert_app_settings(&package_name).await;
                ForegroundServiceOutcome::from_outcome(outcome, &package_name)
            }
        }
    }

    /// Package whose settings are currently applied by this service, if any
    pub async fn applied_package(&self) -> Option<String> {
        self.package_name_to_revert.lock().await.clone()
    }
}
