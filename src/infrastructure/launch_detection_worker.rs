//! Background worker that drives the foreground service
//!
//! Polls usage events while the usage-stats preference is on and publishes
//! every outcome on the launch status channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::application::services::{ForegroundService, UserDataService};
use crate::domain::value_objects::ForegroundServiceOutcome;

/// Idle delay while the usage-stats service preference is off
const DISABLED_RECHECK_INTERVAL: Duration = Duration::from_secs(5);

pub async fn launch_detection_worker(
    foreground_service: Arc<ForegroundService>,
    user_data_service: Arc<UserDataService>,
    launch_status: watch::Sender<Option<ForegroundServiceOutcome>>,
    poll_interval: Duration,
) {
    tracing::info!("Starting launch detection worker");

    if !foreground_service.is_permission_granted().await {
        tracing::warn!("Usage stats access is not available, launch detection will report errors");
    }

    let mut was_enabled = false;
    loop {
        let user_data = user_data_service.get().await;
        if !user_data.use_usage_stats_service {
            if was_enabled {
                tracing::info!("Usage stats service disabled, pausing launch detection");
                was_enabled = false;
            }
            tokio::time::sleep(DISABLED_RECHECK_INTERVAL).await;
            continue;
        }
        if !was_enabled {
            tracing::info!("Usage stats service enabled, polling every {:?}", poll_interval);
            was_enabled = true;
        }

        run_once(&foreground_service, &launch_status).await;

        tokio::time::sleep(poll_interval).await;
    }
}

/// One poll of the usage-stats source; returns the number of handled events
pub async fn run_once(
    foreground_service: &ForegroundService,
    launch_status: &watch::Sender<Option<ForegroundServiceOutcome>>,
) -> usize {
    match foreground_service.poll().await {
        Ok(outcomes) => {
            let handled = outcomes.len();
            for outcome in outcomes {
                match &outcome {
                    ForegroundServiceOutcome::Success { package_name } => {
                        tracing::info!("App settings applied for {}", package_name);
                    }
                    other => {
                        tracing::debug!("Launch detection outcome: {:?}", other);
                    }
                }
                launch_status.send_replace(Some(outcome));
            }
            handled
        }
        Err(e) => {
            tracing::error!("Failed to query usage events: {}", e);
            0
        }
    }
}
