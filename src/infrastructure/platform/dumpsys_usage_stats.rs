//! Launch detection by polling the activity manager's resumed activity

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::command;
use crate::application::ports::outbound::{UsageStatsError, UsageStatsPort};
use crate::domain::value_objects::UsageEvent;

/// Turns changes of the resumed activity into paused/resumed events.
///
/// Each poll reads `dumpsys activity activities`; when the package owning the
/// resumed activity differs from the previous poll, the old package is
/// reported paused and the new one resumed.
pub struct DumpsysUsageStatsSource {
    program: String,
    foreground: Mutex<Option<String>>,
}

impl DumpsysUsageStatsSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            foreground: Mutex::new(None),
        }
    }
}

/// Package of the resumed activity in `dumpsys activity activities` output
fn parse_resumed_package(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.starts_with("topResumedActivity")
                || line.starts_with("mResumedActivity")
                || line.starts_with("ResumedActivity")
        })
        .find_map(|line| {
            // ActivityRecord{7c1d2e u0 com.example.app/.MainActivity t42}
            let record = line.split_once("ActivityRecord{")?.1;
            record
                .split_whitespace()
                .find(|token| token.contains('/'))
                .and_then(|component| component.split_once('/'))
                .map(|(package, _)| package.to_string())
        })
}

/// Events implied by the foreground moving from `previous` to `current`
fn transition_events(previous: Option<&str>, current: Option<&str>) -> Vec<UsageEvent> {
    if previous == current {
        return Vec::new();
    }

    let mut events = Vec::with_capacity(2);
    if let Some(previous) = previous {
        events.push(UsageEvent::paused(previous));
    }
    if let Some(current) = current {
        events.push(UsageEvent::resumed(current));
    }
    events
}

#[async_trait]
impl UsageStatsPort for DumpsysUsageStatsSource {
    async fn query_events(&self) -> Result<Vec<UsageEvent>, UsageStatsError> {
        let output = command::run(&self.program, &["activity", "activities"])
            .await
            .map_err(|e| UsageStatsError::Query(e.to_string()))?;

        if !output.success {
            return Err(UsageStatsError::Query(output.stderr.trim().to_string()));
        }

        let current = parse_resumed_package(&output.stdout);
        let mut foreground = self.foreground.lock().await;
        let events = transition_events(foreground.as_deref(), current.as_deref());
        *foreground = current;

        Ok(events)
    }

    async fn is_permission_granted(&self) -> bool {
        match command::run(&self.program, &["activity", "activities"]).await {
            Ok(output) => output.success && !output.stdout.contains("Permission Denial"),
            Err(_) => false,
        }
    }
}
