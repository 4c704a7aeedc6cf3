use async_trait::async_trait;

use crate::domain::value_objects::UsageEvent;

#[derive(Debug, thiserror::Error)]
pub enum UsageStatsError {
    #[error("Usage stats query failed: {0}")]
    Query(String),
}

/// Source of foreground/background transitions
///
/// Delivery is at-least-once. Events of one package arrive in occurrence
/// order; no ordering is promised across packages.
#[async_trait]
pub trait UsageStatsPort: Send + Sync {
    /// Events that occurred since the previous call
    async fn query_events(&self) -> Result<Vec<UsageEvent>, UsageStatsError>;

    async fn is_permission_granted(&self) -> bool;
}
