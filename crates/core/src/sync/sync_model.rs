//! Sync domain models: engine phases, triggers, observable status, and the
//! persisted sync-state contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Engine phase: at most one drain pass runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Draining,
}

/// What started a drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    /// Connectivity transitioned to online.
    Online,
    /// Periodic timer tick.
    Periodic,
    /// Explicit request (pull-to-refresh).
    Manual,
}

/// Observable engine status published to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub phase: SyncPhase,
    pub last_sync_at: Option<DateTime<Utc>>,
    /// First failure of the most recent pass, for user feedback. Not an
    /// accumulation across passes.
    pub last_error: Option<String>,
    pub pending_count: i64,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            phase: SyncPhase::Idle,
            last_sync_at: None,
            last_error: None,
            pending_count: 0,
        }
    }
}

/// Terminal state of one drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainStatus {
    /// Every attempted log was delivered (possibly zero).
    Completed,
    /// At least one log stayed pending after exhausting its attempts.
    CompletedWithErrors,
    /// Skipped: the device is offline.
    SkippedOffline,
    /// Skipped: another pass was already in flight; this trigger was dropped.
    AlreadyDraining,
}

/// Lightweight metrics for one drain pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    pub status: DrainStatus,
    pub attempted: usize,
    pub delivered: usize,
    pub duration_ms: i64,
}

impl DrainReport {
    pub fn skipped(status: DrainStatus) -> Self {
        Self {
            status,
            attempted: 0,
            delivered: 0,
            duration_ms: 0,
        }
    }
}

/// Persisted sync bookkeeping plus the cache-wide reset used on sign-out.
#[async_trait]
pub trait SyncStateRepositoryTrait: Send + Sync {
    fn get_last_sync_at(&self) -> Result<Option<DateTime<Utc>>>;

    async fn set_last_sync_at(&self, at: DateTime<Utc>) -> Result<()>;

    /// Wipe all cached entities and queued logs.
    async fn clear_all(&self) -> Result<()>;
}
