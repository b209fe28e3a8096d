//! Sync engine: drains the pending contact-log queue and refreshes cached
//! assignment data.
//!
//! At most one drain pass runs at a time; overlapping triggers are dropped,
//! not queued, so the next natural trigger picks up anything enqueued while
//! a pass was in flight. A pass runs its queue snapshot to completion - one
//! failing log never blocks the others, and no log is ever removed without a
//! confirmed remote acceptance.

use chrono::Utc;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, MissedTickBehavior};

use doorstep_api_client::{ApiError, RemoteApi};
use doorstep_core::assignments::AssignmentRepositoryTrait;
use doorstep_core::contact_logs::{ContactLog, ContactLogRepositoryTrait};
use doorstep_core::sync::{
    backoff_delay, DrainReport, DrainStatus, RetryClass, SyncPhase, SyncStateRepositoryTrait,
    SyncStatus, SyncTrigger, MAX_DELIVERY_RETRIES, SYNC_PERIODIC_INTERVAL_SECS,
};

use crate::network::NetworkMonitor;

/// Errors surfaced by sync orchestration.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Cannot sync while offline")]
    Offline,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] doorstep_core::Error),
}

/// Resets the in-flight flag when a drain pass ends, on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SyncService {
    api: Arc<dyn RemoteApi>,
    assignments: Arc<dyn AssignmentRepositoryTrait>,
    contact_logs: Arc<dyn ContactLogRepositoryTrait>,
    sync_state: Arc<dyn SyncStateRepositoryTrait>,
    monitor: Arc<NetworkMonitor>,
    drain_in_flight: AtomicBool,
    status: watch::Sender<SyncStatus>,
    background_task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncService {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        assignments: Arc<dyn AssignmentRepositoryTrait>,
        contact_logs: Arc<dyn ContactLogRepositoryTrait>,
        sync_state: Arc<dyn SyncStateRepositoryTrait>,
        monitor: Arc<NetworkMonitor>,
    ) -> Arc<Self> {
        let last_sync_at = sync_state.get_last_sync_at().unwrap_or_else(|err| {
            warn!("Failed to load last sync timestamp: {}", err);
            None
        });
        let pending_count = contact_logs.pending_count().unwrap_or_else(|err| {
            warn!("Failed to load pending queue depth: {}", err);
            0
        });
        let (status, _) = watch::channel(SyncStatus {
            phase: SyncPhase::Idle,
            last_sync_at,
            last_error: None,
            pending_count,
        });

        Arc::new(Self {
            api,
            assignments,
            contact_logs,
            sync_state,
            monitor,
            drain_in_flight: AtomicBool::new(false),
            status,
            background_task: Mutex::new(None),
        })
    }

    /// Subscribe to engine status changes (phase, last sync, last error,
    /// queue depth).
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn current_status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    fn publish<F: FnOnce(&mut SyncStatus)>(&self, update: F) {
        self.status.send_modify(update);
    }

    /// Re-read the queue depth and publish it. Called after enqueues so the
    /// pending indicator stays current between drain passes.
    pub fn refresh_pending_count(&self) {
        match self.contact_logs.pending_count() {
            Ok(count) => self.publish(|status| status.pending_count = count),
            Err(err) => warn!("Failed to refresh pending queue depth: {}", err),
        }
    }

    /// Run one drain pass over the pending queue.
    ///
    /// No-ops (with a skipped report) when offline or when another pass is
    /// already in flight. Returns an error only for local storage failures;
    /// remote failures leave their logs pending and are reported through the
    /// status stream.
    pub async fn drain_pending(&self, trigger: SyncTrigger) -> Result<DrainReport, SyncError> {
        if !self.monitor.is_online() {
            debug!("Drain skipped ({:?}): offline", trigger);
            return Ok(DrainReport::skipped(DrainStatus::SkippedOffline));
        }
        if self.drain_in_flight.swap(true, Ordering::SeqCst) {
            debug!("Drain skipped ({:?}): pass already in flight", trigger);
            return Ok(DrainReport::skipped(DrainStatus::AlreadyDraining));
        }
        let _guard = InFlightGuard(&self.drain_in_flight);

        debug!("Starting drain pass ({:?})", trigger);
        self.publish(|status| status.phase = SyncPhase::Draining);

        match self.run_pass().await {
            Ok((report, first_error)) => {
                let finished_at = Utc::now();
                self.publish(|status| {
                    status.phase = SyncPhase::Idle;
                    status.last_sync_at = Some(finished_at);
                    status.last_error = first_error.clone();
                });
                self.refresh_pending_count();
                info!(
                    "Drain pass finished: {}/{} delivered in {} ms",
                    report.delivered, report.attempted, report.duration_ms
                );
                Ok(report)
            }
            Err(err) => {
                let message = err.to_string();
                self.publish(|status| {
                    status.phase = SyncPhase::Idle;
                    status.last_error = Some(message);
                });
                Err(err)
            }
        }
    }

    async fn run_pass(&self) -> Result<(DrainReport, Option<String>), SyncError> {
        let started = std::time::Instant::now();
        let pending = self.contact_logs.list_pending()?;
        let attempted = pending.len();

        if pending.is_empty() {
            self.sync_state.set_last_sync_at(Utc::now()).await?;
            return Ok((
                DrainReport {
                    status: DrainStatus::Completed,
                    attempted: 0,
                    delivered: 0,
                    duration_ms: started.elapsed().as_millis() as i64,
                },
                None,
            ));
        }

        let mut delivered = 0_usize;
        let mut first_error: Option<String> = None;

        for log in pending {
            match self.deliver_with_retry(&log).await {
                Ok(()) => {
                    self.contact_logs.mark_synced(&log.id).await?;
                    delivered += 1;
                }
                Err(err) => {
                    warn!("Contact log {} stays pending: {}", log.id, err);
                    if first_error.is_none() {
                        first_error = Some(err.to_string());
                    }
                }
            }
        }

        self.contact_logs.purge_synced().await?;
        self.sync_state.set_last_sync_at(Utc::now()).await?;

        let status = if delivered == attempted {
            DrainStatus::Completed
        } else {
            DrainStatus::CompletedWithErrors
        };
        Ok((
            DrainReport {
                status,
                attempted,
                delivered,
                duration_ms: started.elapsed().as_millis() as i64,
            },
            first_error,
        ))
    }

    /// Deliver one log, retrying transient failures up to
    /// [`MAX_DELIVERY_RETRIES`] times with exponential backoff. Terminal
    /// classes (validation, auth, not-found) end the attempt immediately;
    /// the log stays pending for a future pass either way.
    async fn deliver_with_retry(&self, log: &ContactLog) -> Result<(), ApiError> {
        let mut attempt: u32 = 0;
        loop {
            match self.api.create_contact_log(log).await {
                Ok(_) => return Ok(()),
                Err(err) => {
                    if err.retry_class() == RetryClass::Retryable && attempt < MAX_DELIVERY_RETRIES
                    {
                        let delay = backoff_delay(attempt);
                        attempt += 1;
                        debug!(
                            "Retrying contact log {} in {:?} (retry {}/{}): {}",
                            log.id, delay, attempt, MAX_DELIVERY_RETRIES, err
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Refresh the cached assignment list from the server, including each
    /// assignment's walk list. Requires connectivity.
    pub async fn sync_assignments(&self) -> Result<(), SyncError> {
        if !self.monitor.is_online() {
            return Err(SyncError::Offline);
        }

        let result = self.refresh_assignments().await;
        match &result {
            Ok(count) => {
                let finished_at = Utc::now();
                self.publish(|status| {
                    status.last_sync_at = Some(finished_at);
                    status.last_error = None;
                });
                info!("Refreshed {} assignments", count);
            }
            Err(err) => {
                let message = err.to_string();
                self.publish(|status| status.last_error = Some(message));
            }
        }
        result.map(|_| ())
    }

    async fn refresh_assignments(&self) -> Result<usize, SyncError> {
        let summaries = self.api.list_assignments().await?;
        let count = summaries.len();

        for summary in summaries {
            let assignment_id = summary.id.clone();
            self.assignments.upsert_assignment(summary).await?;

            // Walk lists ride on the detail payload; a single failed detail
            // fetch is not worth failing the whole refresh.
            match self.api.get_assignment(&assignment_id).await {
                Ok(detail) => self.assignments.upsert_assignment(detail).await?,
                Err(err) => {
                    warn!("Skipping walk list refresh for {}: {}", assignment_id, err);
                }
            }
        }

        self.sync_state.set_last_sync_at(Utc::now()).await?;
        Ok(count)
    }

    /// Full refresh: assignments first, then a drain pass.
    pub async fn full_sync(&self) -> Result<DrainReport, SyncError> {
        self.sync_assignments().await?;
        self.drain_pending(SyncTrigger::Manual).await
    }

    /// Spawn the background loop: periodic drains plus a drain on every
    /// transition to online. Idempotent while the loop is running.
    pub async fn ensure_background_started(self: &Arc<Self>) {
        let mut slot = self.background_task.lock().await;
        if slot.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let service = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            let mut online_rx = service.monitor.subscribe();
            let mut ticker =
                tokio::time::interval(Duration::from_secs(SYNC_PERIODIC_INTERVAL_SECS));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = service.drain_pending(SyncTrigger::Periodic).await {
                            warn!("Periodic drain failed: {}", err);
                        }
                    }
                    changed = online_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if *online_rx.borrow_and_update() {
                            if let Err(err) = service.drain_pending(SyncTrigger::Online).await {
                                warn!("Online drain failed: {}", err);
                            }
                        }
                    }
                }
            }
        }));
    }

    pub async fn ensure_background_stopped(&self) {
        let mut slot = self.background_task.lock().await;
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryAssignments, MemoryQueue, MemorySyncState, ScriptedApi};
    use doorstep_core::assignments::AssignmentRepositoryTrait;

    struct Harness {
        api: Arc<ScriptedApi>,
        queue: Arc<MemoryQueue>,
        assignments: Arc<MemoryAssignments>,
        sync_state: Arc<MemorySyncState>,
        monitor: Arc<NetworkMonitor>,
        service: Arc<SyncService>,
    }

    fn harness(initially_online: bool) -> Harness {
        let api = Arc::new(ScriptedApi::default());
        let queue = Arc::new(MemoryQueue::default());
        let assignments = Arc::new(MemoryAssignments::default());
        let sync_state = Arc::new(MemorySyncState::default());
        let monitor = Arc::new(NetworkMonitor::new(initially_online));
        let service = SyncService::new(
            Arc::clone(&api) as Arc<dyn RemoteApi>,
            Arc::clone(&assignments) as Arc<dyn AssignmentRepositoryTrait>,
            Arc::clone(&queue) as Arc<dyn ContactLogRepositoryTrait>,
            Arc::clone(&sync_state) as Arc<dyn SyncStateRepositoryTrait>,
            Arc::clone(&monitor),
        );
        Harness {
            api,
            queue,
            assignments,
            sync_state,
            monitor,
            service,
        }
    }

    #[tokio::test]
    async fn offline_submission_is_delivered_after_reconnect() {
        let h = harness(false);
        let log = crate::testing::sample_log("log-1", 0);
        h.queue.enqueue_log(log.clone()).await.expect("enqueue");

        // Offline: the pass no-ops without touching the remote.
        let report = h
            .service
            .drain_pending(SyncTrigger::Manual)
            .await
            .expect("drain");
        assert_eq!(report.status, DrainStatus::SkippedOffline);
        assert!(h.api.created_ids().is_empty());
        assert_eq!(h.queue.pending_count().expect("count"), 1);

        // Back online: one pass delivers it exactly once and purges it.
        h.monitor.set_online(true);
        let report = h
            .service
            .drain_pending(SyncTrigger::Online)
            .await
            .expect("drain");
        assert_eq!(report.status, DrainStatus::Completed);
        assert_eq!(report.attempted, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(h.api.created_ids(), vec!["log-1".to_string()]);
        assert_eq!(h.queue.pending_count().expect("count"), 0);
        assert_eq!(h.queue.total_rows(), 0);

        let status = h.service.current_status();
        assert_eq!(status.phase, SyncPhase::Idle);
        assert_eq!(status.pending_count, 0);
        assert!(status.last_error.is_none());
        assert!(status.last_sync_at.is_some());
        assert!(h.sync_state.last_sync().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_retry_with_backoff_then_stay_pending() {
        let h = harness(true);
        h.queue
            .enqueue_log(crate::testing::sample_log("log-1", 0))
            .await
            .expect("enqueue");
        // Initial attempt + 3 retries, all failing.
        for _ in 0..4 {
            h.api.script_create_failure(ApiError::Server(500));
        }

        let report = h
            .service
            .drain_pending(SyncTrigger::Manual)
            .await
            .expect("drain");
        assert_eq!(report.status, DrainStatus::CompletedWithErrors);
        assert_eq!(report.delivered, 0);
        assert_eq!(h.api.created_ids().len(), 4);
        assert_eq!(h.queue.pending_count().expect("count"), 1);
        assert_eq!(
            h.service.current_status().last_error.as_deref(),
            Some("Server error (500)")
        );

        // A later pass starts over from attempt 0 and succeeds.
        let report = h
            .service
            .drain_pending(SyncTrigger::Periodic)
            .await
            .expect("drain");
        assert_eq!(report.status, DrainStatus::Completed);
        assert_eq!(report.delivered, 1);
        assert_eq!(h.queue.pending_count().expect("count"), 0);
        assert!(h.service.current_status().last_error.is_none());
    }

    #[tokio::test]
    async fn terminal_failures_are_not_retried_within_a_pass() {
        let h = harness(true);
        h.queue
            .enqueue_log(crate::testing::sample_log("log-1", 0))
            .await
            .expect("enqueue");
        h.api.script_create_failure(ApiError::Validation {
            status: 422,
            body: "{\"detail\":\"bad support_level\"}".to_string(),
        });

        let report = h
            .service
            .drain_pending(SyncTrigger::Manual)
            .await
            .expect("drain");
        assert_eq!(report.status, DrainStatus::CompletedWithErrors);
        // Exactly one attempt: validation errors cannot improve by retrying.
        assert_eq!(h.api.created_ids().len(), 1);
        assert_eq!(h.queue.pending_count().expect("count"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn one_bad_log_never_blocks_the_others() {
        let h = harness(true);
        h.queue
            .enqueue_log(crate::testing::sample_log("log-bad", 30))
            .await
            .expect("enqueue");
        h.queue
            .enqueue_log(crate::testing::sample_log("log-good", 0))
            .await
            .expect("enqueue");
        // Oldest first: log-bad fails terminally, log-good succeeds.
        h.api.script_create_failure(ApiError::Unauthorized);

        let report = h
            .service
            .drain_pending(SyncTrigger::Manual)
            .await
            .expect("drain");
        assert_eq!(report.attempted, 2);
        assert_eq!(report.delivered, 1);

        let pending = h.queue.list_pending().expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "log-bad");
        // First error of the pass is what surfaces.
        assert_eq!(
            h.service.current_status().last_error.as_deref(),
            Some("Unauthorized - please sign in again")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_triggers_collapse_into_one_pass() {
        let h = harness(true);
        h.queue
            .enqueue_log(crate::testing::sample_log("log-1", 0))
            .await
            .expect("enqueue");
        h.api.set_create_delay_ms(200);

        let service = Arc::clone(&h.service);
        let racing = tokio::spawn(async move { service.drain_pending(SyncTrigger::Periodic).await });
        // Let the spawned pass reach its in-flight remote call.
        tokio::task::yield_now().await;

        let second = h
            .service
            .drain_pending(SyncTrigger::Manual)
            .await
            .expect("drain");
        assert_eq!(second.status, DrainStatus::AlreadyDraining);

        let first = racing.await.expect("join").expect("drain");
        assert_eq!(first.status, DrainStatus::Completed);
        // The log was delivered exactly once.
        assert_eq!(h.api.created_ids(), vec!["log-1".to_string()]);
    }

    #[tokio::test]
    async fn empty_queue_still_records_last_sync() {
        let h = harness(true);
        let report = h
            .service
            .drain_pending(SyncTrigger::Periodic)
            .await
            .expect("drain");
        assert_eq!(report.status, DrainStatus::Completed);
        assert_eq!(report.attempted, 0);
        assert!(h.sync_state.last_sync().is_some());
        assert!(h.api.created_ids().is_empty());
    }

    #[tokio::test]
    async fn sync_assignments_fails_fast_when_offline() {
        let h = harness(false);
        match h.service.sync_assignments().await {
            Err(SyncError::Offline) => {}
            other => panic!("expected Offline, got {:?}", other.map(|_| "ok")),
        }
        assert_eq!(h.api.list_calls(), 0);
    }

    #[tokio::test]
    async fn sync_assignments_caches_summaries_and_details() {
        let h = harness(true);
        let summary = crate::testing::sample_assignment("a-1");
        let mut detail = summary.clone();
        detail.voters = Some(vec![crate::testing::sample_voter("v-1", 1)]);
        h.api.seed_assignment(summary, Some(detail));
        h.api
            .seed_assignment(crate::testing::sample_assignment("a-2"), None);

        h.service.sync_assignments().await.expect("sync");

        // Detail (with walk list) wins for a-1; a-2 failed its detail fetch
        // but its summary is still cached.
        let cached = h.assignments.get_assignment("a-1").expect("get").unwrap();
        assert!(cached.voters.is_some());
        assert!(h
            .assignments
            .get_assignment("a-2")
            .expect("get")
            .is_some());
        assert!(h.sync_state.last_sync().is_some());
    }
}
