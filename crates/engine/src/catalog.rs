//! Read-through cache facade consumed by the presentation layer.
//!
//! Reads prefer the remote API and fall back to the local store when offline
//! or on any remote failure, flagging the result so the UI can show a
//! "using cached data" indicator. Contact-log submission is optimistic: the
//! write always succeeds locally, queueing for later delivery whenever the
//! immediate attempt is impossible or fails.

use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use doorstep_api_client::RemoteApi;
use doorstep_core::assignments::{Assignment, AssignmentRepositoryTrait, AssignmentStatus};
use doorstep_core::contact_logs::{ContactLog, ContactLogRepositoryTrait, NewContactLog};
use doorstep_core::voters::{ContactSummary, Voter, VoterRepositoryTrait};
use doorstep_core::Result;

use crate::network::NetworkMonitor;
use crate::sync_service::{SyncError, SyncService};

/// Where a read was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Remote,
    /// Served from the local store; the data may be stale.
    Cache,
}

/// A read result tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Sourced<T> {
    fn remote(data: T) -> Self {
        Self {
            data,
            source: DataSource::Remote,
        }
    }

    fn cached(data: T) -> Self {
        Self {
            data,
            source: DataSource::Cache,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.source == DataSource::Cache
    }
}

/// Outcome of a contact-log submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Accepted by the server during submission.
    Delivered,
    /// Recorded locally; the sync engine will deliver it.
    Queued,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSubmission {
    pub log: ContactLog,
    pub delivery: DeliveryStatus,
}

#[async_trait]
pub trait CatalogServiceTrait: Send + Sync {
    /// Assignment list: remote when reachable, cached otherwise.
    async fn get_assignments(&self) -> Result<Sourced<Vec<Assignment>>>;

    /// Single assignment (with walk list when available), same fallback.
    async fn get_assignment(&self, assignment_id: &str) -> Result<Sourced<Option<Assignment>>>;

    async fn get_voter(&self, voter_id: &str) -> Result<Sourced<Option<Voter>>>;

    /// Online-only write-through; fails with [`SyncError::Offline`] when
    /// there is no connectivity.
    async fn update_assignment_status(
        &self,
        assignment_id: &str,
        status: AssignmentStatus,
    ) -> std::result::Result<Assignment, SyncError>;

    /// Record a contact outcome. Never lost: delivered immediately when
    /// possible, queued durably otherwise.
    async fn submit_contact_log(
        &self,
        draft: NewContactLog,
    ) -> std::result::Result<LogSubmission, SyncError>;
}

pub struct CatalogService {
    api: Arc<dyn RemoteApi>,
    assignments: Arc<dyn AssignmentRepositoryTrait>,
    voters: Arc<dyn VoterRepositoryTrait>,
    contact_logs: Arc<dyn ContactLogRepositoryTrait>,
    monitor: Arc<NetworkMonitor>,
    sync: Arc<SyncService>,
}

impl CatalogService {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        assignments: Arc<dyn AssignmentRepositoryTrait>,
        voters: Arc<dyn VoterRepositoryTrait>,
        contact_logs: Arc<dyn ContactLogRepositoryTrait>,
        monitor: Arc<NetworkMonitor>,
        sync: Arc<SyncService>,
    ) -> Self {
        Self {
            api,
            assignments,
            voters,
            contact_logs,
            monitor,
            sync,
        }
    }

    fn summary_for(log: &ContactLog) -> ContactSummary {
        ContactSummary {
            date: log.contacted_at.to_rfc3339(),
            contact_type: log.contact_type.wire_name().to_string(),
            result: log.result.clone(),
        }
    }
}

#[async_trait]
impl CatalogServiceTrait for CatalogService {
    async fn get_assignments(&self) -> Result<Sourced<Vec<Assignment>>> {
        if self.monitor.is_online() {
            match self.api.list_assignments().await {
                Ok(remote) => {
                    for assignment in &remote {
                        self.assignments.upsert_assignment(assignment.clone()).await?;
                    }
                    return Ok(Sourced::remote(remote));
                }
                Err(err) => warn!("Falling back to cached assignments: {}", err),
            }
        }

        Ok(Sourced::cached(self.assignments.list_assignments()?))
    }

    async fn get_assignment(&self, assignment_id: &str) -> Result<Sourced<Option<Assignment>>> {
        if self.monitor.is_online() {
            match self.api.get_assignment(assignment_id).await {
                Ok(remote) => {
                    self.assignments.upsert_assignment(remote.clone()).await?;
                    return Ok(Sourced::remote(Some(remote)));
                }
                Err(err) => {
                    warn!(
                        "Falling back to cached assignment {}: {}",
                        assignment_id, err
                    );
                }
            }
        }

        Ok(Sourced::cached(self.assignments.get_assignment(assignment_id)?))
    }

    async fn get_voter(&self, voter_id: &str) -> Result<Sourced<Option<Voter>>> {
        if self.monitor.is_online() {
            match self.api.get_voter(voter_id).await {
                Ok(remote) => {
                    self.voters.upsert_voter(remote.clone()).await?;
                    return Ok(Sourced::remote(Some(remote)));
                }
                Err(err) => warn!("Falling back to cached voter {}: {}", voter_id, err),
            }
        }

        Ok(Sourced::cached(self.voters.get_voter(voter_id)?))
    }

    async fn update_assignment_status(
        &self,
        assignment_id: &str,
        status: AssignmentStatus,
    ) -> std::result::Result<Assignment, SyncError> {
        if !self.monitor.is_online() {
            return Err(SyncError::Offline);
        }

        let updated = self
            .api
            .update_assignment_status(assignment_id, status)
            .await?;
        self.assignments.upsert_assignment(updated.clone()).await?;
        Ok(updated)
    }

    async fn submit_contact_log(
        &self,
        draft: NewContactLog,
    ) -> std::result::Result<LogSubmission, SyncError> {
        let log = ContactLog::from_draft(draft, Utc::now());
        let summary = Self::summary_for(&log);

        if self.monitor.is_online() {
            match self.api.create_contact_log(&log).await {
                Ok(created) => {
                    self.voters
                        .update_last_contact(&log.voter_id, summary)
                        .await?;
                    return Ok(LogSubmission {
                        log: created,
                        delivery: DeliveryStatus::Delivered,
                    });
                }
                Err(err) => {
                    warn!(
                        "Immediate delivery failed, queueing contact log {}: {}",
                        log.id, err
                    );
                }
            }
        }

        // Queue unconditionally - a storage failure here is the only way a
        // submission can fail, and it surfaces to the caller.
        self.contact_logs.enqueue_log(log.clone()).await?;
        self.voters
            .update_last_contact(&log.voter_id, summary)
            .await?;
        self.sync.refresh_pending_count();

        Ok(LogSubmission {
            log,
            delivery: DeliveryStatus::Queued,
        })
    }
}
