//! In-memory fakes behind the core traits, shared by the engine unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use doorstep_api_client::{
    ApiError, ContactLogFilter, RemoteApi, Result as ApiResult, VoterFilter,
};
use doorstep_core::assignments::{Assignment, AssignmentRepositoryTrait, AssignmentStatus};
use doorstep_core::contact_logs::{ContactLog, ContactLogRepositoryTrait, ContactType};
use doorstep_core::sync::SyncStateRepositoryTrait;
use doorstep_core::voters::{ContactSummary, Coordinate, Voter, VoterRepositoryTrait};
use doorstep_core::Result;

pub(crate) fn sample_log(id: &str, minutes_ago: i64) -> ContactLog {
    ContactLog {
        id: id.to_string(),
        assignment_id: "a-1".to_string(),
        voter_id: "v-1".to_string(),
        contact_type: ContactType::Knocked,
        result: Some("Not home".to_string()),
        support_level: Some(3),
        location: Coordinate::new(30.2672, -97.7431),
        contacted_at: Utc.with_ymd_and_hms(2026, 7, 20, 14, 0, 0).unwrap()
            - Duration::minutes(minutes_ago),
    }
}

pub(crate) fn sample_assignment(id: &str) -> Assignment {
    Assignment {
        id: id.to_string(),
        name: format!("Walk list {}", id),
        description: None,
        assigned_date: Utc.with_ymd_and_hms(2026, 7, 20, 9, 0, 0).unwrap(),
        due_date: None,
        status: AssignmentStatus::InProgress,
        voter_count: 1,
        completed_count: 0,
        voters: None,
    }
}

pub(crate) fn sample_voter(id: &str, order: i32) -> Voter {
    Voter {
        id: id.to_string(),
        voter_id: format!("TX{:08}", order),
        first_name: "Jane".to_string(),
        last_name: "Smith".to_string(),
        address: "123 Main St".to_string(),
        city: "Austin".to_string(),
        state: "TX".to_string(),
        zip: "78701".to_string(),
        location: Coordinate::new(30.2672, -97.7431),
        party_affiliation: None,
        support_level: Some(3),
        phone: None,
        email: None,
        sequence_order: Some(order),
        last_contact: None,
    }
}

/// Scriptable fake of the remote API. Successful `create_contact_log` calls
/// echo the submitted log; failures are popped from a scripted queue.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    created: Mutex<Vec<String>>,
    create_failures: Mutex<VecDeque<ApiError>>,
    create_delay_ms: AtomicU64,
    list_calls: AtomicUsize,
    assignments: Mutex<Vec<(Assignment, Option<Assignment>)>>,
}

impl ScriptedApi {
    pub(crate) fn created_ids(&self) -> Vec<String> {
        self.created.lock().expect("lock").clone()
    }

    pub(crate) fn script_create_failure(&self, err: ApiError) {
        self.create_failures.lock().expect("lock").push_back(err);
    }

    pub(crate) fn set_create_delay_ms(&self, delay: u64) {
        self.create_delay_ms.store(delay, Ordering::SeqCst);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Seed a list entry; when `detail` is `None`, the detail fetch for this
    /// assignment fails with `NotFound`.
    pub(crate) fn seed_assignment(&self, summary: Assignment, detail: Option<Assignment>) {
        self.assignments
            .lock()
            .expect("lock")
            .push((summary, detail));
    }
}

#[async_trait]
impl RemoteApi for ScriptedApi {
    async fn list_assignments(&self) -> ApiResult<Vec<Assignment>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.assignments.lock().expect("lock");
        Ok(rows.iter().map(|(summary, _)| summary.clone()).collect())
    }

    async fn get_assignment(&self, assignment_id: &str) -> ApiResult<Assignment> {
        let detail = {
            let rows = self.assignments.lock().expect("lock");
            rows.iter()
                .find(|(summary, _)| summary.id == assignment_id)
                .and_then(|(_, detail)| detail.clone())
        };
        detail.ok_or(ApiError::NotFound)
    }

    async fn update_assignment_status(
        &self,
        assignment_id: &str,
        status: AssignmentStatus,
    ) -> ApiResult<Assignment> {
        let mut updated = self.get_assignment(assignment_id).await?;
        updated.status = status;
        Ok(updated)
    }

    async fn get_voter(&self, _voter_id: &str) -> ApiResult<Voter> {
        Err(ApiError::NotFound)
    }

    async fn list_voters(&self, _filter: &VoterFilter) -> ApiResult<Vec<Voter>> {
        Ok(Vec::new())
    }

    async fn create_contact_log(&self, log: &ContactLog) -> ApiResult<ContactLog> {
        let delay = self.create_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }

        self.created.lock().expect("lock").push(log.id.clone());
        let scripted = self.create_failures.lock().expect("lock").pop_front();
        match scripted {
            Some(err) => Err(err),
            None => Ok(log.clone()),
        }
    }

    async fn list_contact_logs(&self, _filter: &ContactLogFilter) -> ApiResult<Vec<ContactLog>> {
        Ok(Vec::new())
    }
}

/// In-memory stand-in for the contact-log queue.
#[derive(Default)]
pub(crate) struct MemoryQueue {
    rows: Mutex<Vec<(ContactLog, bool)>>,
}

impl MemoryQueue {
    pub(crate) fn total_rows(&self) -> usize {
        self.rows.lock().expect("lock").len()
    }
}

#[async_trait]
impl ContactLogRepositoryTrait for MemoryQueue {
    async fn enqueue_log(&self, log: ContactLog) -> Result<()> {
        let mut rows = self.rows.lock().expect("lock");
        if !rows.iter().any(|(existing, _)| existing.id == log.id) {
            rows.push((log, false));
        }
        Ok(())
    }

    fn list_pending(&self) -> Result<Vec<ContactLog>> {
        let rows = self.rows.lock().expect("lock");
        let mut pending: Vec<ContactLog> = rows
            .iter()
            .filter(|(_, synced)| !synced)
            .map(|(log, _)| log.clone())
            .collect();
        pending.sort_by_key(|log| log.contacted_at);
        Ok(pending)
    }

    fn pending_count(&self) -> Result<i64> {
        let rows = self.rows.lock().expect("lock");
        Ok(rows.iter().filter(|(_, synced)| !synced).count() as i64)
    }

    async fn mark_synced(&self, log_id: &str) -> Result<()> {
        let mut rows = self.rows.lock().expect("lock");
        for (log, synced) in rows.iter_mut() {
            if log.id == log_id {
                *synced = true;
            }
        }
        Ok(())
    }

    async fn purge_synced(&self) -> Result<()> {
        let mut rows = self.rows.lock().expect("lock");
        rows.retain(|(_, synced)| !synced);
        Ok(())
    }
}

/// In-memory stand-in for the assignment cache.
#[derive(Default)]
pub(crate) struct MemoryAssignments {
    rows: Mutex<Vec<Assignment>>,
}

#[async_trait]
impl AssignmentRepositoryTrait for MemoryAssignments {
    async fn upsert_assignment(&self, assignment: Assignment) -> Result<()> {
        let mut rows = self.rows.lock().expect("lock");
        match rows.iter_mut().find(|row| row.id == assignment.id) {
            Some(row) => *row = assignment,
            None => rows.push(assignment),
        }
        Ok(())
    }

    fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>> {
        let rows = self.rows.lock().expect("lock");
        Ok(rows.iter().find(|row| row.id == assignment_id).cloned())
    }

    fn list_assignments(&self) -> Result<Vec<Assignment>> {
        let rows = self.rows.lock().expect("lock");
        let mut listed: Vec<Assignment> = rows
            .iter()
            .cloned()
            .map(|mut row| {
                row.voters = None;
                row
            })
            .collect();
        listed.sort_by(|a, b| b.assigned_date.cmp(&a.assigned_date));
        Ok(listed)
    }
}

/// In-memory stand-in for the voter cache.
#[derive(Default)]
pub(crate) struct MemoryVoters {
    rows: Mutex<Vec<Voter>>,
}

#[async_trait]
impl VoterRepositoryTrait for MemoryVoters {
    async fn upsert_voter(&self, voter: Voter) -> Result<()> {
        let mut rows = self.rows.lock().expect("lock");
        match rows.iter_mut().find(|row| row.id == voter.id) {
            Some(row) => *row = voter,
            None => rows.push(voter),
        }
        Ok(())
    }

    fn get_voter(&self, voter_id: &str) -> Result<Option<Voter>> {
        let rows = self.rows.lock().expect("lock");
        Ok(rows.iter().find(|row| row.id == voter_id).cloned())
    }

    async fn update_last_contact(&self, voter_id: &str, summary: ContactSummary) -> Result<()> {
        let mut rows = self.rows.lock().expect("lock");
        if let Some(row) = rows.iter_mut().find(|row| row.id == voter_id) {
            row.last_contact = Some(summary);
        }
        Ok(())
    }
}

/// In-memory stand-in for persisted sync bookkeeping.
#[derive(Default)]
pub(crate) struct MemorySyncState {
    last_sync_at: Mutex<Option<DateTime<Utc>>>,
}

impl MemorySyncState {
    pub(crate) fn last_sync(&self) -> Option<DateTime<Utc>> {
        *self.last_sync_at.lock().expect("lock")
    }
}

#[async_trait]
impl SyncStateRepositoryTrait for MemorySyncState {
    fn get_last_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(*self.last_sync_at.lock().expect("lock"))
    }

    async fn set_last_sync_at(&self, at: DateTime<Utc>) -> Result<()> {
        *self.last_sync_at.lock().expect("lock") = Some(at);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        *self.last_sync_at.lock().expect("lock") = None;
        Ok(())
    }
}
