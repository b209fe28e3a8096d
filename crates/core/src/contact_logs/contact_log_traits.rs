use async_trait::async_trait;

use crate::contact_logs::ContactLog;
use crate::errors::Result;

/// Durable queue of contact logs awaiting delivery.
///
/// A log enters the queue in the pending state, transitions to synced
/// exactly once (after a confirmed remote acceptance), and is removed by
/// [`purge_synced`](Self::purge_synced).
#[async_trait]
pub trait ContactLogRepositoryTrait: Send + Sync {
    /// Append a log in the pending state. A successful return guarantees
    /// the write survives process restart.
    async fn enqueue_log(&self, log: ContactLog) -> Result<()>;

    /// Pending logs in delivery order: `contacted_at` ascending.
    fn list_pending(&self) -> Result<Vec<ContactLog>>;

    fn pending_count(&self) -> Result<i64>;

    /// Idempotent; no-op when the id is absent or already synced.
    async fn mark_synced(&self, log_id: &str) -> Result<()>;

    /// Delete all synced entries.
    async fn purge_synced(&self) -> Result<()>;
}
