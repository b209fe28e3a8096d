use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use doorstep_core::contact_logs::{ContactLog, ContactLogRepositoryTrait};
use doorstep_core::Result;

use super::model::{from_contact_log, to_contact_log, ContactLogQueueDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::contact_log_queue;

pub struct ContactLogRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ContactLogRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ContactLogRepositoryTrait for ContactLogRepository {
    async fn enqueue_log(&self, log: ContactLog) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let row = from_contact_log(&log, &Utc::now())?;
                // The id is the idempotency key; re-queueing the same log is
                // a no-op rather than a duplicate.
                diesel::insert_into(contact_log_queue::table)
                    .values(&row)
                    .on_conflict(contact_log_queue::id)
                    .do_nothing()
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn list_pending(&self) -> Result<Vec<ContactLog>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = contact_log_queue::table
            .filter(contact_log_queue::synced.eq(0))
            .order(contact_log_queue::contacted_at.asc())
            .load::<ContactLogQueueDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| to_contact_log(row).map_err(Into::into))
            .collect()
    }

    fn pending_count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = contact_log_queue::table
            .filter(contact_log_queue::synced.eq(0))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    async fn mark_synced(&self, log_id: &str) -> Result<()> {
        let log_id = log_id.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(contact_log_queue::table.find(&log_id))
                    .set(contact_log_queue::synced.eq(1))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn purge_synced(&self) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let purged = diesel::delete(
                    contact_log_queue::table.filter(contact_log_queue::synced.eq(1)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                if purged > 0 {
                    log::debug!("Purged {} synced contact logs", purged);
                }
                Ok(())
            })
            .await
    }
}
