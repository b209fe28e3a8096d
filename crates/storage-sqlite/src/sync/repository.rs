use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use doorstep_core::sync::SyncStateRepositoryTrait;
use doorstep_core::Result;

use super::model::SyncStateDB;
use crate::convert::{format_rfc3339, parse_rfc3339};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{assignment_voters, assignments, contact_log_queue, sync_state, voters};

const SYNC_STATE_ROW_ID: i32 = 1;

pub struct SyncStateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncStateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncStateRepositoryTrait for SyncStateRepository {
    fn get_last_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_state::table
            .find(SYNC_STATE_ROW_ID)
            .first::<SyncStateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        row.and_then(|r| r.last_sync_at)
            .as_deref()
            .map(parse_rfc3339)
            .transpose()
            .map_err(Into::into)
    }

    async fn set_last_sync_at(&self, at: DateTime<Utc>) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let now = format_rfc3339(&Utc::now());
                let row = SyncStateDB {
                    id: SYNC_STATE_ROW_ID,
                    last_sync_at: Some(format_rfc3339(&at)),
                    updated_at: now,
                };

                diesel::insert_into(sync_state::table)
                    .values(&row)
                    .on_conflict(sync_state::id)
                    .do_update()
                    .set((
                        sync_state::last_sync_at.eq(row.last_sync_at.clone()),
                        sync_state::updated_at.eq(row.updated_at.clone()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }

    async fn clear_all(&self) -> Result<()> {
        self.writer
            .exec(move |conn| {
                conn.transaction::<(), StorageError, _>(|conn| {
                    diesel::delete(contact_log_queue::table).execute(conn)?;
                    diesel::delete(assignment_voters::table).execute(conn)?;
                    diesel::delete(voters::table).execute(conn)?;
                    diesel::delete(assignments::table).execute(conn)?;
                    diesel::delete(sync_state::table).execute(conn)?;
                    Ok(())
                })?;
                log::info!("Cleared all cached canvass data");
                Ok(())
            })
            .await
    }
}
