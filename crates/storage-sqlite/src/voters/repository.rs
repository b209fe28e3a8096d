use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use doorstep_core::voters::{ContactSummary, Voter, VoterRepositoryTrait};
use doorstep_core::Result;

use super::model::{from_voter, to_voter, VoterDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::voters;

/// Upsert a voter row on an open connection. Shared with the assignment
/// repository so walk-list caching lands in the same transaction.
pub(crate) fn upsert_voter_tx(
    conn: &mut SqliteConnection,
    voter: &Voter,
) -> std::result::Result<(), StorageError> {
    let row = from_voter(voter, &Utc::now());
    diesel::insert_into(voters::table)
        .values(&row)
        .on_conflict(voters::id)
        .do_update()
        .set(&row)
        .execute(conn)?;
    Ok(())
}

pub struct VoterRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl VoterRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl VoterRepositoryTrait for VoterRepository {
    async fn upsert_voter(&self, voter: Voter) -> Result<()> {
        self.writer
            .exec(move |conn| {
                upsert_voter_tx(conn, &voter)?;
                Ok(())
            })
            .await
    }

    fn get_voter(&self, voter_id: &str) -> Result<Option<Voter>> {
        let mut conn = get_connection(&self.pool)?;
        let row = voters::table
            .find(voter_id)
            .first::<VoterDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        row.map(to_voter).transpose().map_err(Into::into)
    }

    async fn update_last_contact(&self, voter_id: &str, summary: ContactSummary) -> Result<()> {
        let voter_id = voter_id.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(voters::table.find(&voter_id))
                    .set((
                        voters::last_contact_at.eq(Some(summary.date.clone())),
                        voters::last_contact_type.eq(Some(summary.contact_type.clone())),
                        voters::last_contact_result.eq(summary.result.clone()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
