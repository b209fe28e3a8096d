use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use doorstep_core::assignments::{Assignment, AssignmentRepositoryTrait};
use doorstep_core::Result;

use super::model::{from_assignment, to_assignment, AssignmentDB, AssignmentVoterDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{assignment_voters, assignments, voters};
use crate::voters::model::{to_voter, VoterDB};
use crate::voters::upsert_voter_tx;

pub struct AssignmentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AssignmentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn load_walk_list(
        &self,
        conn: &mut SqliteConnection,
        assignment_id: &str,
    ) -> std::result::Result<Vec<doorstep_core::voters::Voter>, StorageError> {
        let rows = assignment_voters::table
            .inner_join(voters::table)
            .filter(assignment_voters::assignment_id.eq(assignment_id))
            .order(assignment_voters::position.asc())
            .select((VoterDB::as_select(), assignment_voters::position))
            .load::<(VoterDB, i32)>(conn)?;

        rows.into_iter()
            .map(|(row, position)| {
                let mut voter = to_voter(row)?;
                voter.sequence_order = Some(position);
                Ok(voter)
            })
            .collect()
    }
}

fn upsert_assignment_tx(
    conn: &mut SqliteConnection,
    assignment: &Assignment,
) -> std::result::Result<(), StorageError> {
    conn.transaction::<(), StorageError, _>(|conn| {
        let row = from_assignment(assignment, &Utc::now())?;
        diesel::insert_into(assignments::table)
            .values(&row)
            .on_conflict(assignments::id)
            .do_update()
            .set(&row)
            .execute(conn)?;

        // A detail fetch replaces the cached walk list wholesale; summary
        // rows (voters absent) leave any cached walk list untouched.
        if let Some(walk_list) = &assignment.voters {
            diesel::delete(
                assignment_voters::table
                    .filter(assignment_voters::assignment_id.eq(&assignment.id)),
            )
            .execute(conn)?;

            for (index, voter) in walk_list.iter().enumerate() {
                upsert_voter_tx(conn, voter)?;
                diesel::insert_into(assignment_voters::table)
                    .values(AssignmentVoterDB {
                        assignment_id: assignment.id.clone(),
                        voter_id: voter.id.clone(),
                        position: voter.sequence_order.unwrap_or(index as i32),
                    })
                    .execute(conn)?;
            }
        }

        Ok(())
    })
}

#[async_trait]
impl AssignmentRepositoryTrait for AssignmentRepository {
    async fn upsert_assignment(&self, assignment: Assignment) -> Result<()> {
        self.writer
            .exec(move |conn| {
                upsert_assignment_tx(conn, &assignment)?;
                Ok(())
            })
            .await
    }

    fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>> {
        let mut conn = get_connection(&self.pool)?;
        let row = assignments::table
            .find(assignment_id)
            .first::<AssignmentDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut assignment = to_assignment(row)?;
        let walk_list = self.load_walk_list(&mut conn, assignment_id)?;
        if !walk_list.is_empty() {
            assignment.voters = Some(walk_list);
        }

        Ok(Some(assignment))
    }

    fn list_assignments(&self) -> Result<Vec<Assignment>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = assignments::table
            .order(assignments::assigned_date.desc())
            .load::<AssignmentDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| to_assignment(row).map_err(Into::into))
            .collect()
    }
}
