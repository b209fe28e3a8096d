//! Database models for cached assignments.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use doorstep_core::assignments::Assignment;

use crate::convert::{enum_from_db, enum_to_db, format_rfc3339, parse_rfc3339};
use crate::errors::StorageError;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::assignments)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssignmentDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub assigned_date: String,
    pub due_date: Option<String>,
    pub status: String,
    pub voter_count: i32,
    pub completed_count: i32,
    pub updated_at: String,
}

#[derive(Queryable, Identifiable, Insertable, Debug, Clone)]
#[diesel(primary_key(assignment_id, voter_id))]
#[diesel(table_name = crate::schema::assignment_voters)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssignmentVoterDB {
    pub assignment_id: String,
    pub voter_id: String,
    pub position: i32,
}

pub(crate) fn to_assignment(row: AssignmentDB) -> Result<Assignment, StorageError> {
    Ok(Assignment {
        id: row.id,
        name: row.name,
        description: row.description,
        assigned_date: parse_rfc3339(&row.assigned_date)?,
        due_date: row.due_date.as_deref().map(parse_rfc3339).transpose()?,
        status: enum_from_db(&row.status)?,
        voter_count: row.voter_count,
        completed_count: row.completed_count,
        voters: None,
    })
}

pub(crate) fn from_assignment(
    assignment: &Assignment,
    now: &DateTime<Utc>,
) -> Result<AssignmentDB, StorageError> {
    Ok(AssignmentDB {
        id: assignment.id.clone(),
        name: assignment.name.clone(),
        description: assignment.description.clone(),
        assigned_date: format_rfc3339(&assignment.assigned_date),
        due_date: assignment.due_date.as_ref().map(format_rfc3339),
        status: enum_to_db(&assignment.status)?,
        voter_count: assignment.voter_count,
        completed_count: assignment.completed_count,
        updated_at: format_rfc3339(now),
    })
}
