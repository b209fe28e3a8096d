//! Database model for the pending contact-log queue.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use doorstep_core::contact_logs::ContactLog;
use doorstep_core::voters::Coordinate;

use crate::convert::{enum_from_db, enum_to_db, format_rfc3339, parse_rfc3339};
use crate::errors::StorageError;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::contact_log_queue)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ContactLogQueueDB {
    pub id: String,
    pub assignment_id: String,
    pub voter_id: String,
    pub contact_type: String,
    pub result: Option<String>,
    pub support_level: Option<i32>,
    pub latitude: f64,
    pub longitude: f64,
    pub contacted_at: String,
    pub synced: i32,
    pub queued_at: String,
}

pub(crate) fn to_contact_log(row: ContactLogQueueDB) -> Result<ContactLog, StorageError> {
    Ok(ContactLog {
        id: row.id,
        assignment_id: row.assignment_id,
        voter_id: row.voter_id,
        contact_type: enum_from_db(&row.contact_type)?,
        result: row.result,
        support_level: row.support_level,
        location: Coordinate::new(row.latitude, row.longitude),
        contacted_at: parse_rfc3339(&row.contacted_at)?,
    })
}

pub(crate) fn from_contact_log(
    log: &ContactLog,
    now: &DateTime<Utc>,
) -> Result<ContactLogQueueDB, StorageError> {
    Ok(ContactLogQueueDB {
        id: log.id.clone(),
        assignment_id: log.assignment_id.clone(),
        voter_id: log.voter_id.clone(),
        contact_type: enum_to_db(&log.contact_type)?,
        result: log.result.clone(),
        support_level: log.support_level,
        latitude: log.location.latitude,
        longitude: log.location.longitude,
        contacted_at: format_rfc3339(&log.contacted_at),
        synced: 0,
        queued_at: format_rfc3339(now),
    })
}
