//! Database model for persisted sync bookkeeping.

use diesel::prelude::*;

/// Singleton row (id = 1) tracking the last completed sync.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::sync_state)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncStateDB {
    pub id: i32,
    pub last_sync_at: Option<String>,
    pub updated_at: String,
}
