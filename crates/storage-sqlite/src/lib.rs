//! SQLite-backed local store for Doorstep.
//!
//! Cached assignments/voters and the pending contact-log queue live in one
//! SQLite database. Reads go straight to the connection pool; every mutation
//! is funneled through the single [`db::WriteHandle`], which serializes
//! writes on a dedicated thread.

pub mod assignments;
pub mod contact_logs;
mod convert;
pub mod db;
pub mod errors;
pub mod schema;
pub mod sync;
#[cfg(test)]
mod test_support;
pub mod voters;

pub use assignments::AssignmentRepository;
pub use contact_logs::ContactLogRepository;
pub use db::{create_pool, get_connection, DbPool, WriteHandle};
pub use errors::StorageError;
pub use sync::SyncStateRepository;
pub use voters::VoterRepository;
