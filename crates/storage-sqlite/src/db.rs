//! Connection pool, embedded migrations, and the single-writer handle.

use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tokio::sync::{mpsc, oneshot};

use doorstep_core::errors::{DatabaseError, Error, Result};

use crate::errors::StorageError;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const POOL_MAX_SIZE: u32 = 8;

/// Applies per-connection pragmas every time a connection is handed out.
#[derive(Debug, Clone, Copy)]
struct ConnectionPragmas;

impl r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON; \
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create the connection pool and run pending migrations.
pub fn create_pool(database_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_path);
    let pool = Pool::builder()
        .max_size(POOL_MAX_SIZE)
        .connection_customizer(Box::new(ConnectionPragmas))
        .build(manager)
        .map_err(|err| Error::Database(DatabaseError::PoolError(err.to_string())))?;

    let mut conn = pool
        .get()
        .map_err(|err| Error::Database(DatabaseError::PoolError(err.to_string())))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| StorageError::Migration(err.to_string()))?;

    Ok(Arc::new(pool))
}

/// Check out a pooled connection for a read.
pub fn get_connection(pool: &Arc<DbPool>) -> Result<DbConnection> {
    pool.get()
        .map_err(|err| Error::Database(DatabaseError::PoolError(err.to_string())))
}

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Handle to the single database writer.
///
/// All mutations run on one dedicated thread in submission order, so
/// concurrent callers (drain pass, form submissions, cache refreshes) never
/// interleave inside the storage engine.
#[derive(Clone)]
pub struct WriteHandle {
    sender: mpsc::UnboundedSender<WriteJob>,
}

impl WriteHandle {
    pub fn new(pool: Arc<DbPool>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<WriteJob>();
        std::thread::Builder::new()
            .name("doorstep-db-writer".to_string())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    match pool.get() {
                        Ok(mut conn) => job(&mut conn),
                        Err(err) => {
                            // The job's result channel is dropped with it;
                            // the caller observes a write failure.
                            log::error!("Dropping write job, pool unavailable: {}", err);
                        }
                    }
                }
            })
            .expect("failed to spawn database writer thread");

        Self { sender }
    }

    /// Run a write closure on the writer thread and await its result.
    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let wrapped: WriteJob = Box::new(move |conn| {
            let _ = tx.send(job(conn));
        });

        self.sender.send(wrapped).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "database writer is not running".to_string(),
            ))
        })?;

        rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "database write was dropped before completing".to_string(),
            ))
        })?
    }
}
