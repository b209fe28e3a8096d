//! Shared fixtures for repository tests.

use std::sync::Arc;

use tempfile::TempDir;

use crate::db::{create_pool, DbPool, WriteHandle};

pub(crate) fn test_store() -> (TempDir, Arc<DbPool>, WriteHandle) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("doorstep-test.db");
    let pool = create_pool(path.to_str().expect("utf8 path")).expect("create pool");
    let writer = WriteHandle::new(Arc::clone(&pool));
    (dir, pool, writer)
}
