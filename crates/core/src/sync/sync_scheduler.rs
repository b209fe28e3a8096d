//! Scheduler constants for the background sync runtime.

/// Periodic drain cadence in seconds.
pub const SYNC_PERIODIC_INTERVAL_SECS: u64 = 300;

/// Per-request timeout for remote calls, in seconds.
pub const REMOTE_REQUEST_TIMEOUT_SECS: u64 = 30;
