//! Retry policy primitives shared by the API client and the sync engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry policy classification for remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryClass {
    /// Transient: worth retrying with backoff.
    Retryable,
    /// Retrying the same payload cannot succeed.
    Permanent,
    /// The session must be refreshed before any retry makes sense.
    ReauthRequired,
}

/// Additional delivery attempts per log within one drain pass, after the
/// first failure.
pub const MAX_DELIVERY_RETRIES: u32 = 3;

const MAX_BACKOFF_EXPONENT: u32 = 8;

/// Classify an HTTP status into retry behavior.
pub fn classify_http_status(status: u16) -> RetryClass {
    match status {
        401 | 403 => RetryClass::ReauthRequired,
        408 | 429 => RetryClass::Retryable,
        500..=599 => RetryClass::Retryable,
        _ => RetryClass::Permanent,
    }
}

/// Backoff before retry `retry` of a single log: 1s, 2s, 4s, ...
pub fn backoff_delay(retry: u32) -> Duration {
    Duration::from_secs(1_u64 << retry.min(MAX_BACKOFF_EXPONENT))
}
