//! HTTP client for the Doorstep campaign REST API.
//!
//! The client is stateless and performs no retries of its own; retry policy
//! belongs to the sync engine. Each request attaches the current bearer
//! token when one is available.

mod client;
mod error;
mod types;

pub use client::{CanvassApiClient, RemoteApi};
pub use error::{ApiError, Result};
pub use types::*;
