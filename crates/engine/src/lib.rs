//! Offline-first sync engine for Doorstep.
//!
//! Wires the local store, the API client, and the network monitor into the
//! drain/refresh orchestration and the read-through cache facade consumed by
//! the presentation layer.

pub mod catalog;
pub mod context;
pub mod network;
pub mod sync_service;

#[cfg(test)]
mod testing;

pub use catalog::{
    CatalogService, CatalogServiceTrait, DataSource, DeliveryStatus, LogSubmission, Sourced,
};
pub use context::{RuntimeConfig, ServiceContext};
pub use network::NetworkMonitor;
pub use sync_service::{SyncError, SyncService};
