//! Cached voter records.

pub mod model;
mod repository;

pub use repository::VoterRepository;
pub(crate) use repository::upsert_voter_tx;
