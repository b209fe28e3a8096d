//! Voter domain models and repository contract.

mod voter_model;
mod voter_traits;

pub use voter_model::*;
pub use voter_traits::*;
