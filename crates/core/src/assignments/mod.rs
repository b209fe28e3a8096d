//! Canvassing assignment models and repository contract.

mod assignment_model;
mod assignment_traits;

pub use assignment_model::*;
pub use assignment_traits::*;
