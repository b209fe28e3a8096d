//! Contact log models and the pending-delivery queue contract.

mod contact_log_model;
mod contact_log_traits;

pub use contact_log_model::*;
pub use contact_log_traits::*;
