//! Cached assignments and their walk lists.

pub mod model;
mod repository;

pub use repository::AssignmentRepository;
