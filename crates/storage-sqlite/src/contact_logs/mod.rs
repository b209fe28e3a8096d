//! Pending contact-log queue.

pub mod model;
mod repository;

pub use repository::ContactLogRepository;
