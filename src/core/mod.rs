//! Core abstractions shared by the client, stores and CLI

pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod query;

// Re-export main types for cleaner imports
pub use cache::{KeyOrder, KeyValueCollection};
pub use error::RateError;
pub use query::{Param, Query};
