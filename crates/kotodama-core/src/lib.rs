//! Core types, configuration, errors, and stores for Kotodama.

pub mod config;
pub mod error;
pub mod store;
pub mod types;
pub mod utils;

pub use error::GenerationError;
