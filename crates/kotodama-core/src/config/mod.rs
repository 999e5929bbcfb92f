//! Configuration system: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use kotodama_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Strategy: {:?}", cfg.generation.priority_strategy);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, save_config};
pub use schema::{
    AuthMode, Config, GenerationConfig, PriorityStrategy, ProviderConfig, ProvidersConfig,
};
