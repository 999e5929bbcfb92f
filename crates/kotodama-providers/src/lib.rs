//! Generation dispatch layer for Kotodama.
//!
//! Talks directly to three vendor APIs over HTTP and hides their
//! differences behind one trait.
//!
//! # Architecture
//!
//! - [`prompt`]: system and user prompt construction
//! - [`selector`]: request hints + priority strategy → model id
//! - [`registry`]: static per-vendor specs and the model catalogue
//! - [`traits::ProviderClient`]: trait every vendor adapter implements
//! - [`openai`], [`gemini`], [`claude`]: the adapters
//! - [`fallback::Orchestrator`]: primary attempt plus one fallback sweep
//! - [`analyzer`]: style analysis that never fails
//! - [`factory`]: build clients and orchestrators from config

pub mod analyzer;
pub mod claude;
pub mod factory;
pub mod fallback;
pub mod gemini;
pub mod http;
pub mod memo;
pub mod openai;
pub mod prompt;
pub mod registry;
pub mod selector;
pub mod thread;
pub mod traits;

pub use analyzer::{analyze_profile, analyze_style, build_profile};
pub use factory::{create_client, create_orchestrator};
pub use fallback::Orchestrator;
pub use memo::{InMemoryTemperatureMemo, TemperatureMemo};
pub use prompt::{build_prompts, PromptStyle, Prompts};
pub use registry::{spec_for, ModelInfo, ProviderSpec, MODELS};
pub use selector::select_model;
pub use traits::{ProviderClient, SamplingConfig};
