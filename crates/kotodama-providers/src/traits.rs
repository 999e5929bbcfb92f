//! Provider client trait: the seam between the orchestrator and the vendor
//! adapters.
//!
//! Each adapter owns only its wire differences: auth headers, body shape,
//! response field paths. Prompts, model choice and fallback live elsewhere.

use async_trait::async_trait;
use kotodama_core::types::{BrandVoice, GenerateRequest, GenerateResponse, Provider, StyleSummary, UserProfile};
use kotodama_core::GenerationError;

use crate::registry::ProviderSpec;

/// Sampling parameters for one vendor call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingConfig {
    /// Maximum output tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl SamplingConfig {
    /// Generation budget: threads get more room than single posts.
    pub fn for_generation(is_thread: bool) -> Self {
        Self {
            max_tokens: if is_thread { 1500 } else { 300 },
            temperature: 0.7,
        }
    }

    /// Style analysis: small budget, low temperature.
    pub fn for_analysis() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.3,
        }
    }
}

/// One vendor's generation client.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Static provider description: tiers, fallback chain, prompt style, split rule.
    fn spec(&self) -> &'static ProviderSpec;

    fn provider(&self) -> Provider {
        self.spec().provider
    }

    /// Models tried, in order, after the primary model fails.
    fn fallback_models(&self) -> Vec<&'static str> {
        self.spec().fallback_chain.to_vec()
    }

    /// Generate with exactly `model`.
    ///
    /// Any in-model correction (e.g. dropping an unsupported temperature)
    /// happens inside this call; no other model is tried.
    async fn generate(
        &self,
        request: &GenerateRequest,
        voice: &BrandVoice,
        target: Option<&UserProfile>,
        model: &str,
    ) -> Result<GenerateResponse, GenerationError>;

    /// Ask the vendor's analysis model for a structured style summary.
    async fn analyze_style(&self, samples: &[String]) -> Result<StyleSummary, GenerationError>;
}
