//! Fallback orchestrator.
//!
//! Picks the primary model, attempts it under a per-attempt deadline, then
//! sweeps the client's fallback chain once, in order, sequentially. When
//! every candidate fails the caller sees the primary attempt's error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use kotodama_core::config::PriorityStrategy;
use kotodama_core::types::{BrandVoice, GenerateRequest, GenerateResponse, Provider, UserProfile};
use kotodama_core::GenerationError;

use crate::selector::select_model;
use crate::traits::ProviderClient;

/// Default per-attempt deadline.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Orchestrator {
    client: Arc<dyn ProviderClient>,
    strategy: PriorityStrategy,
    attempt_timeout: Duration,
    model_override: Option<String>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.client.provider())
            .field("strategy", &self.strategy)
            .field("attempt_timeout", &self.attempt_timeout)
            .field("model_override", &self.model_override)
            .finish()
    }
}

impl Orchestrator {
    pub fn new(client: Arc<dyn ProviderClient>, strategy: PriorityStrategy) -> Self {
        Self {
            client,
            strategy,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            model_override: None,
        }
    }

    /// Deadline applied to each attempt separately.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Force a model for every request, ahead of any request hint.
    pub fn with_model_override(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    pub fn provider(&self) -> Provider {
        self.client.provider()
    }

    /// The model the next attempt for `request` would start with.
    pub fn primary_model(&self, request: &GenerateRequest) -> String {
        select_model(
            request,
            self.client.spec(),
            self.strategy,
            self.model_override.as_deref(),
        )
    }

    /// Generate with the primary model, then each untried fallback.
    pub async fn generate_with_fallback(
        &self,
        request: &GenerateRequest,
        voice: &BrandVoice,
        target: Option<&UserProfile>,
    ) -> Result<GenerateResponse, GenerationError> {
        let provider = self.client.provider();
        let primary = self.primary_model(request);
        debug!(provider = %provider, model = %primary, "Selected primary model");

        let primary_err = match self.attempt(request, voice, target, &primary).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        let mut attempted = vec![primary.clone()];
        for candidate in self.client.fallback_models() {
            if attempted.iter().any(|m| m == candidate) {
                continue;
            }
            warn!(provider = %provider, candidate, "Attempting fallback model");
            match self.attempt(request, voice, target, candidate).await {
                Ok(response) => {
                    info!(provider = %provider, model = candidate, "Fallback succeeded");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(provider = %provider, model = candidate, error = %e, "Fallback failed");
                    attempted.push(candidate.to_string());
                }
            }
        }

        error!(
            provider = %provider,
            model = %primary,
            attempts = attempted.len(),
            error = %primary_err,
            "All models failed"
        );
        Err(primary_err)
    }

    async fn attempt(
        &self,
        request: &GenerateRequest,
        voice: &BrandVoice,
        target: Option<&UserProfile>,
        model: &str,
    ) -> Result<GenerateResponse, GenerationError> {
        debug!(provider = %self.client.provider(), model, "Attempting generation");
        tokio::time::timeout(
            self.attempt_timeout,
            self.client.generate(request, voice, target, model),
        )
        .await
        .unwrap_or_else(|_| Err(GenerationError::Timeout(self.attempt_timeout)))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
