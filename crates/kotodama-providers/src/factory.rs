//! Build provider clients and orchestrators from configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use kotodama_core::config::{Config, ProviderConfig};
use kotodama_core::types::Provider;
use kotodama_core::GenerationError;

use crate::claude::ClaudeClient;
use crate::fallback::Orchestrator;
use crate::gemini::GeminiClient;
use crate::memo::TemperatureMemo;
use crate::openai::OpenAiClient;
use crate::traits::ProviderClient;

/// Create the client for `provider`.
///
/// Fails with [`GenerationError::MissingCredentials`] before any network
/// access when the credential for the configured auth mode is absent.
pub fn create_client(
    provider: Provider,
    config: &ProviderConfig,
    memo: Arc<dyn TemperatureMemo>,
) -> Result<Arc<dyn ProviderClient>, GenerationError> {
    if !config.is_configured() {
        return Err(GenerationError::MissingCredentials(provider));
    }
    debug!(provider = %provider, auth_mode = ?config.auth_mode, "Creating provider client");

    let client: Arc<dyn ProviderClient> = match provider {
        Provider::OpenAi => Arc::new(OpenAiClient::new(config, memo)?),
        Provider::Gemini => Arc::new(GeminiClient::new(config)?),
        Provider::Claude => Arc::new(ClaudeClient::new(config)?),
    };
    Ok(client)
}

/// Create an orchestrator for `provider` using the generation settings in `config`.
pub fn create_orchestrator(
    config: &Config,
    provider: Provider,
    memo: Arc<dyn TemperatureMemo>,
) -> Result<Orchestrator, GenerationError> {
    let client = create_client(provider, config.providers.get(provider), memo)?;
    Ok(Orchestrator::new(client, config.generation.priority_strategy)
        .with_timeout(Duration::from_secs(config.generation.request_timeout_secs.max(1))))
}
