//! `kotodama generate`: resolve the voice and target, run the orchestrator,
//! print and record the result.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{debug, warn};

use kotodama_core::config::load_config;
use kotodama_core::store::{BrandVoiceStore, HistoryLog, JsonFileStore};
use kotodama_core::types::{
    BrandVoice, GenerateRequest, GeneratedTweet, Provider, DEFAULT_THREAD_LENGTH, MAX_THREAD_LENGTH,
    MIN_THREAD_LENGTH,
};
use kotodama_providers::{create_orchestrator, InMemoryTemperatureMemo};

use crate::helpers;
use crate::{fast_mode_from_flags, QualityArg};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// What to write about
    #[arg(short, long)]
    pub prompt: String,

    /// Brand voice id (defaults to config, then the built-in voice)
    #[arg(long)]
    pub voice: Option<String>,

    /// Target profile id or username
    #[arg(long)]
    pub target: Option<String>,

    /// Write a thread instead of a single post
    #[arg(long, default_value_t = false)]
    pub thread: bool,

    /// Thread length (clamped to 2..=10)
    #[arg(long, requires = "thread")]
    pub length: Option<u8>,

    /// Provider (defaults to config)
    #[arg(long)]
    pub provider: Option<Provider>,

    /// Use the fast tier
    #[arg(long, conflicts_with_all = ["ultra", "haiku_45"])]
    pub fast: bool,

    /// Use the cheapest, fastest tier
    #[arg(long, conflicts_with = "haiku_45")]
    pub ultra: bool,

    /// Use the intermediate Haiku 4.5 tier (Claude)
    #[arg(long = "haiku-45")]
    pub haiku_45: bool,

    /// Higher-capability tier (Claude)
    #[arg(long, value_enum)]
    pub quality: Option<QualityArg>,

    /// Exact model id, overriding every hint
    #[arg(long)]
    pub model: Option<String>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub logs: bool,
}

impl GenerateArgs {
    fn to_request(&self, voice_id: &str, provider: Provider) -> GenerateRequest {
        let mut request = GenerateRequest::new(self.prompt.trim(), voice_id)
            .with_fast_mode(fast_mode_from_flags(self.fast, self.ultra, self.haiku_45));
        if self.thread {
            let length = self
                .length
                .unwrap_or(DEFAULT_THREAD_LENGTH)
                .clamp(MIN_THREAD_LENGTH, MAX_THREAD_LENGTH);
            request = request.thread(length);
        }
        if let Some(quality) = self.quality {
            request = request.with_quality(quality.into());
        }
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        request.provider = Some(provider);
        request
    }
}

/// Run the generate command.
pub async fn run(args: GenerateArgs) -> Result<()> {
    if args.prompt.trim().is_empty() {
        bail!("prompt must not be empty");
    }

    let config = load_config(None);
    let provider = args.provider.unwrap_or(config.generation.default_provider);

    let voice_id = args
        .voice
        .clone()
        .or_else(|| config.generation.default_brand_voice_id.clone())
        .unwrap_or_else(|| BrandVoice::DEFAULT_ID.to_string());
    let voices = JsonFileStore::<BrandVoice>::brand_voices()
        .context("failed to open brand voice store")?;
    let voice = voices
        .get_voice(&voice_id)
        .with_context(|| format!("failed to read brand voice '{voice_id}'"))?
        .with_context(|| format!("brand voice '{voice_id}' not found"))?;

    let target = match &args.target {
        Some(target) => Some(helpers::resolve_target(target)?),
        None => None,
    };

    let mut request = args.to_request(&voice.id, provider);
    request.target_profile_id = target.as_ref().map(|p| p.id.clone());

    let memo = Arc::new(InMemoryTemperatureMemo::new());
    let orchestrator = create_orchestrator(&config, provider, memo)
        .map_err(|e| anyhow::anyhow!("{e}. {}", helpers::credential_hint(provider)))?;
    debug!(provider = %provider, model = %orchestrator.primary_model(&request), "Dispatching");

    let response = orchestrator
        .generate_with_fallback(&request, &voice, target.as_ref())
        .await
        .with_context(|| format!("{} generation failed", provider.display_name()))?;

    helpers::print_response(&response);

    if config.generation.remember_history {
        let record = GeneratedTweet::from_response(&request, &response);
        if let Err(e) = HistoryLog::default_location().append(&record) {
            warn!("Failed to record history: {}", e);
        }
    }

    Ok(())
}
