//! Model selector: maps request hints and the configured priority strategy
//! to a concrete model id.
//!
//! Precedence, highest first:
//! 1. caller-forced override, then `request.model_id`
//! 2. `fastMode: true` → fast tier
//! 3. `fastMode: "ultra"` → ultra tier
//! 4. `fastMode: "haiku-45"` → intermediate fast tier (when the vendor has one)
//! 5. `quality: "opus" | "opus-max"` → higher-capability tiers (when the vendor has them)
//! 6. priority strategy

use kotodama_core::config::PriorityStrategy;
use kotodama_core::types::{FastMode, GenerateRequest, Quality};

use crate::registry::ProviderSpec;

/// Pick the model for `request` on the provider described by `spec`.
pub fn select_model(
    request: &GenerateRequest,
    spec: &ProviderSpec,
    strategy: PriorityStrategy,
    override_model: Option<&str>,
) -> String {
    let explicit = override_model
        .or(request.model_id.as_deref())
        .map(str::trim)
        .filter(|m| !m.is_empty());
    if let Some(model) = explicit {
        return model.to_string();
    }

    let hinted = match request.fast_mode {
        FastMode::Fast => Some(spec.fast_model),
        FastMode::Ultra => Some(spec.ultra_model),
        FastMode::Haiku45 => spec.intermediate_fast_model,
        FastMode::Off => None,
    };
    if let Some(model) = hinted {
        return model.to_string();
    }

    let quality = match request.quality {
        Some(Quality::Opus) => spec.opus_model,
        Some(Quality::OpusMax) => spec.opus_max_model,
        None => None,
    };
    if let Some(model) = quality {
        return model.to_string();
    }

    match strategy {
        PriorityStrategy::AlwaysQuality => spec.quality_model,
        PriorityStrategy::AlwaysMini | PriorityStrategy::MaximizeFree => spec.fast_model,
    }
    .to_string()
}
