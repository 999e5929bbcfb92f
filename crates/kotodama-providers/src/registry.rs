//! Provider registry: static specs for the three supported vendors and the
//! catalogue of known models.
//!
//! Each `ProviderSpec` describes the tier layout the model selector works
//! from, the fallback chain, and the per-vendor prompt/thread quirks.

use kotodama_core::types::Provider;

use crate::prompt::PromptStyle;
use crate::thread::SplitRule;

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM vendor.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub provider: Provider,
    /// Default REST base URL.
    pub default_api_base: &'static str,
    /// Top-tier model (`always-quality`).
    pub quality_model: &'static str,
    /// Fast/mini tier (`fastMode: true`, `always-mini`, `maximize-free`).
    pub fast_model: &'static str,
    /// Cheapest/fastest tier (`fastMode: "ultra"`).
    pub ultra_model: &'static str,
    /// Named intermediate fast tier (`fastMode: "haiku-45"`), if the vendor has one.
    pub intermediate_fast_model: Option<&'static str>,
    /// Higher-capability tier for `quality: "opus"`.
    pub opus_model: Option<&'static str>,
    /// Highest-capability tier for `quality: "opus-max"`.
    pub opus_max_model: Option<&'static str>,
    /// Model used for style analysis.
    pub analysis_model: &'static str,
    /// Ordered models tried after the primary fails.
    pub fallback_chain: &'static [&'static str],
    /// How thread output is cut into posts.
    pub split_rule: SplitRule,
    /// Which optional sections the system prompt carries.
    pub prompt_style: PromptStyle,
}

pub static OPENAI: ProviderSpec = ProviderSpec {
    provider: Provider::OpenAi,
    default_api_base: "https://api.openai.com/v1",
    quality_model: "gpt-4o-2024-11-20",
    fast_model: "gpt-5-mini-2025-08-07",
    ultra_model: "gpt-5-nano-2025-08-07",
    intermediate_fast_model: None,
    opus_model: None,
    opus_max_model: None,
    analysis_model: "gpt-4o-mini-2024-07-18",
    fallback_chain: &[
        "gpt-4o-2024-11-20",
        "gpt-5-mini-2025-08-07",
        "gpt-4o-mini-2024-07-18",
    ],
    split_rule: SplitRule::NumberedBlocks,
    prompt_style: PromptStyle::FULL,
};

pub static GEMINI: ProviderSpec = ProviderSpec {
    provider: Provider::Gemini,
    default_api_base: "https://generativelanguage.googleapis.com/v1beta",
    quality_model: "gemini-2.5-pro",
    fast_model: "gemini-2.5-flash",
    ultra_model: "gemini-2.5-flash-lite",
    intermediate_fast_model: None,
    opus_model: None,
    opus_max_model: None,
    analysis_model: "gemini-2.5-flash-lite",
    fallback_chain: &["gemini-2.5-flash-lite"],
    split_rule: SplitRule::NumberedBlocks,
    prompt_style: PromptStyle::EXTENDED,
};

pub static CLAUDE: ProviderSpec = ProviderSpec {
    provider: Provider::Claude,
    default_api_base: "https://api.anthropic.com/v1",
    quality_model: "claude-sonnet-4-5-20250929",
    fast_model: "claude-3-5-haiku-20241022",
    ultra_model: "claude-3-haiku-20240307",
    intermediate_fast_model: Some("claude-haiku-4-5-20251001"),
    opus_model: Some("claude-opus-4-20250514"),
    opus_max_model: Some("claude-opus-4-1-20250805"),
    analysis_model: "claude-3-5-haiku-20241022",
    fallback_chain: &["claude-3-haiku-20240307"],
    split_rule: SplitRule::Lines,
    prompt_style: PromptStyle::BASIC,
};

/// Spec for a provider.
pub fn spec_for(provider: Provider) -> &'static ProviderSpec {
    match provider {
        Provider::OpenAi => &OPENAI,
        Provider::Gemini => &GEMINI,
        Provider::Claude => &CLAUDE,
    }
}

// ─────────────────────────────────────────────
// Model catalogue
// ─────────────────────────────────────────────

/// What a model is good for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelCategory {
    Quality,
    Fast,
    Reasoning,
}

/// OpenAI free-quota bucket a model draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenTier {
    Premium,
    Mini,
}

/// One known model.
#[derive(Clone, Debug)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub provider: Provider,
    pub category: ModelCategory,
    pub token_tier: Option<TokenTier>,
}

const fn openai(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: ModelCategory,
    tier: TokenTier,
) -> ModelInfo {
    ModelInfo {
        id,
        name,
        description,
        provider: Provider::OpenAi,
        category,
        token_tier: Some(tier),
    }
}

const fn model(
    provider: Provider,
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: ModelCategory,
) -> ModelInfo {
    ModelInfo {
        id,
        name,
        description,
        provider,
        category,
        token_tier: None,
    }
}

use ModelCategory::{Fast, Quality};
use TokenTier::{Mini, Premium};

/// All known models, grouped by provider.
pub static MODELS: &[ModelInfo] = &[
    // OpenAI: premium
    openai("gpt-5.2", "GPT-5.2", "Current state-of-the-art", Quality, Premium),
    openai("gpt-5.1", "GPT-5.1", "Previous flagship", Quality, Premium),
    openai("gpt-5", "GPT-5", "Original GPT-5 base", Quality, Premium),
    openai("gpt-5-chat-latest", "GPT-5 Chat", "Latest chat optimization", Quality, Premium),
    openai("gpt-4.1", "GPT-4.1", "High intelligence", Quality, Premium),
    openai("gpt-4o", "GPT-4o", "Omni model", Quality, Premium),
    openai("gpt-5-2025-08-07", "GPT-5 (Aug 2025)", "Snapshot 2025-08-07", Quality, Premium),
    openai("gpt-4o-2024-11-20", "GPT-4o (Nov 2024)", "Snapshot 2024-11-20", Quality, Premium),
    // OpenAI: mini
    openai("gpt-5.1-codex-mini", "GPT-5.1 Codex Mini", "Specialized for code", Fast, Mini),
    openai("gpt-5-mini", "GPT-5 Mini", "Efficient reasoning", Fast, Mini),
    openai("gpt-5-nano", "GPT-5 Nano", "Fastest response", Fast, Mini),
    openai("gpt-4.1-mini", "GPT-4.1 Mini", "Cost effective 4.1", Fast, Mini),
    openai("gpt-4.1-nano", "GPT-4.1 Nano", "Ultra lightweight 4.1", Fast, Mini),
    openai("gpt-4o-mini", "GPT-4o Mini", "Standard efficient", Fast, Mini),
    openai("gpt-5-mini-2025-08-07", "GPT-5 Mini (Aug)", "Snapshot 2025-08-07", Fast, Mini),
    openai("gpt-5-nano-2025-08-07", "GPT-5 Nano (Aug)", "Snapshot 2025-08-07", Fast, Mini),
    openai("gpt-4.1-mini-2025-04-14", "GPT-4.1 Mini (Apr)", "Snapshot 2025-04-14", Fast, Mini),
    openai("gpt-4.1-nano-2025-04-14", "GPT-4.1 Nano (Apr)", "Snapshot 2025-04-14", Fast, Mini),
    openai("gpt-4o-mini-2024-07-18", "GPT-4o Mini (Jul)", "Snapshot 2024-07-18", Fast, Mini),
    // Gemini
    model(Provider::Gemini, "gemini-2.5-pro", "Gemini 2.5 Pro", "Best for complex reasoning", Quality),
    model(Provider::Gemini, "gemini-2.5-flash", "Gemini 2.5 Flash", "Fast and efficient", Fast),
    model(Provider::Gemini, "gemini-2.5-flash-lite", "Gemini 2.5 Flash-Lite", "Ultra fast and cheapest", Fast),
    // Claude
    model(Provider::Claude, "claude-sonnet-4-5-20250929", "Claude Sonnet 4.5", "Balanced flagship", Quality),
    model(Provider::Claude, "claude-sonnet-4-20250514", "Claude Sonnet 4", "Previous Sonnet", Quality),
    model(Provider::Claude, "claude-3-7-sonnet-20250219", "Claude Sonnet 3.7", "Legacy Sonnet", Quality),
    model(Provider::Claude, "claude-opus-4-20250514", "Claude Opus 4", "Complex reasoning", Quality),
    model(Provider::Claude, "claude-opus-4-1-20250805", "Claude Opus 4.1", "Highest quality", Quality),
    model(Provider::Claude, "claude-haiku-4-5-20251001", "Claude Haiku 4.5", "Fast with recent knowledge", Fast),
    model(Provider::Claude, "claude-3-5-haiku-20241022", "Claude Haiku 3.5", "Fast", Fast),
    model(Provider::Claude, "claude-3-haiku-20240307", "Claude Haiku 3", "Ultra fast", Fast),
];

/// Known models for one provider, in catalogue order.
pub fn models_for(provider: Provider) -> impl Iterator<Item = &'static ModelInfo> {
    MODELS.iter().filter(move |m| m.provider == provider)
}

/// Look up a model by id.
pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == id)
}

/// OpenAI models drawing from one free-quota bucket.
pub fn models_by_tier(tier: TokenTier) -> impl Iterator<Item = &'static ModelInfo> {
    MODELS.iter().filter(move |m| m.token_tier == Some(tier))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
