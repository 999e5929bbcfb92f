//! Core types for Kotodama: brand voices, target profiles, and the
//! request/response pair exchanged with the generation layer.
//!
//! JSON uses **camelCase** keys (the shape the panel and the stores share);
//! Rust uses snake_case via `#[serde(rename_all = "camelCase")]`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GenerationError;

/// Hard character limit of a single post.
pub const MAX_POST_CHARS: usize = 280;

/// Default number of posts in a thread.
pub const DEFAULT_THREAD_LENGTH: u8 = 5;
/// Smallest thread a caller may request.
pub const MIN_THREAD_LENGTH: u8 = 2;
/// Largest thread a caller may request.
pub const MAX_THREAD_LENGTH: u8 = 10;

// ─────────────────────────────────────────────
// Provider identifier
// ─────────────────────────────────────────────

/// The third-party LLM vendors Kotodama can dispatch to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "claude")]
    Claude,
}

impl Provider {
    /// All providers, in the order they are listed to users.
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Gemini, Provider::Claude];

    /// Wire/config name (e.g. `"openai"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
        }
    }

    /// Human-readable name for logs and the CLI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
            Provider::Claude => "Claude",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            "claude" | "anthropic" => Ok(Provider::Claude),
            other => Err(GenerationError::UnknownProvider(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────
// Tone
// ─────────────────────────────────────────────

/// Six tone dials, each in `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToneAttributes {
    /// 0 = very casual, 100 = very professional.
    pub formality: u8,
    /// 0 = serious, 100 = humorous.
    pub humor: u8,
    /// 0 = simple language, 100 = technical jargon.
    pub technicality: u8,
    /// 0 = direct, 100 = empathetic.
    pub empathy: u8,
    /// 0 = calm, 100 = energetic.
    pub energy: u8,
    /// 0 = reserved, 100 = vulnerable/personal.
    pub authenticity: u8,
}

impl Default for ToneAttributes {
    fn default() -> Self {
        Self {
            formality: 50,
            humor: 50,
            technicality: 50,
            empathy: 50,
            energy: 50,
            authenticity: 50,
        }
    }
}

impl ToneAttributes {
    /// Apply a signed per-dial delta, clamping each dial to `0..=100`.
    pub fn adjusted(&self, delta: &ToneAdjustment) -> Self {
        fn apply(value: u8, delta: Option<i16>) -> u8 {
            match delta {
                Some(d) => i16::from(value).saturating_add(d).clamp(0, 100) as u8,
                None => value,
            }
        }

        Self {
            formality: apply(self.formality, delta.formality),
            humor: apply(self.humor, delta.humor),
            technicality: apply(self.technicality, delta.technicality),
            empathy: apply(self.empathy, delta.empathy),
            energy: apply(self.energy, delta.energy),
            authenticity: apply(self.authenticity, delta.authenticity),
        }
    }

    fn all_at(&self, value: u8) -> bool {
        [
            self.formality,
            self.humor,
            self.technicality,
            self.empathy,
            self.energy,
            self.authenticity,
        ]
        .iter()
        .all(|v| *v == value)
    }
}

/// A partial, signed change to a [`ToneAttributes`] value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToneAdjustment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formality: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humor: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technicality: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empathy: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticity: Option<i16>,
}

// ─────────────────────────────────────────────
// Brand voice
// ─────────────────────────────────────────────

/// Terms a brand voice prefers or bans.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vocabulary {
    pub approved: Vec<String>,
    pub avoid: Vec<String>,
}

/// Style rules for one platform.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformRules {
    pub style: String,
    pub format: String,
    pub emoji_usage: String,
    pub length: String,
}

/// Per-platform rule sets. Only the Twitter/X rules are used for prompting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformGuidelines {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<PlatformRules>,
}

/// A named, reusable style profile applied to generation.
///
/// Read-only from the generation layer's point of view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandVoice {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,
    /// Style exemplars; order is preserved in the prompt.
    #[serde(default)]
    pub example_tweets: Vec<String>,
    #[serde(default)]
    pub tone_attributes: ToneAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vocabulary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dos_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub donts_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_guidelines: Option<PlatformGuidelines>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl BrandVoice {
    /// Id of the built-in fallback voice.
    pub const DEFAULT_ID: &'static str = "default";

    /// Create an empty voice with neutral tone.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            guidelines: None,
            example_tweets: Vec::new(),
            tone_attributes: ToneAttributes::default(),
            vocabulary: None,
            dos_list: Vec::new(),
            donts_list: Vec::new(),
            platform_guidelines: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The built-in voice used when nothing else is configured.
    pub fn default_voice() -> Self {
        Self::new(Self::DEFAULT_ID, "Default")
    }

    /// Twitter/X platform rules, if any.
    pub fn twitter_rules(&self) -> Option<&PlatformRules> {
        self.platform_guidelines
            .as_ref()
            .and_then(|g| g.twitter.as_ref())
    }

    /// Check the voice for missing fields and weak examples.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        let name = self.name.trim();
        if name.is_empty() {
            report.errors.push("Name is required".into());
        } else if name.chars().count() < 3 {
            report
                .warnings
                .push("Name is very short - consider making it more descriptive".into());
        }

        match self.description.as_deref().map(str::trim) {
            None | Some("") => report.errors.push("Description is required".into()),
            Some(d) if d.chars().count() < 10 => report
                .warnings
                .push("Description is too brief - add more details about your voice".into()),
            Some(_) => {}
        }

        let examples: Vec<&str> = self
            .example_tweets
            .iter()
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
            .collect();

        if examples.is_empty() {
            report
                .errors
                .push("At least one example tweet is required".into());
        } else if examples.len() < 3 {
            report
                .warnings
                .push("Adding 3-5 example tweets will improve AI generation quality".into());
        }

        for (i, tweet) in examples.iter().enumerate() {
            let len = tweet.chars().count();
            if len < 20 {
                report.warnings.push(format!(
                    "Example {} is very short - longer examples work better",
                    i + 1
                ));
            }
            if len > MAX_POST_CHARS {
                report.warnings.push(format!(
                    "Example {} exceeds {} characters ({} chars)",
                    i + 1,
                    MAX_POST_CHARS,
                    len
                ));
            }
        }

        if examples.len() >= 2 {
            let lengths: Vec<f64> = examples.iter().map(|t| t.chars().count() as f64).collect();
            let avg = lengths.iter().sum::<f64>() / lengths.len() as f64;
            if lengths.iter().all(|l| (l - avg).abs() < 20.0) {
                report
                    .suggestions
                    .push("Vary the length of your example tweets for better versatility".into());
            }
        }

        if self.tone_attributes.all_at(50) {
            report
                .suggestions
                .push("Adjust tone attributes to better reflect your unique voice".into());
        }

        report
    }
}

/// Outcome of [`BrandVoice::validate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ─────────────────────────────────────────────
// Target profile
// ─────────────────────────────────────────────

/// One sample post that went into a profile analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedTweet {
    pub tweet_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Derived style of a target account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleAttributes {
    pub avg_length: f64,
    #[serde(default)]
    pub common_phrases: Vec<String>,
    #[serde(default)]
    pub tone_profile: ToneAttributes,
}

/// Target-audience profile, written by the profile analyzer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub analyzed_tweets: Vec<AnalyzedTweet>,
    pub style_attributes: StyleAttributes,
    pub last_analyzed: DateTime<Utc>,
}

/// Average post length assumed when an analysis gives none.
pub const DEFAULT_AVG_LENGTH: f64 = 150.0;

/// Structured style summary returned by a style analysis call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSummary {
    #[serde(deserialize_with = "lenient_avg_length")]
    pub avg_length: f64,
    pub common_phrases: Vec<String>,
    pub tone: ToneSummary,
}

impl Default for StyleSummary {
    fn default() -> Self {
        Self {
            avg_length: DEFAULT_AVG_LENGTH,
            common_phrases: Vec::new(),
            tone: ToneSummary::default(),
        }
    }
}

/// The three dials a style analysis estimates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneSummary {
    #[serde(deserialize_with = "lenient_dial")]
    pub formality: u8,
    #[serde(deserialize_with = "lenient_dial")]
    pub humor: u8,
    #[serde(deserialize_with = "lenient_dial")]
    pub technicality: u8,
}

impl Default for ToneSummary {
    fn default() -> Self {
        Self {
            formality: 50,
            humor: 50,
            technicality: 50,
        }
    }
}

impl From<ToneSummary> for ToneAttributes {
    fn from(t: ToneSummary) -> Self {
        ToneAttributes {
            formality: t.formality,
            humor: t.humor,
            technicality: t.technicality,
            ..ToneAttributes::default()
        }
    }
}

/// Models answer with `72`, `72.5` or `"72"`; accept all.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

fn lenient_dial<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let n = lenient_number(deserializer)?;
    Ok(n.map(|v| v.round().clamp(0.0, 100.0) as u8).unwrap_or(50))
}

fn lenient_avg_length<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = lenient_number(deserializer)?;
    Ok(n.filter(|v| *v >= 0.0).unwrap_or(DEFAULT_AVG_LENGTH))
}

// ─────────────────────────────────────────────
// Generation request
// ─────────────────────────────────────────────

/// Speed hint. Serialized as `true`, `"ultra"` or `"haiku-45"`; `false` or
/// absent means no hint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FastModeRepr", into = "FastModeRepr")]
pub enum FastMode {
    #[default]
    Off,
    /// The provider's fast/mini tier.
    Fast,
    /// The provider's cheapest/fastest tier.
    Ultra,
    /// The named intermediate Haiku 4.5 tier (Claude only).
    Haiku45,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum FastModeRepr {
    Flag(bool),
    Named(String),
}

impl TryFrom<FastModeRepr> for FastMode {
    type Error = String;

    fn try_from(repr: FastModeRepr) -> Result<Self, Self::Error> {
        match repr {
            FastModeRepr::Flag(true) => Ok(FastMode::Fast),
            FastModeRepr::Flag(false) => Ok(FastMode::Off),
            FastModeRepr::Named(name) => match name.as_str() {
                "ultra" => Ok(FastMode::Ultra),
                "haiku-45" => Ok(FastMode::Haiku45),
                other => Err(format!("unknown fast mode: {other}")),
            },
        }
    }
}

impl From<FastMode> for FastModeRepr {
    fn from(mode: FastMode) -> Self {
        match mode {
            FastMode::Off => FastModeRepr::Flag(false),
            FastMode::Fast => FastModeRepr::Flag(true),
            FastMode::Ultra => FastModeRepr::Named("ultra".into()),
            FastMode::Haiku45 => FastModeRepr::Named("haiku-45".into()),
        }
    }
}

/// Quality hint for the Claude-like provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "opus")]
    Opus,
    #[serde(rename = "opus-max")]
    OpusMax,
}

/// Engagement counters shown next to a post.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngagementMetrics {
    pub replies: u64,
    pub retweets: u64,
    pub likes: u64,
}

/// The post being replied to, as scraped from the page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplyContext {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub text: String,
    /// Image alt texts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<EngagementMetrics>,
}

/// One generation call. Built fresh per call, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub prompt: String,
    pub brand_voice_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_profile_id: Option<String>,
    pub is_thread: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_length: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_adjustment: Option<ToneAdjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub fast_mode: FastMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
    /// Per-call model override; always wins over hints and strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_context: Option<ReplyContext>,
}

impl GenerateRequest {
    /// A single-post request against a brand voice.
    pub fn new(prompt: impl Into<String>, brand_voice_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            brand_voice_id: brand_voice_id.into(),
            ..Default::default()
        }
    }

    /// Turn this into a thread request of `length` posts.
    pub fn thread(mut self, length: u8) -> Self {
        self.is_thread = true;
        self.thread_length = Some(length);
        self
    }

    pub fn with_fast_mode(mut self, mode: FastMode) -> Self {
        self.fast_mode = mode;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_id = Some(model.into());
        self
    }

    /// Requested thread length, defaulted and clamped to `2..=10`.
    pub fn effective_thread_length(&self) -> u8 {
        self.thread_length
            .unwrap_or(DEFAULT_THREAD_LENGTH)
            .clamp(MIN_THREAD_LENGTH, MAX_THREAD_LENGTH)
    }
}

// ─────────────────────────────────────────────
// Generation response
// ─────────────────────────────────────────────

/// Generated text: one post, or an ordered thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedContent {
    Single(String),
    Thread(Vec<String>),
}

impl GeneratedContent {
    pub fn is_thread(&self) -> bool {
        matches!(self, GeneratedContent::Thread(_))
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            GeneratedContent::Single(s) => Some(s),
            GeneratedContent::Thread(_) => None,
        }
    }

    pub fn as_thread(&self) -> Option<&[String]> {
        match self {
            GeneratedContent::Thread(posts) => Some(posts),
            GeneratedContent::Single(_) => None,
        }
    }

    /// Posts in publishing order (a single post yields one item).
    pub fn posts(&self) -> Vec<&str> {
        match self {
            GeneratedContent::Single(s) => vec![s.as_str()],
            GeneratedContent::Thread(posts) => posts.iter().map(String::as_str).collect(),
        }
    }

    /// Flatten for history records (thread posts separated by a blank line).
    pub fn joined(&self) -> String {
        self.posts().join("\n\n")
    }
}

/// Normalized result of a generation call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub content: GeneratedContent,
    /// Provider-reported, or estimated when the vendor reports none.
    pub token_usage: u32,
    /// Provider that actually produced the content.
    pub provider: Provider,
    /// Model that actually produced the content (may differ after fallback).
    pub model: String,
}

/// History record persisted by the caller after a successful generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTweet {
    pub id: String,
    pub prompt: String,
    pub generated_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_content: Option<String>,
    pub brand_voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_profile_id: Option<String>,
    pub is_thread: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_position: Option<u32>,
    pub posted: bool,
    pub timestamp: DateTime<Utc>,
    pub api_used: Provider,
    pub token_usage: u32,
}

impl GeneratedTweet {
    /// Build an unposted history record from a request and its response.
    pub fn from_response(request: &GenerateRequest, response: &GenerateResponse) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt: request.prompt.clone(),
            generated_content: response.content.joined(),
            final_content: None,
            brand_voice_id: request.brand_voice_id.clone(),
            target_profile_id: request.target_profile_id.clone(),
            is_thread: request.is_thread,
            thread_position: None,
            posted: false,
            timestamp: Utc::now(),
            api_used: response.provider,
            token_usage: response.token_usage,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
