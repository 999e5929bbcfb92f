//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig`, `GenerationConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

use crate::types::Provider;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.kotodama/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub generation: GenerationConfig,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// How the Claude-like provider authenticates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `x-api-key` header against the REST API.
    #[default]
    Api,
    /// Browser session cookie against the web conversation API.
    Cookie,
}

/// Configuration for a single LLM provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Web session cookie (Claude only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    /// Authentication mode (Claude only).
    pub auth_mode: AuthMode,
    /// Custom web API base URL for cookie mode (Claude only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_base: Option<String>,
}

impl ProviderConfig {
    /// Whether the credential required by the configured auth mode is present.
    pub fn is_configured(&self) -> bool {
        match self.auth_mode {
            AuthMode::Api => !self.api_key.trim().is_empty(),
            AuthMode::Cookie => self
                .session_cookie
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty()),
        }
    }
}

/// Configuration for every supported provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub gemini: ProviderConfig,
    pub claude: ProviderConfig,
}

impl ProvidersConfig {
    /// Look up one provider's config.
    pub fn get(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Gemini => &self.gemini,
            Provider::Claude => &self.claude,
        }
    }

    pub fn get_mut(&mut self, provider: Provider) -> &mut ProviderConfig {
        match provider {
            Provider::OpenAi => &mut self.openai,
            Provider::Gemini => &mut self.gemini,
            Provider::Claude => &mut self.claude,
        }
    }
}

// ─────────────────────────────────────────────
// Generation
// ─────────────────────────────────────────────

/// Default model-choice policy when a request carries no hints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityStrategy {
    /// Prefer the fast tier to stay inside vendor free-quota programs.
    #[default]
    MaximizeFree,
    /// Always the top-tier model.
    AlwaysQuality,
    /// Always the fast tier.
    AlwaysMini,
}

impl std::str::FromStr for PriorityStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "maximize-free" => Ok(PriorityStrategy::MaximizeFree),
            "always-quality" => Ok(PriorityStrategy::AlwaysQuality),
            "always-mini" => Ok(PriorityStrategy::AlwaysMini),
            other => Err(format!("unknown priority strategy: {other}")),
        }
    }
}

/// Generation defaults owned by the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    pub default_provider: Provider,
    pub priority_strategy: PriorityStrategy,
    /// Deadline for each individual attempt in the fallback chain.
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_brand_voice_id: Option<String>,
    /// Persist generated posts to the history log.
    pub remember_history: bool,
    /// Maximum number of sample posts kept per analyzed profile (10, 20, 30 or 50).
    pub analysis_depth: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_provider: Provider::OpenAi,
            priority_strategy: PriorityStrategy::default(),
            request_timeout_secs: 60,
            default_brand_voice_id: None,
            remember_history: true,
            analysis_depth: 20,
        }
    }
}

impl GenerationConfig {
    /// Analysis depth snapped to the supported steps.
    pub fn effective_analysis_depth(&self) -> usize {
        match self.analysis_depth {
            0..=10 => 10,
            11..=20 => 20,
            21..=30 => 30,
            _ => 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.generation.default_provider, Provider::OpenAi);
        assert_eq!(
            config.generation.priority_strategy,
            PriorityStrategy::MaximizeFree
        );
        assert_eq!(config.generation.request_timeout_secs, 60);
        assert!(!config.providers.claude.is_configured());
    }

    #[test]
    fn test_camel_case_round_trip() {
        let json = serde_json::json!({
            "providers": {
                "claude": { "sessionCookie": "sessionKey=abc", "authMode": "cookie" }
            },
            "generation": { "priorityStrategy": "always-quality", "analysisDepth": 30 }
        });
        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.providers.claude.auth_mode, AuthMode::Cookie);
        assert!(config.providers.claude.is_configured());
        assert!(!config.providers.openai.is_configured());
        assert_eq!(
            config.generation.priority_strategy,
            PriorityStrategy::AlwaysQuality
        );
        assert_eq!(config.generation.effective_analysis_depth(), 30);
    }

    #[test]
    fn test_cookie_mode_ignores_api_key() {
        let cfg = ProviderConfig {
            api_key: "sk-ant-123".into(),
            auth_mode: AuthMode::Cookie,
            ..Default::default()
        };
        assert!(!cfg.is_configured());
    }

    #[test]
    fn test_analysis_depth_snaps() {
        let mut g = GenerationConfig::default();
        g.analysis_depth = 0;
        assert_eq!(g.effective_analysis_depth(), 10);
        g.analysis_depth = 25;
        assert_eq!(g.effective_analysis_depth(), 30);
        g.analysis_depth = 500;
        assert_eq!(g.effective_analysis_depth(), 50);
    }
}
