//! Claude-style client with two authentication modes.
//!
//! - **API key**: `x-api-key` + `anthropic-version` against `{api_base}/messages`.
//! - **Session cookie**: the web conversation flow. Resolve the first
//!   organization, open a conversation, then stream a completion whose
//!   `data:` lines each carry the full text so far.
//!
//! Cookie mode reports estimated token usage and has no fallback chain.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use kotodama_core::config::{AuthMode, ProviderConfig};
use kotodama_core::types::{
    BrandVoice, GenerateRequest, GenerateResponse, Provider, StyleSummary, UserProfile,
};
use kotodama_core::GenerationError;

use crate::http::{
    api_error, build_http_client, estimate_tokens, parse_style_summary, shape_content,
    transport_error,
};
use crate::prompt::{build_analysis_prompts, build_prompts, Prompts};
use crate::registry::{ProviderSpec, CLAUDE};
use crate::traits::{ProviderClient, SamplingConfig};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_WEB_BASE: &str = "https://claude.ai/api";
const CONVERSATION_NAME: &str = "Tweet Generation";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct Organization {
    uuid: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewConversation<'a> {
    uuid: String,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct Conversation {
    uuid: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    timezone: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionEvent {
    completion: Option<String>,
}

// ─────────────────────────────────────────────
// Streamed completion
// ─────────────────────────────────────────────

/// Line-buffered reader for the web completion stream.
///
/// Chunks may split lines (and UTF-8 sequences) anywhere; only complete
/// lines are decoded. Malformed `data:` payloads are skipped.
#[derive(Debug, Default)]
struct CompletionStream {
    pending: Vec<u8>,
    latest: String,
}

impl CompletionStream {
    fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.consume_line(&line);
        }
    }

    fn finish(mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        self.consume_line(&rest);
        self.latest
    }

    fn consume_line(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        let Some(payload) = line.trim_end().strip_prefix("data: ") else {
            return;
        };
        if let Ok(event) = serde_json::from_str::<CompletionEvent>(payload) {
            if let Some(text) = event.completion.filter(|t| !t.is_empty()) {
                self.latest = text;
            }
        }
    }
}

// ─────────────────────────────────────────────
// ClaudeClient
// ─────────────────────────────────────────────

enum ClaudeAuth {
    ApiKey { api_base: String, api_key: String },
    Session { web_base: String, cookie: String },
}

pub struct ClaudeClient {
    client: reqwest::Client,
    auth: ClaudeAuth,
}

impl std::fmt::Debug for ClaudeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (mode, base) = match &self.auth {
            ClaudeAuth::ApiKey { api_base, .. } => ("api", api_base),
            ClaudeAuth::Session { web_base, .. } => ("cookie", web_base),
        };
        f.debug_struct("ClaudeClient")
            .field("auth_mode", &mode)
            .field("base", base)
            .finish()
    }
}

impl ClaudeClient {
    /// Build a client for the configured auth mode.
    pub fn new(config: &ProviderConfig) -> Result<Self, GenerationError> {
        if !config.is_configured() {
            return Err(GenerationError::MissingCredentials(Provider::Claude));
        }
        let auth = match config.auth_mode {
            AuthMode::Api => ClaudeAuth::ApiKey {
                api_base: config
                    .api_base
                    .clone()
                    .unwrap_or_else(|| CLAUDE.default_api_base.to_string()),
                api_key: config.api_key.trim().to_string(),
            },
            AuthMode::Cookie => ClaudeAuth::Session {
                web_base: config
                    .web_base
                    .clone()
                    .unwrap_or_else(|| DEFAULT_WEB_BASE.to_string()),
                cookie: config
                    .session_cookie
                    .as_deref()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            },
        };
        Ok(Self {
            client: build_http_client()?,
            auth,
        })
    }

    pub fn auth_mode(&self) -> AuthMode {
        match self.auth {
            ClaudeAuth::ApiKey { .. } => AuthMode::Api,
            ClaudeAuth::Session { .. } => AuthMode::Cookie,
        }
    }

    /// Returns `(text, token_usage)`.
    async fn complete(
        &self,
        model: &str,
        prompts: &Prompts,
        sampling: SamplingConfig,
    ) -> Result<(String, u32), GenerationError> {
        match &self.auth {
            ClaudeAuth::ApiKey { api_base, api_key } => {
                self.complete_api(api_base, api_key, model, prompts, sampling)
                    .await
            }
            ClaudeAuth::Session { web_base, cookie } => {
                let text = self
                    .complete_web(web_base, cookie, model, &prompts.combined())
                    .await?;
                let tokens = estimate_tokens(&text);
                Ok((text, tokens))
            }
        }
    }

    async fn complete_api(
        &self,
        api_base: &str,
        api_key: &str,
        model: &str,
        prompts: &Prompts,
        sampling: SamplingConfig,
    ) -> Result<(String, u32), GenerationError> {
        let body = MessagesRequest {
            model,
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            system: &prompts.system,
            messages: [UserMessage {
                role: "user",
                content: &prompts.user,
            }],
        };

        debug!(provider = "claude", model, max_tokens = sampling.max_tokens, "Sending messages request");

        let response = self
            .client
            .post(format!("{}/messages", api_base.trim_end_matches('/')))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Provider::Claude, e))?;

        if !response.status().is_success() {
            return Err(api_error(Provider::Claude, response).await);
        }

        let data: MessagesResponse = response.json().await.map_err(|e| {
            GenerationError::InvalidResponse(format!("Invalid response from Claude API: {e}"))
        })?;
        let tokens = data
            .usage
            .as_ref()
            .map_or(0, |u| u.input_tokens + u.output_tokens);
        let text = data
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| {
                GenerationError::InvalidResponse(
                    "Unexpected response format from Claude API".into(),
                )
            })?;
        Ok((text, tokens))
    }

    async fn complete_web(
        &self,
        web_base: &str,
        cookie: &str,
        model: &str,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let orgs_url = format!("{}/organizations", web_base.trim_end_matches('/'));

        // 1. Organization
        let response = self
            .client
            .get(&orgs_url)
            .header("cookie", cookie)
            .send()
            .await
            .map_err(|e| transport_error(Provider::Claude, e))?;
        if !response.status().is_success() {
            return Err(api_error(Provider::Claude, response).await);
        }
        let orgs: Vec<Organization> = response.json().await.map_err(|e| {
            GenerationError::InvalidResponse(format!("Invalid organization list: {e}"))
        })?;
        let org_id = orgs
            .into_iter()
            .next()
            .and_then(|o| o.uuid)
            .ok_or_else(|| GenerationError::InvalidResponse("No organization found".into()))?;

        // 2. Conversation
        let conversations_url = format!("{orgs_url}/{org_id}/chat_conversations");
        let response = self
            .client
            .post(&conversations_url)
            .header("cookie", cookie)
            .json(&NewConversation {
                uuid: Uuid::new_v4().to_string(),
                name: CONVERSATION_NAME,
            })
            .send()
            .await
            .map_err(|e| transport_error(Provider::Claude, e))?;
        if !response.status().is_success() {
            return Err(api_error(Provider::Claude, response).await);
        }
        let conversation: Conversation = response.json().await.map_err(|e| {
            GenerationError::InvalidResponse(format!("Invalid conversation response: {e}"))
        })?;
        let conversation_id = conversation.uuid.ok_or_else(|| {
            GenerationError::InvalidResponse("Conversation response has no uuid".into())
        })?;

        debug!(provider = "claude", model, org = %org_id, conversation = %conversation_id, "Streaming web completion");

        // 3. Streamed completion
        let response = self
            .client
            .post(format!("{conversations_url}/{conversation_id}/completion"))
            .header("cookie", cookie)
            .json(&CompletionRequest {
                prompt,
                model,
                timezone: "UTC",
            })
            .send()
            .await
            .map_err(|e| transport_error(Provider::Claude, e))?;
        if !response.status().is_success() {
            return Err(api_error(Provider::Claude, response).await);
        }

        let mut stream = response.bytes_stream();
        let mut completion = CompletionStream::default();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport_error(Provider::Claude, e))?;
            completion.push(&chunk);
        }
        Ok(completion.finish())
    }
}

#[async_trait]
impl ProviderClient for ClaudeClient {
    fn spec(&self) -> &'static ProviderSpec {
        &CLAUDE
    }

    fn fallback_models(&self) -> Vec<&'static str> {
        match self.auth {
            ClaudeAuth::ApiKey { .. } => CLAUDE.fallback_chain.to_vec(),
            ClaudeAuth::Session { .. } => Vec::new(),
        }
    }

    async fn generate(
        &self,
        request: &GenerateRequest,
        voice: &BrandVoice,
        target: Option<&UserProfile>,
        model: &str,
    ) -> Result<GenerateResponse, GenerationError> {
        let prompts = build_prompts(request, voice, target, CLAUDE.prompt_style);
        let (text, token_usage) = self
            .complete(model, &prompts, SamplingConfig::for_generation(request.is_thread))
            .await?;
        let content = shape_content(&text, request.is_thread, CLAUDE.split_rule)?;

        info!(
            provider = "claude",
            model,
            auth_mode = ?self.auth_mode(),
            token_usage,
            "Generated content"
        );

        Ok(GenerateResponse {
            content,
            token_usage,
            provider: Provider::Claude,
            model: model.to_string(),
        })
    }

    async fn analyze_style(&self, samples: &[String]) -> Result<StyleSummary, GenerationError> {
        let prompts = build_analysis_prompts(samples);
        let (text, _) = self
            .complete(CLAUDE.analysis_model, &prompts, SamplingConfig::for_analysis())
            .await?;
        parse_style_summary(&text)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
