//! OpenAI-style chat completions client.
//!
//! Bearer auth against `{api_base}/chat/completions`, separate system and
//! user messages. Some models only accept the default sampling temperature;
//! those are learned at runtime through a shared [`TemperatureMemo`] and
//! retried once without the parameter.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use kotodama_core::config::ProviderConfig;
use kotodama_core::types::{
    BrandVoice, GenerateRequest, GenerateResponse, Provider, StyleSummary, UserProfile,
};
use kotodama_core::GenerationError;

use crate::http::{api_error, build_http_client, parse_style_summary, shape_content, transport_error};
use crate::memo::TemperatureMemo;
use crate::prompt::{build_analysis_prompts, build_prompts, Prompts};
use crate::registry::{ProviderSpec, OPENAI};
use crate::traits::{ProviderClient, SamplingConfig};

/// Model families that never accept a custom temperature.
const FIXED_TEMPERATURE_PREFIXES: &[&str] = &["o1", "gpt-5"];

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

// ─────────────────────────────────────────────
// Temperature heuristics
// ─────────────────────────────────────────────

/// Whether a vendor error message says the temperature parameter must be
/// omitted or left at its default.
pub fn is_temperature_unsupported_error(message: &str) -> bool {
    let m = message.to_lowercase();
    let mentions_temperature = m.contains("temperature");

    let default_only = [
        "default value",
        "default (1) value",
        "value must be 1",
        "set to 1",
        "only 1 value",
        "only one value",
        "fixed at 1",
    ]
    .iter()
    .any(|p| m.contains(p));

    let unsupported = [
        "not support",
        "not allowed",
        "must be the default",
        "cannot be changed",
        "please remove",
        "remove the temperature",
        "unsupported parameter",
    ]
    .iter()
    .any(|p| m.contains(p));

    let explicit = [
        "\"temperature\" does not support",
        "temperature is fixed",
        "temperature' is fixed",
        "temperature must be the default",
        "temperature parameter is not supported",
        "temperature parameter is not allowed",
        "temperature cannot be changed",
    ]
    .iter()
    .any(|p| m.contains(p));

    (mentions_temperature && (default_only || unsupported)) || explicit
}

// ─────────────────────────────────────────────
// OpenAiClient
// ─────────────────────────────────────────────

pub struct OpenAiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    memo: Arc<dyn TemperatureMemo>,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl OpenAiClient {
    /// Build a client from the `openai` provider config.
    pub fn new(
        config: &ProviderConfig,
        memo: Arc<dyn TemperatureMemo>,
    ) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::MissingCredentials(Provider::OpenAi));
        }
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| OPENAI.default_api_base.to_string());

        Ok(Self {
            client: build_http_client()?,
            api_base,
            api_key: config.api_key.trim().to_string(),
            memo,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    /// Whether a custom temperature may be sent to `model`.
    fn can_adjust_temperature(&self, model: &str) -> bool {
        !self.memo.is_unsupported(model)
            && !FIXED_TEMPERATURE_PREFIXES
                .iter()
                .any(|prefix| model.starts_with(prefix))
    }

    /// One chat completion, retried once without temperature when the model
    /// rejects it.
    async fn complete(
        &self,
        model: &str,
        prompts: &Prompts,
        sampling: SamplingConfig,
        json_mode: bool,
    ) -> Result<ChatResponse, GenerationError> {
        let mut include_temperature = self.can_adjust_temperature(model);

        loop {
            let body = ChatRequest {
                model,
                messages: [
                    ChatMessage {
                        role: "system",
                        content: &prompts.system,
                    },
                    ChatMessage {
                        role: "user",
                        content: &prompts.user,
                    },
                ],
                max_completion_tokens: sampling.max_tokens,
                temperature: include_temperature.then_some(sampling.temperature),
                response_format: json_mode.then_some(ResponseFormat {
                    kind: "json_object",
                }),
            };

            debug!(
                provider = "openai",
                model,
                max_tokens = sampling.max_tokens,
                temperature = include_temperature,
                "Sending chat completion"
            );

            let response = self
                .client
                .post(self.completions_url())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| transport_error(Provider::OpenAi, e))?;

            if !response.status().is_success() {
                let err = api_error(Provider::OpenAi, response).await;
                let rejects_temperature = err
                    .api_message()
                    .is_some_and(is_temperature_unsupported_error);
                if include_temperature && rejects_temperature {
                    self.memo.mark_unsupported(model);
                    warn!(model, "Model rejected custom temperature, retrying with default");
                    include_temperature = false;
                    continue;
                }
                return Err(err);
            }

            return response.json::<ChatResponse>().await.map_err(|e| {
                GenerationError::InvalidResponse(format!("Invalid response from OpenAI API: {e}"))
            });
        }
    }
}

/// Pull the assistant text out of a completion, surfacing refusals.
fn message_text(response: ChatResponse) -> Result<String, GenerationError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .ok_or_else(|| {
            GenerationError::InvalidResponse("Unexpected response format from OpenAI API".into())
        })?;

    match message.content {
        Some(text) => Ok(text),
        None => match message.refusal {
            Some(reason) if !reason.trim().is_empty() => Err(GenerationError::Refused(reason)),
            _ => Err(GenerationError::EmptyContent),
        },
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    fn spec(&self) -> &'static ProviderSpec {
        &OPENAI
    }

    async fn generate(
        &self,
        request: &GenerateRequest,
        voice: &BrandVoice,
        target: Option<&UserProfile>,
        model: &str,
    ) -> Result<GenerateResponse, GenerationError> {
        let prompts = build_prompts(request, voice, target, OPENAI.prompt_style);
        let sampling = SamplingConfig::for_generation(request.is_thread);

        let response = self.complete(model, &prompts, sampling, false).await?;
        let token_usage = response.usage.as_ref().map_or(0, |u| u.total_tokens);
        let text = message_text(response)?;
        let content = shape_content(&text, request.is_thread, OPENAI.split_rule)?;

        info!(
            provider = "openai",
            model,
            token_usage,
            posts = content.posts().len(),
            "Generated content"
        );

        Ok(GenerateResponse {
            content,
            token_usage,
            provider: Provider::OpenAi,
            model: model.to_string(),
        })
    }

    async fn analyze_style(&self, samples: &[String]) -> Result<StyleSummary, GenerationError> {
        let prompts = build_analysis_prompts(samples);
        let response = self
            .complete(
                OPENAI.analysis_model,
                &prompts,
                SamplingConfig::for_analysis(),
                true,
            )
            .await?;
        parse_style_summary(&message_text(response)?)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memo::InMemoryTemperatureMemo;
    use kotodama_core::types::GeneratedContent;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn config(base: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: "sk-test".into(),
            api_base: Some(base.to_string()),
            ..Default::default()
        }
    }

    fn completion(text: &str) -> serde_json::Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": text}}],
            "usage": {"total_tokens": 42}
        })
    }

    fn has_temperature(req: &Request) -> bool {
        serde_json::from_slice::<serde_json::Value>(&req.body)
            .map(|v| v.get("temperature").is_some())
            .unwrap_or(false)
    }

    #[test]
    fn test_temperature_error_taxonomy() {
        assert!(is_temperature_unsupported_error(
            "Unsupported value: 'temperature' does not support 0.7 with this model. Only the default (1) value is supported."
        ));
        assert!(is_temperature_unsupported_error(
            "Unsupported parameter: 'temperature' is not supported with this model."
        ));
        assert!(is_temperature_unsupported_error("temperature is fixed for reasoning models"));
        assert!(is_temperature_unsupported_error("Please remove the temperature field"));
        assert!(!is_temperature_unsupported_error("Rate limit exceeded"));
        assert!(!is_temperature_unsupported_error("max_tokens is not supported"));
        assert!(!is_temperature_unsupported_error(""));
    }

    #[test]
    fn test_missing_key_rejected() {
        let memo = Arc::new(InMemoryTemperatureMemo::new());
        let err = OpenAiClient::new(&ProviderConfig::default(), memo).unwrap_err();
        assert_eq!(err, GenerationError::MissingCredentials(Provider::OpenAi));
    }

    #[test]
    fn test_fixed_prefix_models_skip_temperature() {
        let memo = Arc::new(InMemoryTemperatureMemo::new());
        let client = OpenAiClient::new(&config("http://localhost"), memo).unwrap();
        assert!(!client.can_adjust_temperature("gpt-5-mini-2025-08-07"));
        assert!(!client.can_adjust_temperature("o1-preview"));
        assert!(client.can_adjust_temperature("gpt-4o-2024-11-20"));
    }

    #[tokio::test]
    async fn test_single_post_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-2024-11-20",
                "max_completion_tokens": 300,
                "temperature": 0.7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("  Shipping beats perfect.  ")))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiClient::new(&config(&server.uri()), Arc::new(InMemoryTemperatureMemo::new()))
                .unwrap();
        let request = GenerateRequest::new("productivity tips", "default");
        let resp = client
            .generate(&request, &BrandVoice::default_voice(), None, "gpt-4o-2024-11-20")
            .await
            .unwrap();

        assert_eq!(resp.content, GeneratedContent::Single("Shipping beats perfect.".into()));
        assert_eq!(resp.token_usage, 42);
        assert_eq!(resp.provider, Provider::OpenAi);
        assert_eq!(resp.model, "gpt-4o-2024-11-20");

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let system = body["messages"][0]["content"].as_str().unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(system.contains("Formality: 50/100"));
        assert_eq!(body["messages"][1]["content"], "productivity tips");
    }

    #[tokio::test]
    async fn test_thread_is_split_into_posts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"max_completion_tokens": 1500})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                "1. First point\nMore on point one\n2. Second point",
            )))
            .mount(&server)
            .await;

        let client =
            OpenAiClient::new(&config(&server.uri()), Arc::new(InMemoryTemperatureMemo::new()))
                .unwrap();
        let request = GenerateRequest::new("topic", "default").thread(2);
        let resp = client
            .generate(&request, &BrandVoice::default_voice(), None, "gpt-4o-2024-11-20")
            .await
            .unwrap();

        assert_eq!(
            resp.content,
            GeneratedContent::Thread(vec![
                "First point\nMore on point one".into(),
                "Second point".into()
            ])
        );
    }

    #[tokio::test]
    async fn test_temperature_rejection_is_memoized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(|req: &Request| has_temperature(req))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "Unsupported value: 'temperature' does not support 0.7 with this model. Only the default (1) value is supported."}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(|req: &Request| !has_temperature(req))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .expect(2)
            .mount(&server)
            .await;

        let memo = Arc::new(InMemoryTemperatureMemo::new());
        let client = OpenAiClient::new(&config(&server.uri()), memo.clone()).unwrap();
        let request = GenerateRequest::new("topic", "default");
        let voice = BrandVoice::default_voice();

        let first = client
            .generate(&request, &voice, None, "gpt-4.1-custom")
            .await
            .unwrap();
        assert_eq!(first.content.as_single(), Some("ok"));
        assert!(memo.is_unsupported("gpt-4.1-custom"));

        // Second call goes straight to the default temperature.
        client
            .generate(&request, &voice, None, "gpt-4.1-custom")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit exceeded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let memo = Arc::new(InMemoryTemperatureMemo::new());
        let client = OpenAiClient::new(&config(&server.uri()), memo.clone()).unwrap();
        let err = client
            .generate(
                &GenerateRequest::new("topic", "default"),
                &BrandVoice::default_voice(),
                None,
                "gpt-4o-2024-11-20",
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::Api {
                status: 429,
                message: "Rate limit exceeded".into()
            }
        );
        assert!(memo.is_empty());
    }

    #[tokio::test]
    async fn test_refusal_and_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": null, "refusal": "I can't help with that."}}]
            })))
            .mount(&server)
            .await;

        let client =
            OpenAiClient::new(&config(&server.uri()), Arc::new(InMemoryTemperatureMemo::new()))
                .unwrap();
        let err = client
            .generate(
                &GenerateRequest::new("topic", "default"),
                &BrandVoice::default_voice(),
                None,
                "gpt-4o-2024-11-20",
            )
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::Refused("I can't help with that.".into()));

        server.reset().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
            .mount(&server)
            .await;
        let err = client
            .generate(
                &GenerateRequest::new("topic", "default"),
                &BrandVoice::default_voice(),
                None,
                "gpt-4o-2024-11-20",
            )
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::EmptyContent);
    }

    #[tokio::test]
    async fn test_analyze_style_uses_json_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini-2024-07-18",
                "max_completion_tokens": 500,
                "temperature": 0.3,
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"{"avgLength": 96, "commonPhrases": ["ship it"], "tone": {"formality": 30, "humor": 65, "technicality": 80}}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiClient::new(&config(&server.uri()), Arc::new(InMemoryTemperatureMemo::new()))
                .unwrap();
        let summary = client
            .analyze_style(&["first".into(), "second".into()])
            .await
            .unwrap();
        assert_eq!(summary.avg_length, 96.0);
        assert_eq!(summary.tone.technicality, 80);
    }
}
