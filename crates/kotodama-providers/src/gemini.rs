//! Gemini-style `generateContent` client.
//!
//! The key travels as a `key` query parameter. There is no system role: the
//! system and user prompts go out as one combined user turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kotodama_core::config::ProviderConfig;
use kotodama_core::types::{
    BrandVoice, GenerateRequest, GenerateResponse, Provider, StyleSummary, UserProfile,
};
use kotodama_core::GenerationError;

use crate::http::{api_error, build_http_client, parse_style_summary, shape_content, transport_error};
use crate::prompt::{build_analysis_prompts, build_prompts};
use crate::registry::{ProviderSpec, GEMINI};
use crate::traits::{ProviderClient, SamplingConfig};

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u32,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Result<&str, GenerationError> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or_else(|| {
                GenerationError::InvalidResponse(
                    "Unexpected response format from Gemini API".into(),
                )
            })
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::MissingCredentials(Provider::Gemini));
        }
        Ok(Self {
            client: build_http_client()?,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| GEMINI.default_api_base.to_string()),
            api_key: config.api_key.trim().to_string(),
        })
    }

    async fn generate_content(
        &self,
        model: &str,
        text: &str,
        sampling: SamplingConfig,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            model
        );
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text }],
            }],
            generation_config: GenerationConfig {
                temperature: sampling.temperature,
                max_output_tokens: sampling.max_tokens,
            },
        };

        debug!(provider = "gemini", model, max_tokens = sampling.max_tokens, "Sending generateContent");

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Provider::Gemini, e))?;

        if !response.status().is_success() {
            return Err(api_error(Provider::Gemini, response).await);
        }

        response.json().await.map_err(|e| {
            GenerationError::InvalidResponse(format!("Invalid response from Gemini API: {e}"))
        })
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    fn spec(&self) -> &'static ProviderSpec {
        &GEMINI
    }

    async fn generate(
        &self,
        request: &GenerateRequest,
        voice: &BrandVoice,
        target: Option<&UserProfile>,
        model: &str,
    ) -> Result<GenerateResponse, GenerationError> {
        let prompt = build_prompts(request, voice, target, GEMINI.prompt_style).combined();
        let data = self
            .generate_content(model, &prompt, SamplingConfig::for_generation(request.is_thread))
            .await?;

        let text = data.first_text()?;
        let content = shape_content(text, request.is_thread, GEMINI.split_rule)?;
        let token_usage = data.usage_metadata.as_ref().map_or(0, |u| u.total_token_count);

        info!(provider = "gemini", model, token_usage, "Generated content");

        Ok(GenerateResponse {
            content,
            token_usage,
            provider: Provider::Gemini,
            model: model.to_string(),
        })
    }

    async fn analyze_style(&self, samples: &[String]) -> Result<StyleSummary, GenerationError> {
        let prompt = build_analysis_prompts(samples).combined();
        let data = self
            .generate_content(GEMINI.analysis_model, &prompt, SamplingConfig::for_analysis())
            .await?;
        let text = data.first_text()?;
        parse_style_summary(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kotodama_core::types::GeneratedContent;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base: &str) -> GeminiClient {
        GeminiClient::new(&ProviderConfig {
            api_key: "g-key".into(),
            api_base: Some(base.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn candidate(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}],
            "usageMetadata": {"totalTokenCount": 77}
        })
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = GeminiClient::new(&ProviderConfig::default()).unwrap_err();
        assert_eq!(err, GenerationError::MissingCredentials(Provider::Gemini));
    }

    #[tokio::test]
    async fn test_generate_sends_key_and_combined_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "g-key"))
            .and(body_partial_json(json!({
                "generationConfig": {"temperature": 0.7, "maxOutputTokens": 300}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Hello world\n")))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client(&server.uri())
            .generate(
                &GenerateRequest::new("say hi", "default"),
                &BrandVoice::default_voice(),
                None,
                "gemini-2.5-flash",
            )
            .await
            .unwrap();
        assert_eq!(resp.content, GeneratedContent::Single("Hello world".into()));
        assert_eq!(resp.token_usage, 77);
        assert_eq!(resp.provider, Provider::Gemini);

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert!(text.contains("\n\nUser Request:\nsay hi"));
    }

    #[tokio::test]
    async fn test_thread_uses_numbered_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
                "1/ Opening hook\n2/ The detail\nstill the detail\n3/ Wrap",
            )))
            .mount(&server)
            .await;

        let resp = client(&server.uri())
            .generate(
                &GenerateRequest::new("topic", "default").thread(3),
                &BrandVoice::default_voice(),
                None,
                "gemini-2.5-pro",
            )
            .await
            .unwrap();
        assert_eq!(
            resp.content.as_thread().unwrap(),
            ["Opening hook", "The detail\nstill the detail", "Wrap"]
        );
    }

    #[tokio::test]
    async fn test_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .generate(
                &GenerateRequest::new("topic", "default"),
                &BrandVoice::default_voice(),
                None,
                "gemini-2.5-pro",
            )
            .await
            .unwrap_err();
        assert_eq!(err.api_message(), Some("API key not valid."));
    }

    #[tokio::test]
    async fn test_missing_candidates_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .generate(
                &GenerateRequest::new("topic", "default"),
                &BrandVoice::default_voice(),
                None,
                "gemini-2.5-pro",
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::InvalidResponse("Unexpected response format from Gemini API".into())
        );
    }

    #[tokio::test]
    async fn test_blank_candidate_text_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "  "}]}}]
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .generate(
                &GenerateRequest::new("topic", "default"),
                &BrandVoice::default_voice(),
                None,
                "gemini-2.5-pro",
            )
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::EmptyContent);
    }

    #[tokio::test]
    async fn test_analyze_style_strips_fences() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-lite:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": {"temperature": 0.3, "maxOutputTokens": 500}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
                "```json\n{\"avgLength\": 120, \"commonPhrases\": [], \"tone\": {\"formality\": \"70\", \"humor\": 10, \"technicality\": 55}}\n```",
            )))
            .mount(&server)
            .await;

        let summary = client(&server.uri())
            .analyze_style(&["a tweet".into()])
            .await
            .unwrap();
        assert_eq!(summary.avg_length, 120.0);
        assert_eq!(summary.tone.formality, 70);
    }
}
