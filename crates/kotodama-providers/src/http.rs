//! Shared HTTP plumbing for the vendor adapters.

use std::sync::LazyLock;
use std::time::Duration;

use kotodama_core::types::{GeneratedContent, Provider, StyleSummary};
use kotodama_core::GenerationError;
use regex::Regex;
use tracing::error;

use crate::thread::{split_thread, SplitRule};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\n?|\n?```").expect("valid regex"));

/// Build the shared, connection-pooled HTTP client.
///
/// Only the connect phase is bounded here; the orchestrator owns the
/// per-attempt deadline.
pub fn build_http_client() -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| GenerationError::Transport(format!("failed to build HTTP client: {e}")))
}

/// Map a `reqwest` failure (connect, send, body read) to a transport error.
pub fn transport_error(provider: Provider, e: reqwest::Error) -> GenerationError {
    error!(provider = %provider, error = %e, "HTTP request failed");
    GenerationError::Transport(format!(
        "Failed to connect to {} API: {}",
        provider.display_name(),
        e
    ))
}

/// Turn a non-success response into an API error with the vendor's message.
///
/// Tries `error.message`, then `message`, then the raw body.
pub async fn api_error(provider: Provider, response: reqwest::Response) -> GenerationError {
    let status = response.status();
    let raw = response.text().await.unwrap_or_default();
    let message = extract_error_message(&raw).unwrap_or_else(|| {
        format!(
            "{} API request failed with status {}",
            provider.display_name(),
            status.as_u16()
        )
    });

    error!(provider = %provider, status = %status, message = %message, "API error");

    GenerationError::Api {
        status: status.as_u16(),
        message,
    }
}

fn extract_error_message(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    let from_json = serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        });
    Some(from_json.unwrap_or_else(|| raw.to_string()))
}

/// Trim completion text and shape it as a single post or a thread.
///
/// Fails with [`GenerationError::EmptyContent`] when nothing is left.
pub fn shape_content(
    raw: &str,
    is_thread: bool,
    rule: SplitRule,
) -> Result<GeneratedContent, GenerationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(GenerationError::EmptyContent);
    }
    if is_thread {
        Ok(GeneratedContent::Thread(split_thread(text, rule)))
    } else {
        Ok(GeneratedContent::Single(text.to_string()))
    }
}

/// Rough token count for vendors that report none: `ceil(chars / 4)`.
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count();
    chars.div_ceil(4) as u32
}

/// Parse a style summary from model output, tolerating Markdown code fences.
pub fn parse_style_summary(text: &str) -> Result<StyleSummary, GenerationError> {
    let cleaned = CODE_FENCE.replace_all(text.trim(), "");
    serde_json::from_str(cleaned.trim())
        .map_err(|e| GenerationError::InvalidResponse(format!("style analysis is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message_variants() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"bad key"}}"#).as_deref(),
            Some("bad key")
        );
        assert_eq!(
            extract_error_message(r#"{"message":"overloaded"}"#).as_deref(),
            Some("overloaded")
        );
        assert_eq!(
            extract_error_message(r#"{"detail":"x"}"#).as_deref(),
            Some(r#"{"detail":"x"}"#)
        );
        assert_eq!(
            extract_error_message("Bad Gateway").as_deref(),
            Some("Bad Gateway")
        );
        assert!(extract_error_message("   ").is_none());
    }

    #[test]
    fn test_shape_content() {
        assert_eq!(
            shape_content("  hello  ", false, SplitRule::Lines).unwrap(),
            GeneratedContent::Single("hello".into())
        );
        assert_eq!(
            shape_content("one line only", true, SplitRule::NumberedBlocks).unwrap(),
            GeneratedContent::Thread(vec!["one line only".into()])
        );
        assert_eq!(
            shape_content(" \n ", true, SplitRule::Lines),
            Err(GenerationError::EmptyContent)
        );
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("日本語の文"), 2);
    }

    #[test]
    fn test_parse_style_summary_with_fences() {
        let text = "```json\n{\"avgLength\": 80, \"commonPhrases\": [\"lfg\"], \"tone\": {\"formality\": 20, \"humor\": 70, \"technicality\": 40}}\n```";
        let summary = parse_style_summary(text).unwrap();
        assert_eq!(summary.avg_length, 80.0);
        assert_eq!(summary.common_phrases, vec!["lfg"]);
        assert_eq!(summary.tone.humor, 70);
    }

    #[test]
    fn test_parse_style_summary_quoted_avg_length() {
        let summary =
            parse_style_summary(r#"{"avgLength": "96", "commonPhrases": ["ship it"]}"#).unwrap();
        assert_eq!(summary.avg_length, 96.0);
        assert_eq!(summary.common_phrases, vec!["ship it"]);
    }

    #[test]
    fn test_parse_style_summary_rejects_prose() {
        assert!(matches!(
            parse_style_summary("Sure! Here's the analysis."),
            Err(GenerationError::InvalidResponse(_))
        ));
    }
}
