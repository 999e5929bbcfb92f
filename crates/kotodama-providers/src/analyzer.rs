//! Profile analyzer.
//!
//! Style analysis is an enhancement, not a critical path: every failure
//! degrades to [`StyleSummary::default`] instead of reaching the caller.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use kotodama_core::types::{AnalyzedTweet, StyleAttributes, StyleSummary, UserProfile};

use crate::prompt::MAX_COMMON_PHRASES;
use crate::traits::ProviderClient;

/// Ask `client` for a style summary of `samples`. Never fails.
pub async fn analyze_style(
    client: &dyn ProviderClient,
    samples: &[String],
    timeout: Duration,
) -> StyleSummary {
    let provider = client.provider();
    if samples.iter().all(|s| s.trim().is_empty()) {
        warn!(provider = %provider, "No samples to analyze, using default style");
        return StyleSummary::default();
    }

    match tokio::time::timeout(timeout, client.analyze_style(samples)).await {
        Ok(Ok(summary)) => {
            info!(
                provider = %provider,
                samples = samples.len(),
                avg_length = summary.avg_length,
                "Style analysis complete"
            );
            summary
        }
        Ok(Err(e)) => {
            warn!(provider = %provider, error = %e, "Style analysis failed, using default style");
            StyleSummary::default()
        }
        Err(_) => {
            warn!(
                provider = %provider,
                timeout_secs = timeout.as_secs(),
                "Style analysis timed out, using default style"
            );
            StyleSummary::default()
        }
    }
}

/// Assemble a target profile from at most `depth` samples and their analysis.
pub fn build_profile(
    username: &str,
    samples: &[String],
    summary: StyleSummary,
    depth: usize,
) -> UserProfile {
    let now = Utc::now();
    let username = username.trim().trim_start_matches('@');

    let analyzed_tweets = samples
        .iter()
        .filter(|s| !s.trim().is_empty())
        .take(depth)
        .enumerate()
        .map(|(i, content)| AnalyzedTweet {
            tweet_id: format!("tweet_{i}"),
            content: content.trim().to_string(),
            timestamp: now,
        })
        .collect();

    let mut common_phrases = summary.common_phrases;
    common_phrases.truncate(MAX_COMMON_PHRASES);

    UserProfile {
        id: format!("profile_{username}"),
        username: username.to_string(),
        analyzed_tweets,
        style_attributes: StyleAttributes {
            avg_length: summary.avg_length,
            common_phrases,
            tone_profile: summary.tone.into(),
        },
        last_analyzed: now,
    }
}

/// Analyze up to `depth` samples and build the resulting profile.
pub async fn analyze_profile(
    client: &dyn ProviderClient,
    username: &str,
    samples: &[String],
    depth: usize,
    timeout: Duration,
) -> UserProfile {
    let bounded: Vec<String> = samples
        .iter()
        .filter(|s| !s.trim().is_empty())
        .take(depth)
        .cloned()
        .collect();
    let summary = analyze_style(client, &bounded, timeout).await;
    build_profile(username, &bounded, summary, depth)
}
