//! `kotodama analyze`: build and save a target profile from sample posts.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use kotodama_core::config::load_config;
use kotodama_core::store::{JsonFileStore, ProfileStore};
use kotodama_core::types::{Provider, UserProfile};
use kotodama_providers::{analyze_profile, create_client, InMemoryTemperatureMemo};

use crate::helpers::credential_hint;

/// Read one sample per non-blank line.
pub fn read_samples(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read samples from {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Run the analyze command.
pub async fn run(username: &str, file: &Path, provider: Option<Provider>) -> Result<()> {
    let username = username.trim().trim_start_matches('@');
    if username.is_empty() {
        bail!("username must not be empty");
    }
    let samples = read_samples(file)?;
    if samples.is_empty() {
        bail!("{} contains no sample posts", file.display());
    }

    let config = load_config(None);
    let provider = provider.unwrap_or(config.generation.default_provider);
    let client = create_client(
        provider,
        config.providers.get(provider),
        Arc::new(InMemoryTemperatureMemo::new()),
    )
    .map_err(|e| anyhow::anyhow!("{e}. {}", credential_hint(provider)))?;

    let depth = config.generation.effective_analysis_depth();
    let timeout = Duration::from_secs(config.generation.request_timeout_secs.max(1));
    let profile = analyze_profile(client.as_ref(), username, &samples, depth, timeout).await;

    JsonFileStore::<UserProfile>::profiles()
        .and_then(|store| store.save_profile(&profile))
        .context("failed to save profile")?;

    let style = &profile.style_attributes;
    println!();
    println!("{} {}", "✓ Saved profile".green().bold(), profile.id.bold());
    println!("  {:<16} {}", "Samples:".bold(), profile.analyzed_tweets.len());
    println!("  {:<16} {:.0} chars", "Avg length:".bold(), style.avg_length);
    println!(
        "  {:<16} formality {} · humor {} · technicality {}",
        "Tone:".bold(),
        style.tone_profile.formality,
        style.tone_profile.humor,
        style.tone_profile.technicality
    );
    if !style.common_phrases.is_empty() {
        println!("  {:<16} {}", "Phrases:".bold(), style.common_phrases.join(", "));
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_samples_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gm builders\n\n   \n  shipping today  ").unwrap();
        let samples = read_samples(file.path()).unwrap();
        assert_eq!(samples, vec!["gm builders", "shipping today"]);
    }

    #[test]
    fn test_read_samples_missing_file() {
        assert!(read_samples(Path::new("/definitely/not/here.txt")).is_err());
    }
}
