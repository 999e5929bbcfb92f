//! Shared CLI helpers: output formatting, target lookup, credential hints.

use anyhow::{Context, Result};
use colored::Colorize;

use kotodama_core::config::get_config_path;
use kotodama_core::store::{HistoryLog, JsonFileStore, ProfileStore};
use kotodama_core::types::{GenerateResponse, Provider, UserProfile, MAX_POST_CHARS};
use kotodama_core::utils::truncate_string;

/// Look up a target profile by id, then by username.
pub fn resolve_target(target: &str) -> Result<UserProfile> {
    let profiles = JsonFileStore::<UserProfile>::profiles()
        .context("failed to open profile store")?;
    for id in target_candidates(target) {
        if let Some(profile) = profiles
            .get_profile(&id)
            .with_context(|| format!("failed to read profile '{id}'"))?
        {
            return Ok(profile);
        }
    }
    anyhow::bail!(
        "target profile '{target}' not found; run `kotodama analyze --username {}` first",
        target.trim_start_matches('@')
    )
}

fn target_candidates(target: &str) -> Vec<String> {
    let target = target.trim();
    let username = target.trim_start_matches('@');
    let mut ids = vec![target.to_string()];
    if !target.starts_with("profile_") {
        ids.push(format!("profile_{username}"));
    }
    ids
}

/// Where a missing credential can be set.
pub fn credential_hint(provider: Provider) -> String {
    let field = match provider {
        Provider::Claude => "API_KEY (or SESSION_COOKIE with AUTH_MODE=cookie)",
        _ => "API_KEY",
    };
    format!(
        "Set it in {} or via KOTODAMA_PROVIDERS__{}__{}",
        get_config_path().display(),
        provider.as_str().to_uppercase(),
        field
    )
}

/// `"(123 chars)"`, red when over the post limit.
pub fn char_count_label(post: &str) -> String {
    let count = post.chars().count();
    let label = format!("({count} chars)");
    if count > MAX_POST_CHARS {
        format!("{} {}", label.red(), "over limit".red().bold())
    } else {
        label.dimmed().to_string()
    }
}

/// Print generated post(s) with per-post character counts.
pub fn print_response(response: &GenerateResponse) {
    println!();
    println!(
        "{}  {}",
        "✍ Kotodama".cyan().bold(),
        format!(
            "{} · {} · {} tokens",
            response.provider.display_name(),
            response.model,
            response.token_usage
        )
        .dimmed()
    );
    println!();

    let posts = response.content.posts();
    if response.content.is_thread() {
        let total = posts.len();
        for (i, post) in posts.iter().enumerate() {
            println!("{} {}", format!("{}/{}", i + 1, total).bold(), char_count_label(post));
            println!("{post}");
            println!();
        }
    } else if let Some(post) = posts.first() {
        println!("{post}");
        println!("{}", char_count_label(post));
        println!();
    }
}

/// Print the most recent history records.
pub fn print_history(limit: usize) -> Result<()> {
    let records = HistoryLog::default_location()
        .recent(limit)
        .context("failed to read history")?;

    if records.is_empty() {
        println!("{}", "(no history yet)".dimmed());
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            record.api_used.as_str().cyan(),
            if record.is_thread { "thread" } else { "post" }.bold()
        );
        println!("  {}", truncate_string(&record.generated_content.replace('\n', " "), 100));
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
