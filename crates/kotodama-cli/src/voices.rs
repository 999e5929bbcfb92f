//! `kotodama voices`: manage brand voices.
//!
//! - `kotodama voices list`: list stored voices
//! - `kotodama voices show <ID>`: print one voice as JSON
//! - `kotodama voices validate <FILE>`: check a voice file without saving it
//! - `kotodama voices import <FILE>`: validate and save a voice file
//! - `kotodama voices delete <ID>`: remove a stored voice

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;

use kotodama_core::store::{BrandVoiceStore, JsonFileStore};
use kotodama_core::types::{BrandVoice, ValidationReport};

#[derive(Subcommand)]
pub enum VoicesCommands {
    /// List stored brand voices
    List,

    /// Show a brand voice as JSON
    Show {
        /// Brand voice id
        id: String,
    },

    /// Validate a brand voice JSON file
    Validate {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Validate and store a brand voice JSON file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Delete a stored brand voice
    Delete {
        /// Brand voice id
        id: String,
    },
}

/// Dispatch a voices subcommand against the default store.
pub fn dispatch(action: VoicesCommands) -> Result<()> {
    let store = JsonFileStore::<BrandVoice>::brand_voices()
        .context("failed to open brand voice store")?;
    match action {
        VoicesCommands::List => list(&store),
        VoicesCommands::Show { id } => show(&store, &id),
        VoicesCommands::Validate { file } => {
            let voice = read_voice(&file)?;
            let report = voice.validate();
            print_report(&report);
            if !report.is_valid() {
                bail!("{} is not a valid brand voice", file.display());
            }
            Ok(())
        }
        VoicesCommands::Import { file } => import(&store, &file).map(|_| ()),
        VoicesCommands::Delete { id } => {
            if store.delete_voice(&id)? {
                println!("{} {}", "✓ Deleted".green(), id.bold());
            } else {
                println!("{}", format!("No brand voice '{id}'").dimmed());
            }
            Ok(())
        }
    }
}

fn list(store: &dyn BrandVoiceStore) -> Result<()> {
    let voices = store.list_voices().context("failed to list brand voices")?;
    println!();
    println!("{}", "Brand voices".cyan().bold());
    if voices.is_empty() {
        println!(
            "  {}",
            format!("(none stored; '{}' is always available)", BrandVoice::DEFAULT_ID).dimmed()
        );
    }
    for voice in &voices {
        println!(
            "  {:<24} {:<24} {}",
            voice.id.bold(),
            voice.name,
            format!("{} examples", voice.example_tweets.len()).dimmed()
        );
    }
    println!();
    Ok(())
}

fn show(store: &dyn BrandVoiceStore, id: &str) -> Result<()> {
    let voice = store
        .get_voice(id)?
        .with_context(|| format!("brand voice '{id}' not found"))?;
    println!("{}", serde_json::to_string_pretty(&voice)?);
    Ok(())
}

fn read_voice(path: &Path) -> Result<BrandVoice> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a brand voice JSON file", path.display()))
}

/// Validate `path` and save it; refuses voices with validation errors.
fn import(store: &dyn BrandVoiceStore, path: &Path) -> Result<BrandVoice> {
    let voice = read_voice(path)?;
    let report = voice.validate();
    print_report(&report);
    if !report.is_valid() {
        bail!("refusing to import invalid brand voice '{}'", voice.id);
    }
    store.save_voice(&voice).context("failed to save brand voice")?;
    println!("{} {}", "✓ Imported".green().bold(), voice.id.bold());
    Ok(voice)
}

fn print_report(report: &ValidationReport) {
    for e in &report.errors {
        println!("  {} {}", "error:".red().bold(), e);
    }
    for w in &report.warnings {
        println!("  {} {}", "warning:".yellow().bold(), w);
    }
    for s in &report.suggestions {
        println!("  {} {}", "suggestion:".dimmed(), s);
    }
    if report.is_valid() && report.warnings.is_empty() {
        println!("  {}", "✓ valid".green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_voice(dir: &Path, value: serde_json::Value) -> PathBuf {
        let path = dir.join("voice.json");
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_import_valid_voice() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<BrandVoice>::new(tmp.path().join("voices")).unwrap();
        let path = write_voice(
            tmp.path(),
            json!({
                "id": "builder",
                "name": "Indie Builder",
                "description": "Plainspoken founder sharing progress in public.",
                "exampleTweets": [
                    "Shipped the new onboarding today. Activation is up 12% already.",
                    "Nobody tells you how much of building a company is answering email.",
                    "Week 14 of building in public: revenue is flat, learning is not."
                ],
                "toneAttributes": {"formality": 30, "humor": 40, "technicality": 55,
                                   "empathy": 60, "energy": 70, "authenticity": 90}
            }),
        );

        let voice = import(&store, &path).unwrap();
        assert_eq!(voice.id, "builder");
        assert_eq!(store.get_voice("builder").unwrap().unwrap().name, "Indie Builder");
    }

    #[test]
    fn test_import_rejects_invalid_voice() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<BrandVoice>::new(tmp.path().join("voices")).unwrap();
        let path = write_voice(tmp.path(), json!({"id": "empty", "name": ""}));

        assert!(import(&store, &path).is_err());
        assert!(store.get_voice("empty").unwrap().is_none());
    }

    #[test]
    fn test_read_voice_rejects_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(read_voice(&path).is_err());
    }
}
