//! `kotodama status` and `kotodama models`.

use anyhow::Result;
use colored::Colorize;

use kotodama_core::config::{get_config_path, load_config, AuthMode, ProviderConfig};
use kotodama_core::types::Provider;
use kotodama_core::utils::get_data_path;
use kotodama_providers::registry::{models_for, spec_for, ModelCategory, TokenTier};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "✍ Kotodama Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );
    println!("  {:<18} {}", "Data dir:".bold(), get_data_path().display());

    let generation = &config.generation;
    println!(
        "  {:<18} {}",
        "Default provider:".bold(),
        generation.default_provider.display_name()
    );
    println!(
        "  {:<18} {} | timeout: {}s | history: {}",
        "Generation:".bold(),
        format!("{:?}", generation.priority_strategy).dimmed(),
        generation.request_timeout_secs,
        if generation.remember_history { "on" } else { "off" },
    );
    println!(
        "  {:<18} {} samples",
        "Analysis depth:".bold(),
        generation.effective_analysis_depth()
    );

    println!();
    println!("  {}", "Providers:".bold());
    for provider in Provider::ALL {
        let spec = spec_for(provider);
        println!(
            "    {:<20} {}  {}",
            provider.display_name(),
            credential_status(config.providers.get(provider)),
            format!("quality {} · fast {}", spec.quality_model, spec.fast_model).dimmed()
        );
    }
    println!();

    Ok(())
}

fn credential_status(config: &ProviderConfig) -> String {
    if !config.is_configured() {
        return format!("{}", "· not configured".dimmed());
    }
    match config.auth_mode {
        AuthMode::Api => format!("{} (key set)", "✓".green()),
        AuthMode::Cookie => format!("{} (session cookie)", "✓".green()),
    }
}

/// Print the model catalogue, optionally for one provider.
pub fn print_models(only: Option<Provider>) {
    let providers: Vec<Provider> = match only {
        Some(p) => vec![p],
        None => Provider::ALL.to_vec(),
    };

    for provider in providers {
        println!();
        println!("{}", provider.display_name().cyan().bold());
        for model in models_for(provider) {
            let category = match model.category {
                ModelCategory::Quality => "quality",
                ModelCategory::Fast => "fast",
                ModelCategory::Reasoning => "reasoning",
            };
            let tier = match model.token_tier {
                Some(TokenTier::Premium) => " · premium tokens",
                Some(TokenTier::Mini) => " · mini tokens",
                None => "",
            };
            println!(
                "  {:<34} {:<22} {}",
                model.id.bold(),
                model.name,
                format!("{category}{tier}: {}", model.description).dimmed()
            );
        }
    }
    println!();
}
