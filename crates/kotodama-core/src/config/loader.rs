//! Config loader: reads `~/.kotodama/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.kotodama/config.json`
//! 3. Environment variables `KOTODAMA_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{AuthMode, Config, ProviderConfig};
use crate::types::Provider;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `KOTODAMA_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `KOTODAMA_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `KOTODAMA_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
/// - `KOTODAMA_PROVIDERS__CLAUDE__SESSION_COOKIE` → `providers.claude.session_cookie`
/// - `KOTODAMA_PROVIDERS__CLAUDE__AUTH_MODE` → `providers.claude.auth_mode`
/// - `KOTODAMA_GENERATION__DEFAULT_PROVIDER` → `generation.default_provider`
/// - `KOTODAMA_GENERATION__PRIORITY_STRATEGY` → `generation.priority_strategy`
/// - `KOTODAMA_GENERATION__REQUEST_TIMEOUT_SECS` → `generation.request_timeout_secs`
fn apply_env_overrides(mut config: Config) -> Config {
    for provider in Provider::ALL {
        let name = provider.as_str().to_ascii_uppercase();
        apply_provider_env(config.providers.get_mut(provider), &name);
    }

    if let Ok(val) = std::env::var("KOTODAMA_PROVIDERS__CLAUDE__SESSION_COOKIE") {
        config.providers.claude.session_cookie = Some(val);
    }
    if let Ok(val) = std::env::var("KOTODAMA_PROVIDERS__CLAUDE__AUTH_MODE") {
        match val.to_ascii_lowercase().as_str() {
            "api" => config.providers.claude.auth_mode = AuthMode::Api,
            "cookie" => config.providers.claude.auth_mode = AuthMode::Cookie,
            other => warn!("Ignoring unknown Claude auth mode: {}", other),
        }
    }

    if let Ok(val) = std::env::var("KOTODAMA_GENERATION__DEFAULT_PROVIDER") {
        match val.parse::<Provider>() {
            Ok(p) => config.generation.default_provider = p,
            Err(e) => warn!("Ignoring KOTODAMA_GENERATION__DEFAULT_PROVIDER: {}", e),
        }
    }
    if let Ok(val) = std::env::var("KOTODAMA_GENERATION__PRIORITY_STRATEGY") {
        match val.parse() {
            Ok(s) => config.generation.priority_strategy = s,
            Err(e) => warn!("Ignoring KOTODAMA_GENERATION__PRIORITY_STRATEGY: {}", e),
        }
    }
    if let Ok(val) = std::env::var("KOTODAMA_GENERATION__REQUEST_TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.generation.request_timeout_secs = n;
        }
    }

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env(provider: &mut ProviderConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("KOTODAMA_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("KOTODAMA_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
