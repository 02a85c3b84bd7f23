//! Load configuration from XDG `config.toml` and project `.env`, then apply to the
//! process environment with priority: **existing env > .env > XDG**.
//!
//! Also the single place that knows the environment keys promptstrip reads
//! ([`SIMILARITY_THRESHOLD_VAR`], [`OPENROUTER_API_KEY_VAR`], [`OPENAI_API_KEY_VAR`])
//! and how to turn the raw threshold string into a usable value
//! ([`similarity_threshold`]).

mod dotenv;
mod xdg_toml;

use std::path::Path;
use thiserror::Error;

/// Env var holding the similarity threshold override (float string).
pub const SIMILARITY_THRESHOLD_VAR: &str = "SIMILARITY_THRESHOLD";
/// Env var for the OpenRouter credential; preferred over OpenAI when set.
pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";
/// Env var for the OpenAI credential; fallback when OpenRouter is not set.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Threshold used when the env var is missing, unparseable, or NaN.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.92;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Loads config from XDG `config.toml` and an optional project `.env`, then sets
/// environment variables only for keys that are **not** already set, so the
/// existing process environment always wins.
///
/// Order of precedence when a key is missing from the process environment:
/// 1. Value from project `.env` (current directory, or `override_dir` if given)
/// 2. Value from `$XDG_CONFIG_HOME/<app_name>/config.toml` `[env]` table
///
/// * `app_name`: e.g. `"promptstrip"` — picks `~/.config/<app_name>/config.toml`.
/// * `override_dir`: if `Some`, look for `.env` there instead of the current dir.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let mut keys: std::collections::HashSet<&String> = dotenv_map.keys().collect();
    keys.extend(xdg_map.keys());

    for key in keys {
        if std::env::var(key).is_ok() {
            continue; // existing env wins
        }
        if let Some(value) = dotenv_map.get(key).or_else(|| xdg_map.get(key)) {
            std::env::set_var(key, value);
        }
    }

    Ok(())
}

/// Clamps a threshold into `[0, 1]`; NaN falls back to the default.
pub fn clamp_threshold(value: f32) -> f32 {
    if value.is_nan() {
        DEFAULT_SIMILARITY_THRESHOLD
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Similarity threshold from [`SIMILARITY_THRESHOLD_VAR`], clamped to `[0, 1]`.
///
/// Missing or unparseable values fall back to [`DEFAULT_SIMILARITY_THRESHOLD`];
/// out-of-range values are clamped rather than rejected.
pub fn similarity_threshold() -> f32 {
    match std::env::var(SIMILARITY_THRESHOLD_VAR) {
        Ok(raw) => match raw.trim().parse::<f32>() {
            Ok(value) => clamp_threshold(value),
            Err(_) => DEFAULT_SIMILARITY_THRESHOLD,
        },
        Err(_) => DEFAULT_SIMILARITY_THRESHOLD,
    }
}
