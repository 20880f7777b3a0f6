use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::ModelTier;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_PRIMARY_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemma-7b-it";

/// Sampling temperature shared by every tier. Kept low for grounded answers.
pub const TEMPERATURE: f32 = 0.5;

/// Deployment mode. Raw provider error text is only exposed in development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn exposes_details(self) -> bool {
        self == RunMode::Development
    }
}

impl FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RunMode::Development),
            "production" | "prod" => Ok(RunMode::Production),
            other => bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }
}

/// Size and time limits applied to every chat request.
#[derive(Debug, Clone)]
pub struct ChatLimits {
    pub max_question_length: usize,
    /// Character ceiling for documentation embedded in the prompt.
    pub max_docs_length: usize,
    pub max_output_tokens: u32,
    pub request_timeout: Duration,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            max_question_length: 500,
            max_docs_length: 15_000,
            max_output_tokens: 4_000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider credential. Its absence is reported per request as a 500, not at boot.
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    /// Caller key checked against `x-api-key`. `None` disables the check.
    pub api_key: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,
    pub limits: ChatLimits,
    pub body_limit_bytes: usize,
    pub database_url: Option<String>,
    pub run_mode: RunMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ChatLimits::default();

        Ok(Config {
            groq_api_key: optional_env("GROQ_API_KEY"),
            groq_base_url: optional_env("GROQ_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
            api_key: optional_env("API_KEY"),
            primary_model: optional_env("PRIMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string()),
            fallback_model: optional_env("FALLBACK_MODEL")
                .unwrap_or_else(|| DEFAULT_FALLBACK_MODEL.to_string()),
            limits: ChatLimits {
                max_question_length: parse_env(
                    "MAX_QUESTION_LENGTH",
                    defaults.max_question_length,
                )?,
                max_docs_length: parse_env("MAX_DOCS_LENGTH", defaults.max_docs_length)?,
                max_output_tokens: parse_env("MAX_OUTPUT_TOKENS", defaults.max_output_tokens)?,
                request_timeout: Duration::from_secs(parse_env(
                    "REQUEST_TIMEOUT_SECS",
                    defaults.request_timeout.as_secs(),
                )?),
            },
            body_limit_bytes: parse_env("BODY_LIMIT_BYTES", 10 * 1024 * 1024)?,
            database_url: optional_env("DATABASE_URL"),
            run_mode: parse_env("APP_ENV", RunMode::Production)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Primary model first, then the fallback. Both share the same parameters.
    pub fn model_tiers(&self) -> Vec<ModelTier> {
        [&self.primary_model, &self.fallback_model]
            .into_iter()
            .map(|model| ModelTier {
                model: model.clone(),
                max_tokens: self.limits.max_output_tokens,
                temperature: TEMPERATURE,
            })
            .collect()
    }
}

#[cfg(test)]
impl Config {
    /// Development-mode config with a provider key set and no caller key.
    pub fn for_tests() -> Self {
        Config {
            groq_api_key: Some("test-groq-key".to_string()),
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            api_key: None,
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            limits: ChatLimits::default(),
            body_limit_bytes: 10 * 1024 * 1024,
            database_url: None,
            run_mode: RunMode::Development,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

/// Returns the variable's value, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_parsing() {
        assert_eq!("development".parse::<RunMode>().unwrap(), RunMode::Development);
        assert_eq!("PRODUCTION".parse::<RunMode>().unwrap(), RunMode::Production);
        assert!("staging".parse::<RunMode>().is_err());
    }

    #[test]
    fn test_only_development_exposes_details() {
        assert!(RunMode::Development.exposes_details());
        assert!(!RunMode::Production.exposes_details());
    }

    #[test]
    fn test_model_tiers_are_primary_then_fallback() {
        let tiers = Config::for_tests().model_tiers();
        let names: Vec<&str> = tiers.iter().map(|t| t.model.as_str()).collect();
        assert_eq!(names, vec![DEFAULT_PRIMARY_MODEL, DEFAULT_FALLBACK_MODEL]);
        assert!(tiers.iter().all(|t| t.max_tokens == 4_000 && t.temperature == TEMPERATURE));
    }

    #[test]
    fn test_default_limits() {
        let limits = ChatLimits::default();
        assert_eq!(limits.max_question_length, 500);
        assert_eq!(limits.max_docs_length, 15_000);
        assert_eq!(limits.max_output_tokens, 4_000);
        assert_eq!(limits.request_timeout, Duration::from_secs(30));
    }
}
