//! Process configuration, read from the environment once at startup.

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const MODEL_VAR: &str = "OPENAI_MODEL";
const API_BASE_VAR: &str = "OPENAI_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    /// Alternate endpoint for OpenAI-compatible servers.
    pub api_base: Option<String>,
}

impl Config {
    /// Load from the process environment, after applying any `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(%err, "ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = non_blank(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;
        let model = non_blank(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = non_blank(API_BASE_VAR);

        Ok(Config {
            api_key,
            model,
            api_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn requires_api_key() {
        let result = Config::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));

        let result = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn defaults_model() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.api_base.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4.1"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn error_names_the_variable() {
        assert_eq!(
            ConfigError::MissingApiKey.to_string(),
            "OPENAI_API_KEY is not set"
        );
    }
}
