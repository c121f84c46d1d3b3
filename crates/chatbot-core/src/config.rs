use anyhow::{anyhow, Result};

use crate::ai::gemini::DEFAULT_BASE_URL;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

/// Startup settings for the completion service, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Key and model are required and have no
    /// defaults; their values are passed through unchecked.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| anyhow!("{} must be set", name))
        };

        Ok(Self {
            api_key: required(API_KEY_VAR)?,
            model: required(MODEL_VAR)?,
            base_url: lookup(BASE_URL_VAR)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_required_values_and_defaults_base_url() {
        let config = Config::from_lookup(lookup_from(&[
            (API_KEY_VAR, "secret"),
            (MODEL_VAR, "gemini-1.5-flash"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_can_be_overridden() {
        let config = Config::from_lookup(lookup_from(&[
            (API_KEY_VAR, "secret"),
            (MODEL_VAR, "m"),
            (BASE_URL_VAR, "http://127.0.0.1:8080"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = Config::from_lookup(lookup_from(&[(MODEL_VAR, "m")])).unwrap_err();
        assert!(err.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn empty_model_counts_as_missing() {
        let err = Config::from_lookup(lookup_from(&[(API_KEY_VAR, "k"), (MODEL_VAR, "")]))
            .unwrap_err();
        assert!(err.to_string().contains(MODEL_VAR));
    }
}
