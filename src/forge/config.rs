// SPDX-License-Identifier: MIT

//! Settings loaded from the environment
//!
//! All variables are read and checked in one pass; every problem is
//! collected into a single [`ConfigError::Invalid`].

use crate::adk::model::{ModelSpec, Provider};
use crate::adk::retry::RetryPolicy;
use crate::forge::error::ConfigError;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 2;

/// Application settings
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub model_name: String,
    pub model_provider: String,
    pub ai_api_key: String,
    pub ai_base_url: Option<String>,
    pub temperature: f32,
    pub search_max_results: usize,
    pub model_max_retries: u32,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("model_name", &self.model_name)
            .field("model_provider", &self.model_provider)
            .field("ai_api_key", &"***")
            .field("ai_base_url", &self.ai_base_url)
            .field("temperature", &self.temperature)
            .field("search_max_results", &self.search_max_results)
            .field("model_max_retries", &self.model_max_retries)
            .finish()
    }
}

impl Settings {
    /// Load settings from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Vec::new();

        // Blank values count as absent
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut required = |key: &str| match get(key) {
            Some(v) => v,
            None => {
                problems.push(format!("{} can't be blank, please configure in .env file", key));
                String::new()
            }
        };

        let model_name = required("MODEL_NAME");
        let model_provider = required("MODEL_PROVIDER");
        let ai_api_key = required("AI_API_KEY");

        if !model_provider.is_empty() {
            if let Err(e) = Provider::parse(&model_provider) {
                problems.push(format!("MODEL_PROVIDER: {}", e));
            }
        }

        let ai_base_url = get("AI_BASE_URL");
        if let Some(raw) = &ai_base_url {
            if let Err(e) = url::Url::parse(raw) {
                problems.push(format!("AI_BASE_URL '{}' is not a valid URL: {}", raw, e));
            }
        }

        let temperature = match get("AI_TEMPERATURE") {
            None => DEFAULT_TEMPERATURE,
            Some(raw) => match raw.parse::<f32>() {
                Ok(t) if (0.0..=2.0).contains(&t) => t,
                Ok(t) => {
                    problems.push(format!("AI_TEMPERATURE must be between 0.0 and 2.0, got {}", t));
                    DEFAULT_TEMPERATURE
                }
                Err(_) => {
                    problems.push(format!("AI_TEMPERATURE '{}' is not a number", raw));
                    DEFAULT_TEMPERATURE
                }
            },
        };

        let search_max_results = match get("SEARCH_MAX_RESULTS") {
            None => DEFAULT_SEARCH_MAX_RESULTS,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    problems.push(format!(
                        "SEARCH_MAX_RESULTS must be a positive integer, got '{}'",
                        raw
                    ));
                    DEFAULT_SEARCH_MAX_RESULTS
                }
            },
        };

        let model_max_retries = match get("MODEL_MAX_RETRIES") {
            None => 0,
            Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| {
                problems.push(format!(
                    "MODEL_MAX_RETRIES must be a non-negative integer, got '{}'",
                    raw
                ));
                0
            }),
        };

        if !problems.is_empty() {
            return Err(ConfigError::Invalid(problems));
        }

        Ok(Self {
            model_name,
            model_provider,
            ai_api_key,
            ai_base_url,
            temperature,
            search_max_results,
            model_max_retries,
        })
    }

    /// Model identity and credentials for [`crate::adk::model::create_model`]
    pub fn model_spec(&self) -> ModelSpec {
        ModelSpec {
            model_name: self.model_name.clone(),
            provider: self.model_provider.clone(),
            api_key: self.ai_api_key.clone(),
            base_url: self.ai_base_url.clone(),
            temperature: self.temperature,
        }
    }

    /// Retry policy for model calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.model_max_retries, Duration::from_millis(500))
    }
}
