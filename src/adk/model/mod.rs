// SPDX-License-Identifier: MIT

//! Model module - defines LLM model trait and implementations
//!
//! This module provides the core Model trait, generation options and the
//! factory that turns a provider name plus credentials into a chat model.
//! Model implementations are in their own submodules:
//! - [anthropic] - Anthropic's Claude API
//! - [openai] - OpenAI's chat completions API (and compatible gateways)

pub mod anthropic;
pub mod openai;

use crate::adk::error::ModelError;
use crate::adk::message::Message;
use crate::adk::tool::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Schema the model output must conform to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// Schema name, used by providers as the function/format identifier
    pub name: String,
    /// JSON schema of the expected object
    pub schema: Value,
}

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
    /// Constrain the response to a JSON object matching this schema
    pub response_format: Option<ResponseFormat>,
}

/// Core trait for LLM model implementations
///
/// Implementations always answer with a [`Message::Ai`]. Passing `tools`
/// binds them for this call; requested invocations come back as the
/// message's tool calls.
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate_content(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Message, ModelError>;
}

/// Wire protocol family of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Groq,
    Ollama,
    OpenRouter,
    /// Any OpenAI-compatible gateway; requires an explicit base URL
    OpenAiCompatible,
    Anthropic,
}

impl Provider {
    /// Parse a provider name as used in `MODEL_PROVIDER`
    pub fn parse(name: &str) -> Result<Self, ModelError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            "ollama" => Ok(Self::Ollama),
            "openrouter" => Ok(Self::OpenRouter),
            "openai-compatible" | "openai_compatible" => Ok(Self::OpenAiCompatible),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ModelError::UnsupportedProvider(other.to_string())),
        }
    }

    /// Base URL used when none is configured
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::Groq => Some("https://api.groq.com/openai/v1"),
            Self::Ollama => Some("http://localhost:11434/v1"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Self::OpenAiCompatible => None,
            Self::Anthropic => Some("https://api.anthropic.com/v1"),
        }
    }
}

/// Everything needed to construct a chat model
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub model_name: String,
    pub provider: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub temperature: f32,
}

/// Create a chat model for the given provider and credentials
pub fn create_model(spec: &ModelSpec) -> Result<Arc<dyn Model>, ModelError> {
    let provider = Provider::parse(&spec.provider)?;

    if spec.api_key.trim().is_empty() {
        return Err(ModelError::ApiKeyMissing(spec.provider.clone()));
    }

    let base_url = match (&spec.base_url, provider.default_base_url()) {
        (Some(url), _) => url.trim_end_matches('/').to_string(),
        (None, Some(url)) => url.to_string(),
        (None, None) => {
            return Err(ModelError::UnsupportedProvider(format!(
                "{} (a base URL is required)",
                spec.provider
            )))
        }
    };

    log::info!(
        "Creating model {} for provider {:?} at {}",
        spec.model_name,
        provider,
        base_url
    );

    let model: Arc<dyn Model> = match provider {
        Provider::Anthropic => Arc::new(
            anthropic::AnthropicModel::new(
                spec.model_name.clone(),
                spec.api_key.clone(),
                base_url,
            )
            .with_temperature(spec.temperature),
        ),
        _ => Arc::new(
            openai::OpenAIModel::new(spec.model_name.clone(), spec.api_key.clone(), base_url)
                .with_temperature(spec.temperature),
        ),
    };

    Ok(model)
}

/// Turn a non-success provider response into a [`ModelError`]
pub(crate) async fn error_from_response(provider: &str, resp: reqwest::Response) -> ModelError {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        return ModelError::RateLimited { retry_after_secs };
    }

    let message = resp.text().await.unwrap_or_default();
    ModelError::Api {
        provider: provider.to_string(),
        status: status.as_u16(),
        message,
    }
}
