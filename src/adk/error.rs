// SPDX-License-Identifier: MIT

//! Typed errors for the agent development kit
//!
//! Model and tool failures are kept apart so the workflow layer can tell a
//! contract violation by the LLM (`ModelError::Validation`) from a missing
//! credential or a transport fault.

use thiserror::Error;

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Provider not supported by the model factory
    #[error("Model provider not supported: {0}")]
    UnsupportedProvider(String),

    /// Non-success HTTP status returned by the provider
    #[error("API error from {provider} (status {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Response could not be understood at all
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    /// Structured output did not match the requested schema
    #[error("Structured output failed validation against '{schema}': {message}")]
    Validation { schema: String, message: String },

    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ModelError {
    /// Create a validation error for the named schema
    pub fn validation(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            schema: schema.into(),
            message: message.into(),
        }
    }

    /// True for the output-schema contract violations
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Failures that may succeed when the same request is sent again
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Tool execution errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Credential for the external service is not configured
    #[error("{0} not found in environment variables")]
    MissingCredential(String),

    /// Arguments supplied by the model do not match the tool schema
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// Tool not registered
    #[error("Tool '{0}' not found")]
    NotFound(String),

    /// Error reported by the external service
    #[error("API error from {provider} (status {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// True when the failure comes from missing configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }
}
