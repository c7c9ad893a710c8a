// SPDX-License-Identifier: MIT

//! Error types for the blog workflow
//!
//! Every node failure aborts the run. [`WorkflowError::kind`] classifies the
//! failure so callers can map it to a user-visible status.

use crate::adk::error::{ModelError, ToolError};
use crate::forge::workflow::graph::NodeId;
use serde::Serialize;
use thiserror::Error;

/// Top-level error type for blogforge-rs
#[derive(Debug, Error)]
pub enum BlogForgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration problems found while loading settings
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Every missing or invalid setting, reported together
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Coarse failure classes of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input or a broken state invariant
    Precondition,
    /// The model's output did not match the requested schema
    Validation,
    /// Missing credential or setting
    Configuration,
    /// Model or search service failure
    Upstream,
    /// Executor misbehaviour
    Internal,
}

/// Errors raised while running the workflow graph
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{node}: {message}")]
    Precondition { node: NodeId, message: String },

    #[error("{node}: failed to generate content: {source}")]
    Generation {
        node: NodeId,
        #[source]
        source: ModelError,
    },

    #[error("translate_blog: failed to translate blog: {source}")]
    Translation {
        #[source]
        source: ModelError,
    },

    #[error("{node}: configuration error: {message}")]
    Configuration { node: NodeId, message: String },

    #[error("{node}: tool execution failed: {source}")]
    Tool {
        node: NodeId,
        #[source]
        source: ToolError,
    },

    #[error("Workflow exceeded {0} steps")]
    StepLimit(usize),
}

impl WorkflowError {
    pub fn precondition(node: NodeId, message: impl Into<String>) -> Self {
        Self::Precondition {
            node,
            message: message.into(),
        }
    }

    /// Classify the failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Precondition { .. } => ErrorKind::Precondition,
            Self::Generation { source, .. } | Self::Translation { source } => {
                if source.is_validation() {
                    ErrorKind::Validation
                } else {
                    ErrorKind::Upstream
                }
            }
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Tool { source, .. } => match source {
                ToolError::MissingCredential(_) => ErrorKind::Configuration,
                // Planner produced arguments that do not fit the tool schema
                ToolError::InvalidArguments(_) => ErrorKind::Validation,
                _ => ErrorKind::Upstream,
            },
            Self::StepLimit(_) => ErrorKind::Internal,
        }
    }

    /// Node that raised the failure, if any
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Precondition { node, .. }
            | Self::Generation { node, .. }
            | Self::Configuration { node, .. }
            | Self::Tool { node, .. } => Some(*node),
            Self::Translation { .. } => Some(NodeId::Translate),
            Self::StepLimit(_) => None,
        }
    }
}
