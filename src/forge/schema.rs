// SPDX-License-Identifier: MIT

//! Structured records exchanged with the model

use crate::adk::structured::StructuredOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum title length, in characters
pub const MIN_TITLE_CHARS: usize = 5;

/// A blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Blog {
    /// The title of the blog
    #[schemars(length(min = 5))]
    pub title: String,
    /// The detailed content of the blog
    #[serde(default)]
    pub content: String,
}

impl Blog {
    /// Build a blog, enforcing the title length
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Result<Self, String> {
        let blog = Self {
            title: title.into(),
            content: content.into(),
        };
        blog.validate()?;
        Ok(blog)
    }

    /// Render as a markdown document
    pub fn to_markdown(&self) -> String {
        format!("# {}\n\n{}", self.title, self.content)
    }
}

impl StructuredOutput for Blog {
    const NAME: &'static str = "Blog";

    fn validate(&self) -> Result<(), String> {
        let chars = self.title.chars().count();
        if chars < MIN_TITLE_CHARS {
            return Err(format!(
                "title must have at least {} characters, got {}",
                MIN_TITLE_CHARS, chars
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Blog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "title={:?} content={:?}", self.title, self.content)
    }
}

/// Batch of web search queries requested by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// Multiple natural-language queries for web search
    #[schemars(length(min = 1))]
    pub queries: Vec<String>,
}

impl StructuredOutput for SearchRequest {
    const NAME: &'static str = "SearchRequest";

    fn validate(&self) -> Result<(), String> {
        if self.queries.is_empty() {
            return Err("at least one query is required".to_string());
        }
        if self.queries.iter().any(|q| q.trim().is_empty()) {
            return Err("queries must not be blank".to_string());
        }
        Ok(())
    }
}
