// SPDX-License-Identifier: MIT

use crate::adk::error::ToolError;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools that can be bound to a model.
///
/// `name()`, `description()` and `schema()` return borrowed data so the
/// provider clients can describe the tool on every request without cloning.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name (must be unique within a bound tool set)
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's input parameters
    fn schema(&self) -> &Value;

    /// Execute the tool with the given input and return the result
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;
}
