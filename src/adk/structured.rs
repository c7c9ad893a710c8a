// SPDX-License-Identifier: MIT

//! Structured output - coerce a model response into a typed schema
//!
//! The target type derives its JSON schema with `schemars`; the schema is sent
//! as the response format and the returned text is parsed and validated.
//! Every mismatch surfaces as [`ModelError::Validation`].

use crate::adk::error::ModelError;
use crate::adk::message::Message;
use crate::adk::model::{GenerationConfig, Model, ResponseFormat};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// A type a model can be asked to produce directly
pub trait StructuredOutput: DeserializeOwned + JsonSchema + Send {
    /// Schema name sent to the provider
    const NAME: &'static str;

    /// Constraints the JSON schema alone does not enforce
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// JSON schema of `T` as a plain object
pub fn schema_of<T: JsonSchema>() -> Value {
    let root = schemars::schema_for!(T);
    let mut value = serde_json::to_value(root).unwrap_or_else(|_| json!({ "type": "object" }));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
    }
    value
}

/// Response format constraining output to `T`
pub fn response_format<T: StructuredOutput>() -> ResponseFormat {
    ResponseFormat {
        name: T::NAME.to_string(),
        schema: schema_of::<T>(),
    }
}

/// Locate the JSON object in a model reply, skipping code fences or prose
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse and validate a model reply as `T`
pub fn parse_structured<T: StructuredOutput>(text: &str) -> Result<T, ModelError> {
    let raw = extract_json_object(text)
        .ok_or_else(|| ModelError::validation(T::NAME, "response contains no JSON object"))?;

    let value: T =
        serde_json::from_str(raw).map_err(|e| ModelError::validation(T::NAME, e.to_string()))?;

    value
        .validate()
        .map_err(|message| ModelError::validation(T::NAME, message))?;

    Ok(value)
}

/// Invoke `model` in structured-output mode and return a validated `T`
pub async fn invoke_structured<T: StructuredOutput>(
    model: &dyn Model,
    history: &[Message],
    base: Option<&GenerationConfig>,
) -> Result<T, ModelError> {
    let mut config = base.cloned().unwrap_or_default();
    config.response_format = Some(response_format::<T>());

    let response = model.generate_content(history, Some(&config), None).await?;
    parse_structured::<T>(response.content())
}
