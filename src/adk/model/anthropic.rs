// SPDX-License-Identifier: MIT

//! Anthropic Model - Claude messages API implementation
//!
//! Structured output is obtained by forcing a single tool whose input schema
//! is the requested response schema; the tool input becomes the message text.

use super::{error_from_response, GenerationConfig, Model};
use crate::adk::error::ModelError;
use crate::adk::message::{Message, ToolCall};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;

/// Anthropic Claude model implementation
pub struct AnthropicModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
    temperature: Option<f32>,
}

impl AnthropicModel {
    /// Create a new AnthropicModel against `base_url` (e.g. `https://api.anthropic.com/v1`)
    pub fn new(model_name: String, api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model_name,
            base_url,
            temperature: None,
        }
    }

    /// Default sampling temperature when the call does not set one
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        // Anthropic accepts 0.0..=1.0
        self.temperature = Some(temperature.clamp(0.0, 1.0));
        self
    }

    /// Join every system message into the top-level system prompt
    fn extract_system_message(history: &[Message]) -> Option<String> {
        let system: Vec<&str> = history
            .iter()
            .filter_map(|m| match m {
                Message::System { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();

        if system.is_empty() {
            None
        } else {
            Some(system.join("\n\n"))
        }
    }

    /// Convert a Message to Anthropic message format
    fn message_to_anthropic(message: &Message) -> Option<Value> {
        match message {
            Message::System { .. } => None,
            Message::Human { content } => Some(json!({
                "role": "user",
                "content": [{ "type": "text", "text": content }]
            })),
            Message::Ai {
                content,
                tool_calls,
            } => {
                let mut blocks = Vec::new();
                if !content.is_empty() {
                    blocks.push(json!({ "type": "text", "text": content }));
                }
                for tc in tool_calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": tc.id,
                        "name": tc.name,
                        "input": tc.args
                    }));
                }
                if blocks.is_empty() {
                    return None;
                }
                Some(json!({ "role": "assistant", "content": blocks }))
            }
            Message::Tool {
                tool_call_id,
                content,
                ..
            } => Some(json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": tool_call_id,
                    "content": content
                }]
            })),
        }
    }

    /// Convert tools to Anthropic tool format
    fn tools_to_anthropic_format(tools: &[Arc<dyn Tool>]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "input_schema": t.schema()
                })
            })
            .collect()
    }

    fn build_body(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Value {
        let mut messages: Vec<Value> = history
            .iter()
            .filter_map(Self::message_to_anthropic)
            .collect();
        let mut system = Self::extract_system_message(history);

        // The API requires at least one turn; a system-only history becomes the user turn
        if messages.is_empty() {
            if let Some(instruction) = system.take() {
                messages.push(json!({
                    "role": "user",
                    "content": [{ "type": "text", "text": instruction }]
                }));
            }
        }

        let mut body = json!({
            "model": self.model_name,
            "messages": messages,
            "max_tokens": config.and_then(|c| c.max_output_tokens).unwrap_or(4096)
        });

        if let Some(sys) = system {
            body["system"] = json!(sys);
        }

        if let Some(temp) = config.and_then(|c| c.temperature).or(self.temperature) {
            body["temperature"] = json!(temp);
        }
        if let Some(top_p) = config.and_then(|c| c.top_p) {
            body["top_p"] = json!(top_p);
        }

        if let Some(format) = config.and_then(|c| c.response_format.as_ref()) {
            body["tools"] = json!([{
                "name": format.name,
                "description": format!("Respond with a {} object", format.name),
                "input_schema": format.schema
            }]);
            body["tool_choice"] = json!({ "type": "tool", "name": format.name });
        } else if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = json!(Self::tools_to_anthropic_format(tools));
            }
        }

        body
    }

    /// Parse Anthropic response into an AI message
    ///
    /// When `structured` names a forced output tool, its input is returned as
    /// JSON text instead of a tool call.
    fn parse_anthropic_response(
        response: &Value,
        structured: Option<&str>,
    ) -> Result<Message, ModelError> {
        let blocks = response["content"].as_array().ok_or_else(|| {
            ModelError::InvalidResponse("No content in Anthropic response".into())
        })?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in blocks {
            match block["type"].as_str() {
                Some("text") => {
                    if let Some(t) = block["text"].as_str() {
                        text.push_str(t);
                    }
                }
                Some("tool_use") => {
                    let name = block["name"].as_str().unwrap_or_default();
                    if structured == Some(name) {
                        return Ok(Message::ai(block["input"].to_string()));
                    }
                    let id = block["id"]
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("tool_{}", name));
                    tool_calls.push(ToolCall::new(id, name, block["input"].clone()));
                }
                _ => {}
            }
        }

        if let Some(stop_reason) = response["stop_reason"].as_str() {
            log::debug!("Anthropic stop reason: {}", stop_reason);
        }

        Ok(Message::ai_with_tool_calls(text, tool_calls))
    }
}

#[async_trait]
impl Model for AnthropicModel {
    async fn generate_content(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Message, ModelError> {
        let url = format!("{}/messages", self.base_url);
        let body = self.build_body(history, config, tools);

        log::debug!(
            "Anthropic request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response("anthropic", resp).await);
        }

        let resp_json: Value = resp.json().await?;
        log::debug!("Anthropic response: {}", resp_json);

        let structured = config
            .and_then(|c| c.response_format.as_ref())
            .map(|f| f.name.as_str());
        Self::parse_anthropic_response(&resp_json, structured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::model::ResponseFormat;
    use serde_json::json;

    fn model() -> AnthropicModel {
        AnthropicModel::new(
            "claude-3-5-haiku-latest".to_string(),
            "key".to_string(),
            "https://api.anthropic.com/v1".to_string(),
        )
    }

    #[test]
    fn test_extract_system_message() {
        let history = vec![Message::system("You are helpful"), Message::human("Hello")];
        assert_eq!(
            AnthropicModel::extract_system_message(&history),
            Some("You are helpful".to_string())
        );
        assert_eq!(
            AnthropicModel::extract_system_message(&[Message::human("Hi")]),
            None
        );
    }

    #[test]
    fn test_system_messages_are_not_sent_inline() {
        assert!(AnthropicModel::message_to_anthropic(&Message::system("sys")).is_none());
    }

    #[test]
    fn test_system_only_history_is_sent_as_user_turn() {
        let body = model().build_body(
            &[Message::system("You are an expert in generating the blog")],
            None,
            None,
        );
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(
            messages[0]["content"][0]["text"],
            "You are an expert in generating the blog"
        );
        assert!(body.get("system").is_none());

        let body = model().build_body(
            &[Message::system("Translate"), Message::human("Blog content")],
            None,
            None,
        );
        assert_eq!(body["system"], "Translate");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["content"][0]["text"], "Blog content");
    }

    #[test]
    fn test_tool_result_message() {
        let wire =
            AnthropicModel::message_to_anthropic(&Message::tool("toolu_1", "search", "{}")).unwrap();
        assert_eq!(wire["role"], "user");
        assert_eq!(wire["content"][0]["type"], "tool_result");
        assert_eq!(wire["content"][0]["tool_use_id"], "toolu_1");
    }

    #[test]
    fn test_temperature_is_clamped() {
        let body = model()
            .with_temperature(1.6)
            .build_body(&[Message::human("hi")], None, None);
        assert_eq!(body["temperature"], json!(1.0));
    }

    #[test]
    fn test_build_body_forces_structured_tool() {
        let config = GenerationConfig {
            response_format: Some(ResponseFormat {
                name: "Blog".to_string(),
                schema: json!({"type": "object"}),
            }),
            ..Default::default()
        };
        let body = model().build_body(
            &[Message::system("write"), Message::human("topic")],
            Some(&config),
            None,
        );
        assert_eq!(body["system"], "write");
        assert_eq!(body["tools"][0]["name"], "Blog");
        assert_eq!(body["tool_choice"]["name"], "Blog");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_structured_response() {
        let response = json!({
            "content": [{
                "type": "tool_use",
                "id": "toolu_1",
                "name": "Blog",
                "input": {"title": "Sleep well", "content": "..."}
            }],
            "stop_reason": "tool_use"
        });
        let msg = AnthropicModel::parse_anthropic_response(&response, Some("Blog")).unwrap();
        assert!(!msg.has_tool_calls());
        let value: Value = serde_json::from_str(msg.content()).unwrap();
        assert_eq!(value["title"], "Sleep well");
    }

    #[test]
    fn test_parse_tool_use_response() {
        let response = json!({
            "content": [
                {"type": "text", "text": "Searching first."},
                {
                    "type": "tool_use",
                    "id": "toolu_9",
                    "name": "tavily_multi_search",
                    "input": {"queries": ["a", "b"]}
                }
            ]
        });
        let msg = AnthropicModel::parse_anthropic_response(&response, None).unwrap();
        assert_eq!(msg.content(), "Searching first.");
        assert_eq!(msg.tool_calls()[0].id, "toolu_9");
        assert_eq!(msg.tool_calls()[0].args["queries"][1], "b");
    }
}
