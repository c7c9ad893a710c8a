// SPDX-License-Identifier: MIT

//! OpenAI Model - chat completions API implementation
//!
//! Also serves Groq, Ollama, OpenRouter and other gateways speaking the same
//! wire format.

use super::{error_from_response, GenerationConfig, Model};
use crate::adk::error::ModelError;
use crate::adk::message::{Message, ToolCall};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;

/// OpenAI chat completions model implementation
pub struct OpenAIModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
    temperature: Option<f32>,
}

impl OpenAIModel {
    /// Create a new OpenAIModel against `base_url` (e.g. `https://api.openai.com/v1`)
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
        self.temperature = Some(temperature);
        self
    }

    /// Convert a Message to OpenAI message format
    fn message_to_openai(message: &Message) -> Value {
        match message {
            Message::System { content } => json!({ "role": "system", "content": content }),
            Message::Human { content } => json!({ "role": "user", "content": content }),
            Message::Ai {
                content,
                tool_calls,
            } => {
                if tool_calls.is_empty() {
                    return json!({ "role": "assistant", "content": content });
                }
                let calls: Vec<Value> = tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.args.to_string()
                            }
                        })
                    })
                    .collect();
                json!({
                    "role": "assistant",
                    "content": if content.is_empty() { Value::Null } else { json!(content) },
                    "tool_calls": calls
                })
            }
            Message::Tool {
                tool_call_id,
                content,
                ..
            } => json!({
                "role": "tool",
                "tool_call_id": tool_call_id,
                "content": content
            }),
        }
    }

    /// Convert tools to OpenAI function format
    fn tools_to_openai_format(tools: &[Arc<dyn Tool>]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.schema()
                    }
                })
            })
            .collect()
    }

    /// Build the request body for a chat completion
    fn build_body(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Value {
        let messages: Vec<Value> = history.iter().map(Self::message_to_openai).collect();

        let mut body = json!({
            "model": self.model_name,
            "messages": messages
        });

        if let Some(temp) = config.and_then(|c| c.temperature).or(self.temperature) {
            body["temperature"] = json!(temp);
        }

        if let Some(cfg) = config {
            if let Some(max_tokens) = cfg.max_output_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
            if let Some(top_p) = cfg.top_p {
                body["top_p"] = json!(top_p);
            }
            if let Some(format) = &cfg.response_format {
                body["response_format"] = json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": format.name,
                        "schema": format.schema
                    }
                });
            }
        }

        if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = json!(Self::tools_to_openai_format(tools));
                body["tool_choice"] = json!("auto");
            }
        }

        body
    }

    /// Parse OpenAI response into an AI message
    fn parse_openai_response(response: &Value) -> Result<Message, ModelError> {
        let choice = response["choices"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| ModelError::InvalidResponse("No choices in OpenAI response".into()))?;

        let message = &choice["message"];
        let content = message["content"].as_str().unwrap_or_default().to_string();

        let mut tool_calls = Vec::new();
        if let Some(calls) = message["tool_calls"].as_array() {
            for (i, tc) in calls.iter().enumerate() {
                let name = tc["function"]["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let id = tc["id"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("call_{}", i));
                let args_str = tc["function"]["arguments"].as_str().unwrap_or("{}");
                let args: Value = serde_json::from_str(args_str).map_err(|e| {
                    ModelError::InvalidResponse(format!(
                        "Tool call '{}' has malformed arguments: {}",
                        name, e
                    ))
                })?;

                tool_calls.push(ToolCall::new(id, name, args));
            }
        }

        Ok(Message::ai_with_tool_calls(content, tool_calls))
    }
}

#[async_trait]
impl Model for OpenAIModel {
    async fn generate_content(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Message, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(history, config, tools);

        log::debug!(
            "OpenAI request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response("openai", resp).await);
        }

        let resp_json: Value = resp.json().await?;
        log::debug!("OpenAI response: {}", resp_json);

        Self::parse_openai_response(&resp_json)
    }
}
