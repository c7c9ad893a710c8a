// SPDX-License-Identifier: MIT

//! Batch web search tool backed by the Tavily API

use crate::adk::error::ToolError;
use crate::adk::structured::{schema_of, StructuredOutput};
use crate::adk::tool::Tool;
use crate::forge::schema::SearchRequest;
use async_trait::async_trait;
use futures::future::try_join_all;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;

/// Name the model uses to request a search
pub const TOOL_NAME: &str = "tavily_multi_search";

pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";

// --- Static schema ---

static MULTI_SEARCH_SCHEMA: Lazy<Value> = Lazy::new(schema_of::<SearchRequest>);

/// Single-query web search capability
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Ranked results for one query, at most `max_results` of them
    async fn search(&self, query: &str, max_results: usize) -> Result<Value, ToolError>;
}

/// Results gathered for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub query: String,
    pub results: Value,
}

/// Tavily search API client
pub struct TavilyClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl Default for TavilyClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TavilyClient {
    /// Client reading `TAVILY_API_KEY` from the environment when searching
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
        }
    }

    /// Use an explicit key instead of the environment
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve the credential; a missing key is only an error once a search runs
    fn api_key(&self) -> Result<String, ToolError> {
        self.api_key
            .clone()
            .or_else(|| env::var(TAVILY_API_KEY).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ToolError::MissingCredential(TAVILY_API_KEY.to_string()))
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Value, ToolError> {
        let api_key = self.api_key()?;

        let resp = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "query": query,
                "max_results": max_results
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await?;
            return Err(ToolError::Api {
                provider: "tavily".to_string(),
                status,
                message,
            });
        }

        let body: Value = resp.json().await?;
        body.get("results").cloned().ok_or_else(|| ToolError::Api {
            provider: "tavily".to_string(),
            status: 200,
            message: "Invalid response format: missing results".to_string(),
        })
    }
}

/// Runs one search per requested query and aggregates the results
pub struct MultiSearchTool {
    provider: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl MultiSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results,
        }
    }

    /// Search every query; output order matches `request.queries`
    pub async fn search_all(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, ToolError> {
        let searches = request.queries.iter().map(|query| async move {
            log::info!("Performing search for: {}", query);
            let results = self.provider.search(query, self.max_results).await?;
            Ok::<_, ToolError>(SearchHit {
                query: query.clone(),
                results,
            })
        });

        try_join_all(searches).await
    }
}

#[async_trait]
impl Tool for MultiSearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Performs a batch web search. Takes several natural-language queries and returns the top results for each."
    }

    fn schema(&self) -> &Value {
        &MULTI_SEARCH_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let request: SearchRequest = serde_json::from_value(input)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        request.validate().map_err(ToolError::InvalidArguments)?;

        log::info!("{} called with {} queries", TOOL_NAME, request.queries.len());

        let hits = self.search_all(&request).await?;
        Ok(json!({ "search_results": hits }))
    }
}
