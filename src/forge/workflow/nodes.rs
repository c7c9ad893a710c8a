// SPDX-License-Identifier: MIT

//! Node functions and routing decisions of the blog workflow

use crate::adk::error::ToolError;
use crate::adk::message::Message;
use crate::adk::model::Model;
use crate::adk::retry::RetryPolicy;
use crate::adk::structured::invoke_structured;
use crate::adk::tool::Tool;
use crate::forge::error::WorkflowError;
use crate::forge::schema::Blog;
use crate::forge::session::{Session, DEFAULT_LANGUAGE};
use crate::forge::tools::search::SearchHit;
use crate::forge::workflow::graph::{NodeId, Transition};
use crate::forge::workflow::prompts;
use crate::forge::workflow::state::{StateUpdate, WorkflowState};
use std::sync::Arc;

/// Implementations of every workflow node
pub struct BlogNodes {
    model: Arc<dyn Model>,
    search_tool: Arc<dyn Tool>,
    session: Arc<Session>,
    retry: RetryPolicy,
}

impl BlogNodes {
    pub fn new(model: Arc<dyn Model>, search_tool: Arc<dyn Tool>, session: Arc<Session>) -> Self {
        let retry = session.settings().retry_policy();
        Self {
            model,
            search_tool,
            session,
            retry,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Plan: answer directly or request a search through a tool call
    pub async fn blog_agent(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let node = NodeId::Plan;
        let topic = state.topic().trim();
        log::info!("{} called for topic: {}", node, topic);

        if topic.is_empty() {
            log::error!("Invalid topic for the blog");
            return Err(WorkflowError::precondition(node, "Invalid topic for the blog"));
        }

        let history = vec![Message::system(prompts::plan(
            topic,
            &self.search_tool.schema().to_string(),
        ))];
        let tools = vec![self.search_tool.clone()];

        let model = self.model.as_ref();
        let (history, tools) = (history.as_slice(), tools.as_slice());
        let response = self
            .retry
            .run(node.as_str(), move || {
                model.generate_content(history, None, Some(tools))
            })
            .await
            .map_err(|source| {
                log::error!("Unexpected error during content generation: {}", source);
                WorkflowError::Generation { node, source }
            })?;

        log::info!(
            "{} responded with {} tool call(s)",
            node,
            response.tool_calls().len()
        );
        Ok(StateUpdate::none().with_message(response))
    }

    /// Route after planning: search if a tool call is pending, otherwise write
    pub fn tools_condition(&self, state: &WorkflowState) -> Result<Transition, WorkflowError> {
        let last = state.last_message().ok_or_else(|| {
            log::error!("Invalid messages to route after planning");
            WorkflowError::precondition(NodeId::Plan, "Invalid messages")
        })?;

        if last.is_ai() && last.has_tool_calls() {
            Ok(Transition::To(NodeId::Search))
        } else {
            Ok(Transition::To(NodeId::Write))
        }
    }

    /// Search: execute the pending tool calls of the last AI message
    pub async fn tavily_multi_search(
        &self,
        state: &WorkflowState,
    ) -> Result<StateUpdate, WorkflowError> {
        let node = NodeId::Search;
        log::info!("{} called", node);

        let calls = state
            .last_message()
            .map(|m| m.tool_calls())
            .unwrap_or_default();
        if calls.is_empty() {
            return Err(WorkflowError::precondition(
                node,
                "No pending tool call to execute",
            ));
        }

        let mut update = StateUpdate::none();
        let mut hits: Vec<SearchHit> = Vec::new();

        for call in calls {
            if call.name != self.search_tool.name() {
                return Err(WorkflowError::Tool {
                    node,
                    source: ToolError::NotFound(call.name.clone()),
                });
            }

            let output = self
                .search_tool
                .execute(call.args.clone())
                .await
                .map_err(|source| {
                    log::error!("Search failed: {}", source);
                    match source {
                        ToolError::MissingCredential(_) => WorkflowError::Configuration {
                            node,
                            message: source.to_string(),
                        },
                        source => WorkflowError::Tool { node, source },
                    }
                })?;

            let results = output.get("search_results").cloned().ok_or_else(|| {
                log::error!("Search output has no search_results: {}", output);
                WorkflowError::Tool {
                    node,
                    source: ToolError::Api {
                        provider: call.name.clone(),
                        status: 200,
                        message: "Invalid tool output: missing search_results".to_string(),
                    },
                }
            })?;
            let batch = serde_json::from_value::<Vec<SearchHit>>(results).map_err(|e| {
                log::error!("Unexpected search result shape: {}", e);
                WorkflowError::Tool {
                    node,
                    source: ToolError::Json(e),
                }
            })?;
            hits.extend(batch);

            update = update.with_message(Message::tool(&call.id, &call.name, output.to_string()));
        }

        log::info!("{} collected results for {} queries", node, hits.len());
        Ok(update.with_search_results(hits))
    }

    /// Write: turn the last message (search results or direct JSON) into a Blog
    pub async fn blog_writer(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let node = NodeId::Write;
        log::info!("{} called", node);

        let last = state.last_message().ok_or_else(|| {
            log::error!("Messages can't be empty");
            WorkflowError::precondition(node, "Invalid messages to generate a blog")
        })?;

        if last.content().trim().is_empty() {
            log::error!("No valid message from AI to write a blog");
            return Err(WorkflowError::precondition(
                node,
                "Invalid message to write a blog",
            ));
        }

        let history = vec![Message::system(prompts::writer(last.content()))];

        let model = self.model.as_ref();
        let history = history.as_slice();
        let blog = self
            .retry
            .run(node.as_str(), move || {
                invoke_structured::<Blog>(model, history, None)
            })
            .await
            .map_err(|source| {
                log::error!("Failed to generate valid blog: {}", source);
                WorkflowError::Generation { node, source }
            })?;

        log::info!("Generated a valid blog with title: {}", blog.title);
        Ok(StateUpdate::none().with_blog(blog))
    }

    /// Validate: presence check only, no content-quality rules
    pub fn validate_blog(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        log::info!("{} called", NodeId::Validate);

        if state.blog().is_none() {
            log::error!("Invalid blog to perform validation");
            return Err(WorkflowError::precondition(
                NodeId::Validate,
                "Invalid blog for validation",
            ));
        }

        Ok(StateUpdate::none())
    }

    /// Resolve the requested language to its display name
    fn resolve_language<'a>(
        &self,
        node: NodeId,
        language: &'a str,
    ) -> Result<(&'a str, &'static str), WorkflowError> {
        if language.is_empty() {
            return Err(WorkflowError::precondition(
                node,
                "Language must be provided for translation",
            ));
        }
        match self.session.get_language_name(language) {
            Some(name) => Ok((language, name)),
            None => Err(WorkflowError::precondition(
                node,
                format!("Unsupported language '{}'", language),
            )),
        }
    }

    /// Route after validation: end for the default language, otherwise translate
    pub fn translate_condition(&self, state: &WorkflowState) -> Result<Transition, WorkflowError> {
        let (language, language_name) = self
            .resolve_language(NodeId::Validate, state.language())
            .map_err(|e| {
                log::error!("Invalid language: {}", e);
                e
            })?;
        log::info!(
            "Requested language: {}, language_name: {}",
            language,
            language_name
        );

        if language == DEFAULT_LANGUAGE {
            log::info!("Skipping translation because requested language is default ({})", DEFAULT_LANGUAGE);
            Ok(Transition::End)
        } else {
            Ok(Transition::To(NodeId::Translate))
        }
    }

    /// Translate: replace the blog with its translation
    pub async fn translate(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let node = NodeId::Translate;
        log::info!("{} called", node);

        let blog = state.blog().ok_or_else(|| {
            log::error!("Invalid blog to translate");
            WorkflowError::precondition(node, "Invalid blog to translate, check again")
        })?;
        let (language, language_name) = self.resolve_language(node, state.language())?;

        log::info!(
            "Translating a blog in: {}, language_name: {}",
            language,
            language_name
        );

        let history = vec![
            Message::system(prompts::TRANSLATE_SYSTEM),
            Message::human(prompts::translate_request(blog, language, language_name)),
        ];

        let model = self.model.as_ref();
        let history = history.as_slice();
        let translated = self
            .retry
            .run(node.as_str(), move || {
                invoke_structured::<Blog>(model, history, None)
            })
            .await
            .map_err(|source| {
                log::error!("Failed to translate blog: {}", source);
                WorkflowError::Translation { source }
            })?;

        log::info!("Translated blog title: {} ({})", translated.title, language);
        Ok(StateUpdate::none().with_blog(translated))
    }
}
