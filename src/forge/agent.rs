// SPDX-License-Identifier: MIT

//! Blog agent - the compiled workflow plus its caller-facing entry points

use crate::adk::model::{create_model, Model};
use crate::forge::error::{BlogForgeError, WorkflowError};
use crate::forge::schema::Blog;
use crate::forge::session::Session;
use crate::forge::tools::search::{MultiSearchTool, SearchProvider, TavilyClient};
use crate::forge::workflow::graph::{BlogGraph, NodeId, RunOutcome, WorkflowEvent};
use crate::forge::workflow::nodes::BlogNodes;
use crate::forge::workflow::state::WorkflowState;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Generates blogs; built once per process and shared across requests
pub struct BlogAgent {
    graph: BlogGraph,
    session: Arc<Session>,
}

impl BlogAgent {
    /// Build the agent from explicit model and search capabilities
    pub fn new(
        model: Arc<dyn Model>,
        search: Arc<dyn SearchProvider>,
        session: Arc<Session>,
    ) -> Self {
        let search_tool = Arc::new(MultiSearchTool::new(
            search,
            session.settings().search_max_results,
        ));
        let nodes = BlogNodes::new(model, search_tool, session.clone());

        Self {
            graph: BlogGraph::new(nodes),
            session,
        }
    }

    /// Build the agent for the configured provider and Tavily search
    pub fn from_session(session: Arc<Session>) -> Result<Self, BlogForgeError> {
        let model = create_model(&session.settings().model_spec())?;
        Ok(Self::new(model, Arc::new(TavilyClient::new()), session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn graph(&self) -> &BlogGraph {
        &self.graph
    }

    /// Run the whole workflow, returning the final state and visited nodes
    pub async fn run(&self, topic: &str, language: &str) -> Result<RunOutcome, WorkflowError> {
        log::info!("Generating blog for topic '{}' in '{}'", topic, language);
        self.graph.invoke(WorkflowState::new(topic, language)).await
    }

    /// Run the workflow, streaming progress events to `tx`
    pub async fn run_stream(
        &self,
        topic: &str,
        language: &str,
        tx: mpsc::Sender<WorkflowEvent>,
    ) -> Result<RunOutcome, WorkflowError> {
        self.graph
            .invoke_with_events(WorkflowState::new(topic, language), &tx)
            .await
    }

    /// Generate a blog in the requested language
    pub async fn generate(&self, topic: &str, language: &str) -> Result<Blog, WorkflowError> {
        let outcome = self.run(topic, language).await?;
        outcome.state.into_blog().ok_or_else(|| {
            WorkflowError::precondition(NodeId::Validate, "Workflow finished without a blog")
        })
    }
}
