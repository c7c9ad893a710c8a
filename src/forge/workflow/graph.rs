// SPDX-License-Identifier: MIT

//! Blog workflow graph
//!
//! A fixed state machine over five nodes:
//!
//! ```text
//! blog_agent ──tools──► search ──► blog_writer ──► validate ──► translate_blog ──► END
//!      │                               ▲               │
//!      └────────────no tools───────────┘               └──────default language──► END
//! ```
//!
//! Each node is an async function `(state) -> StateUpdate`; each node has
//! either a fixed successor or a routing function.

use crate::forge::error::{ErrorKind, WorkflowError};
use crate::forge::schema::Blog;
use crate::forge::workflow::nodes::BlogNodes;
use crate::forge::workflow::state::{StateUpdate, WorkflowState};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Upper bound on node executions per run
pub const MAX_STEPS: usize = 16;

/// Node identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    /// Decide between direct generation and search
    #[serde(rename = "blog_agent")]
    Plan,
    #[serde(rename = "search")]
    Search,
    #[serde(rename = "blog_writer")]
    Write,
    #[serde(rename = "validate")]
    Validate,
    #[serde(rename = "translate_blog")]
    Translate,
}

impl NodeId {
    pub const START: NodeId = NodeId::Plan;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "blog_agent",
            Self::Search => "search",
            Self::Write => "blog_writer",
            Self::Validate => "validate",
            Self::Translate => "translate_blog",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where execution goes after a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    To(NodeId),
    End,
}

/// Routing functions used at branch points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Router {
    /// Search if the planner requested a tool call, otherwise write
    Tools,
    /// Translate unless the requested language is the default one
    Translation,
}

/// Outgoing edge of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Fixed(Transition),
    Conditional(Router),
}

/// The static topology
pub fn edge(node: NodeId) -> Edge {
    match node {
        NodeId::Plan => Edge::Conditional(Router::Tools),
        NodeId::Search => Edge::Fixed(Transition::To(NodeId::Write)),
        NodeId::Write => Edge::Fixed(Transition::To(NodeId::Validate)),
        NodeId::Validate => Edge::Conditional(Router::Translation),
        NodeId::Translate => Edge::Fixed(Transition::End),
    }
}

/// Progress notifications for streaming callers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    NodeStarted {
        node: NodeId,
    },
    NodeFinished {
        node: NodeId,
    },
    Completed {
        blog: Option<Blog>,
    },
    Failed {
        node: Option<NodeId>,
        kind: ErrorKind,
        message: String,
    },
}

/// Final state of a run plus the nodes visited, in order
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub state: WorkflowState,
    pub path: Vec<NodeId>,
}

impl RunOutcome {
    pub fn visited(&self, node: NodeId) -> bool {
        self.path.contains(&node)
    }
}

/// Compiled blog workflow; built once and shared by every request
pub struct BlogGraph {
    nodes: BlogNodes,
    max_steps: usize,
}

impl BlogGraph {
    pub fn new(nodes: BlogNodes) -> Self {
        Self {
            nodes,
            max_steps: MAX_STEPS,
        }
    }

    pub fn nodes(&self) -> &BlogNodes {
        &self.nodes
    }

    async fn run_node(
        &self,
        node: NodeId,
        state: &WorkflowState,
    ) -> Result<StateUpdate, WorkflowError> {
        match node {
            NodeId::Plan => self.nodes.blog_agent(state).await,
            NodeId::Search => self.nodes.tavily_multi_search(state).await,
            NodeId::Write => self.nodes.blog_writer(state).await,
            NodeId::Validate => self.nodes.validate_blog(state),
            NodeId::Translate => self.nodes.translate(state).await,
        }
    }

    fn route(&self, router: Router, state: &WorkflowState) -> Result<Transition, WorkflowError> {
        match router {
            Router::Tools => self.nodes.tools_condition(state),
            Router::Translation => self.nodes.translate_condition(state),
        }
    }

    /// Run the workflow to completion
    pub async fn invoke(&self, state: WorkflowState) -> Result<RunOutcome, WorkflowError> {
        self.execute(state, None).await
    }

    /// Run the workflow, reporting progress on `tx`
    pub async fn invoke_with_events(
        &self,
        state: WorkflowState,
        tx: &mpsc::Sender<WorkflowEvent>,
    ) -> Result<RunOutcome, WorkflowError> {
        let result = self.execute(state, Some(tx)).await;
        if let Err(e) = &result {
            emit(
                Some(tx),
                WorkflowEvent::Failed {
                    node: e.node(),
                    kind: e.kind(),
                    message: e.to_string(),
                },
            )
            .await;
        }
        result
    }

    async fn execute(
        &self,
        mut state: WorkflowState,
        events: Option<&mpsc::Sender<WorkflowEvent>>,
    ) -> Result<RunOutcome, WorkflowError> {
        let mut path = Vec::new();
        let mut next = Transition::To(NodeId::START);

        while let Transition::To(node) = next {
            if path.len() >= self.max_steps {
                log::error!("Graph execution exceeded {} steps", self.max_steps);
                return Err(WorkflowError::StepLimit(self.max_steps));
            }

            emit(events, WorkflowEvent::NodeStarted { node }).await;
            log::info!("Executing node: {}", node);

            let update = self.run_node(node, &state).await.map_err(|e| {
                log::error!("Node {} failed: {}", node, e);
                e
            })?;
            state.apply(update);
            path.push(node);

            emit(events, WorkflowEvent::NodeFinished { node }).await;

            next = match edge(node) {
                Edge::Fixed(transition) => transition,
                Edge::Conditional(router) => self.route(router, &state)?,
            };
            log::debug!("{} -> {:?}", node, next);
        }

        log::info!(
            "Workflow finished after {} nodes: {:?}",
            path.len(),
            path
        );
        emit(
            events,
            WorkflowEvent::Completed {
                blog: state.blog().cloned(),
            },
        )
        .await;

        Ok(RunOutcome { state, path })
    }
}

async fn emit(events: Option<&mpsc::Sender<WorkflowEvent>>, event: WorkflowEvent) {
    if let Some(tx) = events {
        // Receiver may have gone away; the run still completes
        let _ = tx.send(event).await;
    }
}
