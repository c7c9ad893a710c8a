// SPDX-License-Identifier: MIT

//! Blog generation workflow
//!
//! `graph` holds the topology and executor, `nodes` the node functions and
//! routing decisions, `state` the per-request state.

pub mod graph;
pub mod nodes;
mod prompts;
pub mod state;

pub use graph::{BlogGraph, NodeId, RunOutcome, Transition, WorkflowEvent};
pub use nodes::BlogNodes;
pub use state::{StateUpdate, WorkflowState};
