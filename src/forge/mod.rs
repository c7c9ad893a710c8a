// SPDX-License-Identifier: MIT

//! Blog generation application built on the agent kit

pub mod agent;
pub mod config;
pub mod error;
pub mod schema;
pub mod server;
pub mod session;
pub mod tools;
pub mod workflow;
