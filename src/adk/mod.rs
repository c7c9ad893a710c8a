// SPDX-License-Identifier: MIT

//! Agent development kit: messages, tools, models and structured output

pub mod error;
pub mod message;
pub mod model;
pub mod retry;
pub mod structured;
pub mod tool;
