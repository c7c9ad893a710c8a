// SPDX-License-Identifier: MIT

//! Per-request workflow state and the partial updates nodes return

use crate::adk::message::Message;
use crate::forge::schema::Blog;
use crate::forge::tools::search::SearchHit;
use serde::Serialize;

/// State threaded through every node of one generation request
///
/// `topic` and `language` are fixed at creation. `messages` only grows;
/// nodes never touch the state directly but return a [`StateUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowState {
    topic: String,
    language: String,
    blog: Option<Blog>,
    messages: Vec<Message>,
    search_results: Option<Vec<SearchHit>>,
}

impl WorkflowState {
    pub fn new(topic: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            language: language.into(),
            blog: None,
            messages: Vec::new(),
            search_results: None,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn blog(&self) -> Option<&Blog> {
        self.blog.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn search_results(&self) -> Option<&[SearchHit]> {
        self.search_results.as_deref()
    }

    /// Consume the state, yielding the finished blog
    pub fn into_blog(self) -> Option<Blog> {
        self.blog
    }

    /// Merge a node's update: messages are appended, other fields replaced when set
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if let Some(blog) = update.blog {
            self.blog = Some(blog);
        }
        if let Some(results) = update.search_results {
            self.search_results = Some(results);
        }
    }
}

/// Partial state produced by a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub blog: Option<Blog>,
    pub messages: Vec<Message>,
    pub search_results: Option<Vec<SearchHit>>,
}

impl StateUpdate {
    /// Leaves the state unchanged
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_blog(mut self, blog: Blog) -> Self {
        self.blog = Some(blog);
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_search_results(mut self, results: Vec<SearchHit>) -> Self {
        self.search_results = Some(results);
        self
    }
}
