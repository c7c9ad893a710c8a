// SPDX-License-Identifier: MIT

//! Instructions sent to the model by each node

use crate::forge::schema::Blog;
use crate::forge::tools::search::TOOL_NAME;

/// Planner instruction: search or answer directly
pub fn plan(topic: &str, search_schema: &str) -> String {
    format!(
        r#"You are an expert in generating the blog for the given topic: {topic}.

If you cannot generate the blog content with your existing knowledge, you can call the {TOOL_NAME} tool to search the web. Its input must follow this schema:
{search_schema}

Guidelines:
- Make only ONE tool call if needed
- Generate 2-3 queries maximum for the search
- Call {TOOL_NAME} when you need to search for information

If you can generate the blog without tool calls, respond with JSON in the following format:
{{
    "title": "Blog title in markdown",
    "content": "Detailed blog content in markdown"
}}"#
    )
}

/// Writer instruction wrapping the planner output or the search results
pub fn writer(source: &str) -> String {
    format!(
        r#"You are an expert blog writer. The input provided to you can be:
- Web search results in format: {{"search_results": [{{"query": ..., "results": ...}}]}}
- Direct JSON blog response: {{"title": ..., "content": ...}}

Generate a well-structured blog based on the following content:
{source}"#
    )
}

pub const TRANSLATE_SYSTEM: &str = "You are an expert in translating blogs to the user's requested language.
Translate accurately with no preamble or additional commentary.

Use the provided blog content to translate and produce structured output
with the same blog schema in markdown format.";

/// Translation request for one blog
pub fn translate_request(blog: &Blog, language: &str, language_name: &str) -> String {
    format!(
        "Please translate the following blog:

Blog content: {blog}

Target language: {language} ({language_name})"
    )
}
