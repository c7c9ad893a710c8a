//! Integration tests for the blog workflow
//!
//! These tests drive the whole graph end-to-end with a scripted model and a
//! recording search provider; no network access is involved.

use async_trait::async_trait;
use blogforge_rs::adk::error::{ModelError, ToolError};
use blogforge_rs::adk::message::{Message, ToolCall};
use blogforge_rs::adk::model::{GenerationConfig, Model};
use blogforge_rs::adk::tool::Tool;
use blogforge_rs::forge::agent::BlogAgent;
use blogforge_rs::forge::config::Settings;
use blogforge_rs::forge::error::{ErrorKind, WorkflowError};
use blogforge_rs::forge::session::Session;
use blogforge_rs::forge::tools::search::SearchProvider;
use blogforge_rs::forge::workflow::{NodeId, WorkflowEvent};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Components
// ============================================================================

/// What the model saw on one call
#[derive(Debug, Clone)]
struct CallRecord {
    history: Vec<Message>,
    response_format: Option<String>,
    tool_names: Vec<String>,
}

/// Mock model that returns predefined responses
struct MockModel {
    responses: Vec<Message>,
    response_index: AtomicUsize,
    calls: Mutex<Vec<CallRecord>>,
}

impl MockModel {
    fn new(responses: Vec<Message>) -> Arc<Self> {
        Arc::new(Self {
            responses,
            response_index: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn blog_response(title: &str, content: &str) -> Message {
        Message::ai(json!({ "title": title, "content": content }).to_string())
    }

    fn tool_call_response(queries: &[&str]) -> Message {
        Message::ai_with_tool_calls(
            "",
            vec![ToolCall::new(
                "call_1",
                "tavily_multi_search",
                json!({ "queries": queries }),
            )],
        )
    }

    fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Model for MockModel {
    async fn generate_content(
        &self,
        history: &[Message],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Message, ModelError> {
        self.calls.lock().unwrap().push(CallRecord {
            history: history.to_vec(),
            response_format: config
                .and_then(|c| c.response_format.as_ref())
                .map(|f| f.name.clone()),
            tool_names: tools
                .map(|t| t.iter().map(|tool| tool.name().to_string()).collect())
                .unwrap_or_default(),
        });

        let idx = self.response_index.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(idx)
            .cloned()
            .ok_or_else(|| ModelError::InvalidResponse("Max responses reached".into()))
    }
}

/// Search provider recording the queries it receives
#[derive(Default)]
struct MockSearch {
    queries: Mutex<Vec<String>>,
    missing_key: bool,
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Value, ToolError> {
        if self.missing_key {
            return Err(ToolError::MissingCredential("TAVILY_API_KEY".into()));
        }
        self.queries.lock().unwrap().push(query.to_string());
        let results: Vec<Value> = (0..max_results)
            .map(|i| json!({ "title": format!("{} #{}", query, i), "url": "https://example.com" }))
            .collect();
        Ok(json!(results))
    }
}

fn session() -> Arc<Session> {
    let settings = Settings::from_lookup(|key| match key {
        "MODEL_NAME" => Some("mock-model".to_string()),
        "MODEL_PROVIDER" => Some("openai".to_string()),
        "AI_API_KEY" => Some("sk-test".to_string()),
        _ => None,
    })
    .unwrap();
    Arc::new(Session::new(settings))
}

fn agent(model: Arc<MockModel>, search: Arc<MockSearch>) -> BlogAgent {
    BlogAgent::new(model, search, session())
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_direct_generation_in_default_language() {
    let model = MockModel::new(vec![
        Message::ai(r#"{"title": "Benefits of sleep", "content": "Sleep restores the body."}"#),
        MockModel::blog_response("Benefits of sleep", "Sleep restores the body and mind."),
    ]);
    let search = Arc::new(MockSearch::default());
    let agent = agent(model.clone(), search.clone());

    let outcome = agent.run("benefits of sleep", "en").await.unwrap();

    assert_eq!(
        outcome.path,
        vec![NodeId::Plan, NodeId::Write, NodeId::Validate]
    );
    assert!(!outcome.visited(NodeId::Search));
    assert!(!outcome.visited(NodeId::Translate));

    let blog = outcome.state.blog().unwrap();
    assert!(blog.title.chars().count() >= 5);
    assert!(!blog.content.is_empty());
    assert!(outcome.state.search_results().is_none());
    assert_eq!(outcome.state.messages().len(), 1);

    assert_eq!(model.calls().len(), 2);
    assert!(search.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_then_translate() {
    let model = MockModel::new(vec![
        MockModel::tool_call_response(&["Q3 2025 interest rates", "central bank decisions 2025"]),
        MockModel::blog_response("Interest rate news for Q3 2025", "Rates held steady."),
        MockModel::blog_response(
            "Actualités des taux d'intérêt du T3 2025",
            "Les taux sont restés stables.",
        ),
    ]);
    let search = Arc::new(MockSearch::default());
    let agent = agent(model.clone(), search.clone());

    let outcome = agent.run("Q3 2025 interest rate news", "fr").await.unwrap();

    assert_eq!(
        outcome.path,
        vec![
            NodeId::Plan,
            NodeId::Search,
            NodeId::Write,
            NodeId::Validate,
            NodeId::Translate
        ]
    );

    // Search received exactly the requested queries, in order
    assert_eq!(
        *search.queries.lock().unwrap(),
        vec!["Q3 2025 interest rates", "central bank decisions 2025"]
    );
    let hits = outcome.state.search_results().unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].query, "Q3 2025 interest rates");
    assert_eq!(hits[0].results.as_array().unwrap().len(), 2);

    // Planner response + tool result
    let messages = outcome.state.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].has_tool_calls());
    assert!(matches!(messages[1], Message::Tool { .. }));

    let calls = model.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].tool_names, vec!["tavily_multi_search"]);
    assert_eq!(calls[0].response_format, None);
    assert_eq!(calls[1].response_format.as_deref(), Some("Blog"));
    assert!(calls[1].history[0]
        .content()
        .contains("Q3 2025 interest rates #0"));
    assert_eq!(calls[2].response_format.as_deref(), Some("Blog"));
    assert!(calls[2].history[1]
        .content()
        .contains("Interest rate news for Q3 2025"));

    let blog = outcome.state.blog().unwrap();
    assert_eq!(blog.title, "Actualités des taux d'intérêt du T3 2025");
    assert_ne!(blog.content, "Rates held steady.");
}

#[tokio::test]
async fn test_empty_topic_aborts_before_any_model_call() {
    let model = MockModel::new(vec![]);
    let agent = agent(model.clone(), Arc::new(MockSearch::default()));

    let err = agent.generate("", "en").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(err.node(), Some(NodeId::Plan));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_language_aborts_at_translate_routing() {
    let model = MockModel::new(vec![
        Message::ai(r#"{"title": "A valid title", "content": "Body"}"#),
        MockModel::blog_response("A valid title", "Body"),
        MockModel::blog_response("Never reached", "Body"),
    ]);
    let agent = agent(model.clone(), Arc::new(MockSearch::default()));

    let err = agent.run("valid", "xx").await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Precondition {
            node: NodeId::Validate,
            ..
        }
    ));
    // Plan and write only; no translation call was made
    assert_eq!(model.calls().len(), 2);
}

// ============================================================================
// Failure propagation
// ============================================================================

#[tokio::test]
async fn test_missing_search_credential_is_configuration_error() {
    let model = MockModel::new(vec![MockModel::tool_call_response(&["anything"])]);
    let search = Arc::new(MockSearch {
        missing_key: true,
        ..Default::default()
    });
    let agent = agent(model.clone(), search);

    let err = agent.generate("latest news", "en").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.node(), Some(NodeId::Search));
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn test_malformed_search_request_is_validation_error() {
    let model = MockModel::new(vec![Message::ai_with_tool_calls(
        "",
        vec![ToolCall::new(
            "call_1",
            "tavily_multi_search",
            json!({ "queries": [] }),
        )],
    )]);
    let search = Arc::new(MockSearch::default());
    let agent = agent(model, search.clone());

    let err = agent.generate("latest news", "en").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.node(), Some(NodeId::Search));
    assert!(search.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_blog_from_writer_is_not_retried() {
    let model = MockModel::new(vec![
        Message::ai("Sleep is good."),
        MockModel::blog_response("Zzz", "too short a title"),
        MockModel::blog_response("A valid title", "would succeed on retry"),
    ]);
    let agent = agent(model.clone(), Arc::new(MockSearch::default()));

    let err = agent.generate("sleep", "en").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.node(), Some(NodeId::Write));
    assert_eq!(model.calls().len(), 2);
}

#[tokio::test]
async fn test_translation_failure_is_reported_as_translation() {
    let model = MockModel::new(vec![
        Message::ai(r#"{"title": "Benefits of sleep"}"#),
        MockModel::blog_response("Benefits of sleep", "Body"),
        Message::ai("Je ne peux pas traduire."),
    ]);
    let agent = agent(model, Arc::new(MockSearch::default()));

    let err = agent.generate("sleep", "hi").await.unwrap_err();

    assert!(matches!(err, WorkflowError::Translation { .. }));
    assert_eq!(err.node(), Some(NodeId::Translate));
}

// ============================================================================
// Streaming and concurrency
// ============================================================================

#[tokio::test]
async fn test_stream_emits_node_events_in_order() {
    let model = MockModel::new(vec![
        Message::ai(r#"{"title": "Benefits of sleep", "content": "Body"}"#),
        MockModel::blog_response("Benefits of sleep", "Body"),
        MockModel::blog_response("睡眠の効果について", "本文"),
    ]);
    let agent = agent(model, Arc::new(MockSearch::default()));

    let (tx, mut rx) = tokio::sync::mpsc::channel(64);
    let outcome = agent.run_stream("sleep", "ja", tx).await.unwrap();

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    let started: Vec<NodeId> = events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::NodeStarted { node } => Some(*node),
            _ => None,
        })
        .collect();
    assert_eq!(started, outcome.path);

    match events.last() {
        Some(WorkflowEvent::Completed { blog: Some(blog) }) => {
            assert_eq!(blog.title, "睡眠の効果について")
        }
        other => panic!("Expected completion event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_reports_failure() {
    let model = MockModel::new(vec![]);
    let agent = agent(model, Arc::new(MockSearch::default()));

    let (tx, mut rx) = tokio::sync::mpsc::channel(64);
    assert!(agent.run_stream("topic", "en", tx).await.is_err());

    let mut last = None;
    while let Some(event) = rx.recv().await {
        last = Some(event);
    }
    match last {
        Some(WorkflowEvent::Failed { node, kind, .. }) => {
            assert_eq!(node, Some(NodeId::Plan));
            assert_eq!(kind, ErrorKind::Upstream);
        }
        other => panic!("Expected failure event, got {:?}", other),
    }
}

/// Model whose reply depends only on the request, safe to share across runs
struct EchoTopicModel;

#[async_trait]
impl Model for EchoTopicModel {
    async fn generate_content(
        &self,
        history: &[Message],
        _config: Option<&GenerationConfig>,
        _tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Message, ModelError> {
        let prompt = history[0].content();
        let topic = prompt
            .lines()
            .next()
            .and_then(|l| l.rsplit(": ").next())
            .unwrap_or("unknown")
            .trim_end_matches('.')
            .to_string();
        if prompt.starts_with("You are an expert in generating") {
            return Ok(Message::ai(
                json!({ "title": format!("About {}", topic), "content": "x" }).to_string(),
            ));
        }
        // Writer: pass the planner JSON straight through
        let source = prompt
            .rsplit_once("following content:\n")
            .map(|(_, source)| source)
            .unwrap_or(prompt);
        Ok(Message::ai(source.to_string()))
    }
}

#[tokio::test]
async fn test_concurrent_requests_share_one_agent() {
    let agent = Arc::new(BlogAgent::new(
        Arc::new(EchoTopicModel),
        Arc::new(MockSearch::default()),
        session(),
    ));

    let handles: Vec<_> = ["alpha", "bravo", "charlie", "delta"]
        .into_iter()
        .map(|topic| {
            let agent = agent.clone();
            tokio::spawn(async move { agent.generate(topic, "en").await })
        })
        .collect();

    for (handle, topic) in handles.into_iter().zip(["alpha", "bravo", "charlie", "delta"]) {
        let blog = handle.await.unwrap().unwrap();
        assert_eq!(blog.title, format!("About {}", topic));
    }
}
