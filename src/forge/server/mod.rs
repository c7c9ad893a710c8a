// SPDX-License-Identifier: MIT

//! HTTP surface: one generation operation plus streaming and metadata routes

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::forge::agent::BlogAgent;
use crate::forge::error::{BlogForgeError, ErrorKind, WorkflowError};
use crate::forge::schema::Blog;
use crate::forge::session::DEFAULT_LANGUAGE;

#[derive(Clone)]
struct AppState {
    agent: Arc<BlogAgent>,
}

/// Build the application router around a shared agent
pub fn router(agent: Arc<BlogAgent>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/languages", get(list_languages))
        .route("/api/blogs", post(create_blog))
        .route("/api/blogs/stream", post(stream_blog))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { agent })
}

pub async fn serve(agent: Arc<BlogAgent>, addr: SocketAddr) -> Result<(), BlogForgeError> {
    let app = router(agent);

    log::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    topic: String,
    #[serde(default = "default_language")]
    language: String,
}

/// A failed run rendered as a JSON error response
struct ApiError(WorkflowError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Precondition => StatusCode::BAD_REQUEST,
            ErrorKind::Validation | ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        });
        (self.status(), Json(body)).into_response()
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_languages(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.agent.session().supported_languages()))
}

async fn create_blog(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<Blog>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    log::info!(
        "[{}] Blog requested: topic='{}' language='{}'",
        request_id,
        payload.topic,
        payload.language
    );

    match state
        .agent
        .generate(&payload.topic, &payload.language)
        .await
    {
        Ok(blog) => {
            log::info!("[{}] Blog generated: {}", request_id, blog.title);
            Ok(Json(blog))
        }
        Err(e) => {
            log::error!("[{}] Blog generation failed: {}", request_id, e);
            Err(ApiError(e))
        }
    }
}

async fn stream_blog(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(32);
    let agent = state.agent.clone();

    tokio::spawn(async move {
        log::info!(
            "Starting streaming generation for topic: {}",
            payload.topic
        );
        if let Err(e) = agent
            .run_stream(&payload.topic, &payload.language, tx)
            .await
        {
            log::error!("Streaming generation failed: {}", e);
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| {
        Ok(Event::default()
            .json_data(&event)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(1)))
}
