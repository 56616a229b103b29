//! HTTP surface: health probe and the streaming chat endpoint.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::agent_loop::{LoopRunner, RunRequest};
use crate::error::Result;
use crate::types::ChatMessage;
use crate::wire;

/// Header carrying the caller identity resolved by the authentication layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub runner: LoopRunner,
}

impl AppState {
    pub fn new(runner: LoopRunner) -> Self {
        Self { runner }
    }
}

/// Body of `POST /chat/stream`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStreamBody {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub locale_hint: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat/stream", post(chat_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the listener fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

fn caller_identity(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

async fn chat_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ChatStreamBody>,
) -> Response {
    let request = RunRequest {
        messages: body.messages,
        locale_hint: body.locale_hint,
        caller: caller_identity(&headers),
    };
    let handle = state.runner.start(request);

    let frames = handle.into_stream().filter_map(|event| async move {
        match wire::encode_event(&event) {
            Ok(frame) => Some(Ok::<_, Infallible>(frame)),
            Err(err) => {
                warn!(error = %err, kind = event.kind(), "dropping unencodable event");
                None
            }
        }
    });
    sse_response(frames)
}

fn sse_response<S>(frames: S) -> Response
where
    S: Stream<Item = std::result::Result<Vec<u8>, Infallible>> + Send + 'static,
{
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(wire::CONTENT_TYPE));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    (headers, Body::from_stream(frames)).into_response()
}
