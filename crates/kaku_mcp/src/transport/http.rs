//! Streamable HTTP transport
//!
//! Clients POST JSON-RPC messages to `/mcp` and get a JSON body back.
//! `initialize` opens a session announced in `Mcp-Session-Id`; the server
//! never opens an SSE stream, so `GET /mcp` is refused. Sessions idle for
//! longer than the configured window are forgotten.

use crate::{JsonRpcRequest, JsonRpcResponse, McpServer, SERVER_NAME};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use kaku_common::Result;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Session header (lower-case, as stored by `http`)
pub const SESSION_HEADER: &str = "mcp-session-id";

#[derive(Clone)]
struct AppState {
    server: Arc<McpServer>,
    /// Session id -> last time it was used
    sessions: Arc<Mutex<HashMap<String, Instant>>>,
    session_idle: Duration,
}

impl AppState {
    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, last_seen: Instant, now: Instant) -> bool {
        now.duration_since(last_seen) >= self.session_idle
    }

    fn open_session(&self) -> String {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let now = Instant::now();
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, last_seen| !self.is_expired(*last_seen, now));
        if sessions.len() < before {
            tracing::debug!(expired = before - sessions.len(), "Pruned idle sessions");
        }
        sessions.insert(id.clone(), now);
        drop(sessions);

        tracing::info!(session = %id, "Session opened");
        id
    }

    /// Refresh a live session; expired ones are removed
    fn touch_session(&self, id: &str) -> bool {
        let now = Instant::now();
        let mut sessions = self.sessions();
        let expired = match sessions.get(id) {
            Some(last_seen) => self.is_expired(*last_seen, now),
            None => return false,
        };

        if expired {
            sessions.remove(id);
            tracing::info!(session = %id, "Session expired");
            false
        } else {
            sessions.insert(id.to_string(), now);
            true
        }
    }
}

/// Router serving `/mcp` and `/health`
pub fn router(server: Arc<McpServer>, session_idle: Duration) -> Router {
    let state = AppState {
        server,
        sessions: Arc::new(Mutex::new(HashMap::new())),
        session_idle,
    };

    Router::new()
        .route("/mcp", get(get_mcp).post(post_mcp).delete(delete_mcp))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(server: Arc<McpServer>, addr: &str, session_idle: Duration) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(
        "Starting Kakuyomu MCP server with streamable-http transport on http://{}/mcp",
        local
    );

    axum::serve(listener, router(server, session_idle))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Kakuyomu MCP server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVER_NAME
    }))
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn post_mcp(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(id) = session_id(&headers) {
        if !state.touch_session(&id) {
            return (StatusCode::NOT_FOUND, "Unknown session").into_response();
        }
    }

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Failed to parse request: {}", e);
            return (StatusCode::BAD_REQUEST, Json(JsonRpcResponse::parse_error(&e))).into_response();
        }
    };

    let is_initialize = request.method == "initialize";

    match state.server.handle_request(request).await {
        None => StatusCode::ACCEPTED.into_response(),
        Some(resp) => {
            let new_session = (is_initialize && resp.error.is_none()).then(|| state.open_session());

            let mut response = Json(resp).into_response();
            if let Some(id) = new_session {
                if let Ok(value) = HeaderValue::from_str(&id) {
                    response.headers_mut().insert(SESSION_HEADER, value);
                }
            }
            response
        }
    }
}

async fn get_mcp() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST, DELETE")],
        "Server-initiated streams are not supported",
    )
        .into_response()
}

async fn delete_mcp(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return (StatusCode::BAD_REQUEST, "Missing Mcp-Session-Id").into_response();
    };

    if state.sessions().remove(&id).is_some() {
        tracing::info!(session = %id, "Session closed");
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, "Unknown session").into_response()
    }
}
