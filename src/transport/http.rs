//! HTTP transport
//!
//! Exposes the MCP tool surface over plain HTTP for web clients:
//! `POST /mcp/tools/{tool_name}` calls a tool, `GET /mcp/tools/list`
//! enumerates them, and `GET /health` reports liveness.

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use super::{McpMessage, MessageHandler, ToolsCallParams};

/// HTTP transport for web applications and remote access
#[derive(Clone)]
pub struct HttpTransport {
    host: String,
    port: u16,
    request_ids: Arc<AtomicU64>,
}

/// Request body for HTTP tool calls
#[derive(Debug, Deserialize)]
pub struct HttpToolRequest {
    pub arguments: Option<Value>,
}

/// Response wrapper for HTTP operations
#[derive(Debug, Serialize)]
pub struct HttpToolResponse {
    pub success: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
}

#[derive(Clone)]
struct AppState {
    handler: Arc<dyn MessageHandler + Send + Sync>,
    request_ids: Arc<AtomicU64>,
}

impl HttpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            request_ids: Arc::new(AtomicU64::new(1)),
        }
    }

    fn create_router(&self, handler: Arc<dyn MessageHandler + Send + Sync>) -> Router {
        let state = AppState {
            handler,
            request_ids: self.request_ids.clone(),
        };

        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .allow_origin(Any);

        Router::new()
            .route("/mcp/tools/{tool_name}", post(handle_tool_call))
            .route("/mcp/tools/list", get(handle_tools_list))
            .route("/health", get(handle_health_check))
            .layer(cors)
            .with_state(state)
    }
}

#[async_trait]
impl super::Transport for HttpTransport {
    async fn start(&self, handler: Box<dyn MessageHandler + Send + Sync>) -> Result<()> {
        let handler = Arc::from(handler);
        info!("Starting HTTP transport on {}:{}", self.host, self.port);

        let app = self.create_router(handler);
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;

        info!("HTTP server listening on http://{}", addr);
        axum::serve(listener, app).await.context("HTTP server error")?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down HTTP transport");
        Ok(())
    }
}

async fn handle_tool_call(
    State(state): State<AppState>,
    Path(tool_name): Path<String>,
    Json(request): Json<HttpToolRequest>,
) -> impl IntoResponse {
    debug!("HTTP tool call: {}", tool_name);

    let message = McpMessage::ToolsCall {
        id: state.request_ids.fetch_add(1, Ordering::Relaxed),
        params: ToolsCallParams {
            name: tool_name,
            arguments: request.arguments,
        },
    };

    dispatch(&state, message).await
}

async fn handle_tools_list(State(state): State<AppState>) -> impl IntoResponse {
    debug!("HTTP tools list request");
    let message = McpMessage::ToolsList {
        id: state.request_ids.fetch_add(1, Ordering::Relaxed),
    };
    dispatch(&state, message).await
}

async fn handle_health_check() -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "version": crate::VERSION,
    });
    (StatusCode::OK, Json(body))
}

async fn dispatch(state: &AppState, message: McpMessage) -> (StatusCode, Json<HttpToolResponse>) {
    match state.handler.handle_message(message).await {
        Ok(Some(McpMessage::Response { result, error, .. })) => {
            let response = HttpToolResponse {
                success: error.is_none(),
                result,
                error: error.map(|e| e.message),
            };
            (StatusCode::OK, Json(response))
        }
        Ok(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HttpToolResponse {
                success: false,
                result: None,
                error: Some("No response generated".to_string()),
            }),
        ),
        Err(e) => {
            error!("Tool call error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HttpToolResponse {
                    success: false,
                    result: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
