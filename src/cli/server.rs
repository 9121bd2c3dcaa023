//! HTTP tool server

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{ContractHandler, ToolCallError};
use crate::error::{Error, Result};

/// App state shared across handlers
#[derive(Clone, Default)]
struct AppState {
    handler: ContractHandler,
}

/// Build the router; separate from [`serve`] so it can be driven in tests
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/:name", post(call_tool))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState::default()))
}

/// Start the HTTP server
pub async fn serve(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting tool server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, router())
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

async fn list_tools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "tools": state.handler.tools() }))
}

/// Run a tool. Tool failures are still 200 with an `error` document.
async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    let arguments = match body {
        Ok(Json(arguments)) => arguments,
        Err(rejection) => {
            let message = format!("Invalid arguments for tool '{name}': {rejection}");
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response();
        }
    };

    // Database and file work blocks
    let handler = state.handler;
    let tool = name.clone();
    let outcome = tokio::task::spawn_blocking(move || handler.call(&tool, arguments)).await;

    match outcome {
        Ok(Ok(document)) => (StatusCode::OK, Json(document)).into_response(),
        Ok(Err(e @ ToolCallError::UnknownTool(_))) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Ok(Err(e @ ToolCallError::InvalidArguments { .. })) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            tracing::error!(tool = %name, "Tool task failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Tool '{name}' failed: {e}") })),
            )
                .into_response()
        }
    }
}
