// file: src/mcp/http.rs
// description: request/response HTTP endpoint for tool calls behind an identity proxy
// reference: https://docs.rs/axum

use crate::error::BookshelfError;
use crate::models::UserIdentity;
use crate::tools::{Dispatcher, ToolCall, ToolResponse, ToolSpec, registry};
use crate::utils::{HealthReport, HealthStatus, Validator};
use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn};

/// Set by the upstream auth proxy after it has verified the caller.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
}

enum ApiError {
    Unauthenticated(String),
    Tool(BookshelfError),
}

impl From<BookshelfError> for ApiError {
    fn from(err: BookshelfError) -> Self {
        ApiError::Tool(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthenticated(message) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": message }))
            }
            ApiError::Tool(err) => {
                let status = match &err {
                    BookshelfError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    BookshelfError::UnknownTool(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if !err.is_client_error() {
                    warn!("Tool call failed: {}", err);
                }

                let mut body = json!({ "error": err.to_string() });
                if let BookshelfError::Validation { field, .. } = &err {
                    body["field"] = json!(field);
                }
                (status, body)
            }
        };

        (status, Json(body)).into_response()
    }
}

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/tools", get(list_tools_handler))
        .route("/tools/:name", post(call_tool_handler))
        .with_state(AppState { dispatcher })
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %uuid::Uuid::new_v4(),
                )
            }),
        )
}

pub async fn serve(dispatcher: Arc<Dispatcher>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP tool endpoint listening on http://{}", addr);

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down HTTP tool endpoint");
        })
        .await?;
    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.dispatcher.health().await;
    let status = match report.overall_status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (status, Json(report))
}

async fn list_tools_handler() -> Json<Vec<ToolSpec>> {
    Json(registry())
}

async fn call_tool_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ToolResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;

    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| BookshelfError::validation("body", e.to_string()))?
    };

    // rejected input never reaches the store, not even through the session refresh
    let call = ToolCall::parse(&name, arguments)?;
    call.validate()?;

    state.dispatcher.init_session(&identity).await;
    let response = state.dispatcher.dispatch(&identity, call).await?;
    Ok(Json(response))
}

fn identity_from_headers(headers: &HeaderMap) -> Result<UserIdentity, ApiError> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .ok_or_else(|| ApiError::Unauthenticated(format!("missing {} header", USER_ID_HEADER)))?;

    Validator::validate_user_id(user_id).map_err(|e| ApiError::Unauthenticated(e.to_string()))?;

    let display_name = headers
        .get(USER_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    Ok(UserIdentity::new(user_id, display_name.trim()))
}
