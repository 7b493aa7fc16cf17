// src/api/tools.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::error;

use crate::{
    mcp::tools::{self, ToolError},
    registry::RegistryError,
    AppState,
};

fn tool_error_status(err: &ToolError) -> StatusCode {
    match err {
        ToolError::UnknownTool(_) => StatusCode::NOT_FOUND,
        ToolError::InvalidParams(_) => StatusCode::BAD_REQUEST,
        ToolError::Registry(RegistryError::NoCapableAgent { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ToolError::Registry(_) => StatusCode::NOT_FOUND,
    }
}

/// GET /tools - the same catalog `tools/list` returns
pub async fn list_tools_handler() -> impl IntoResponse {
    Json(tools::tool_definitions())
}

/// POST /tools/:name - body is the tool's argument object.
///
/// Blockchain tool failures still answer 200; inspect `success` in the body.
pub async fn call_tool_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(args): Json<Value>,
) -> impl IntoResponse {
    match tools::call_tool(&state, &name, &args).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            error!("Tool '{}' rejected: {}", name, e);
            (tool_error_status(&e), e.to_string()).into_response()
        }
    }
}
