//! # API Module
//!
//! HTTP handlers for the server, mounted under `/api`.
//!
//! ## Available Endpoints
//!
//! - `GET /health` - Liveness plus registry size and supported chains
//! - `POST /rpc` - MCP JSON-RPC over HTTP
//!
//! ### Agent Registry
//! - `GET /agents` - List agents (`?capability=` discovers by tag instead)
//! - `POST /agents` - Register or replace an agent
//! - `GET /agents/:agent_id` - Get one agent
//! - `POST /agents/:agent_id/reputation` - Adjust reputation by `delta`
//! - `GET /agents/:agent_id/messages` - Drain the agent's mailbox
//! - `POST /agents/:agent_id/messages` - Send the agent a message
//! - `POST /delegations` - Delegate a task
//! - `GET /delegations/:task_id` - Get a delegation
//! - `PATCH /delegations/:task_id` - Update a delegation's status
//! - `POST /workflows` - Compose a workflow
//!
//! ### Tools
//! - `GET /tools` - Tool catalog
//! - `POST /tools/:name` - Invoke a tool with a JSON argument object

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub mod agents;
pub mod health;
pub mod rpc;
pub mod tools;

/// The full HTTP application
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        // Health check
        .route("/health", get(health::health_handler))
        // Agent registry
        .merge(agents::create_registry_router())
        // Tools
        .route("/tools", get(tools::list_tools_handler))
        .route("/tools/:name", post(tools::call_tool_handler))
        // JSON-RPC endpoint for MCP tool calls
        .route("/rpc", post(rpc::rpc_handler));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
