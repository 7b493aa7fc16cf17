// src/api/agents.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};
use validator::Validate;

use crate::{
    registry::{
        AgentDescriptor, AgentMessage, MessageType, NewDelegation, OutgoingMessage,
        RegisteredAgent, RegistryError, TaskDelegation, TaskStatus, WorkflowStep,
        WorkflowStepResult,
    },
    AppState,
};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

// --- Request Models ---

#[derive(Debug, Deserialize)]
pub struct AgentQuery {
    /// When present, only agents offering this tag are returned, best first
    pub capability: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReputationInput {
    pub delta: i32,
}

/// Message body for `POST /agents/:agent_id/messages`; the path names the recipient.
#[derive(Debug, Deserialize)]
pub struct SendMessageInput {
    pub from: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDelegationInput {
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WorkflowInput {
    pub name: String,
    pub steps: Vec<WorkflowStep>,
}

fn registry_error(e: RegistryError) -> (StatusCode, String) {
    let status = match e {
        RegistryError::AgentNotFound(_) | RegistryError::DelegationNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        RegistryError::NoCapableAgent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error!("Registry request failed: {}", e);
    (status, e.to_string())
}

// --- Handlers ---

pub async fn register_agent_handler(
    State(state): State<AppState>,
    Json(input): Json<AgentDescriptor>,
) -> ApiResult<RegisteredAgent> {
    input
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(state.registry.register_agent(input).await))
}

pub async fn list_agents_handler(
    State(state): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Vec<RegisteredAgent>> {
    let agents = match query.capability {
        Some(tag) => state.registry.discover_agents(&tag).await,
        None => state.registry.list_agents().await,
    };
    Ok(Json(agents))
}

pub async fn get_agent_handler(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> ApiResult<RegisteredAgent> {
    state
        .registry
        .get_agent(&agent_id)
        .await
        .map(Json)
        .map_err(registry_error)
}

pub async fn update_reputation_handler(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(input): Json<ReputationInput>,
) -> ApiResult<RegisteredAgent> {
    state
        .registry
        .update_reputation(&agent_id, input.delta)
        .await
        .map(Json)
        .map_err(registry_error)
}

pub async fn send_message_handler(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(input): Json<SendMessageInput>,
) -> ApiResult<AgentMessage> {
    let message = state
        .registry
        .send_message(OutgoingMessage {
            from: input.from,
            to: agent_id,
            message_type: input.message_type,
            payload: input.payload,
            signature: input.signature,
        })
        .await;
    Ok(Json(message))
}

pub async fn receive_messages_handler(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> ApiResult<Vec<AgentMessage>> {
    Ok(Json(state.registry.receive_messages(&agent_id).await))
}

pub async fn delegate_task_handler(
    State(state): State<AppState>,
    Json(input): Json<NewDelegation>,
) -> ApiResult<TaskDelegation> {
    Ok(Json(state.registry.delegate_task(input).await))
}

pub async fn get_delegation_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<TaskDelegation> {
    state
        .registry
        .get_delegation(&task_id)
        .await
        .map(Json)
        .map_err(registry_error)
}

pub async fn update_delegation_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(input): Json<UpdateDelegationInput>,
) -> ApiResult<TaskDelegation> {
    state
        .registry
        .update_delegation(&task_id, input.status, input.result, input.error)
        .await
        .map(Json)
        .map_err(registry_error)
}

pub async fn compose_workflow_handler(
    State(state): State<AppState>,
    Json(input): Json<WorkflowInput>,
) -> ApiResult<Vec<WorkflowStepResult>> {
    info!("Workflow request '{}'", input.name);
    state
        .registry
        .compose_workflow(&input.name, input.steps)
        .await
        .map(Json)
        .map_err(registry_error)
}

/// Routes for the agent registry
pub fn create_registry_router() -> Router<AppState> {
    Router::new()
        .route(
            "/agents",
            get(list_agents_handler).post(register_agent_handler),
        )
        .route("/agents/:agent_id", get(get_agent_handler))
        .route(
            "/agents/:agent_id/reputation",
            post(update_reputation_handler),
        )
        .route(
            "/agents/:agent_id/messages",
            get(receive_messages_handler).post(send_message_handler),
        )
        .route("/delegations", post(delegate_task_handler))
        .route(
            "/delegations/:task_id",
            get(get_delegation_handler).patch(update_delegation_handler),
        )
        .route("/workflows", post(compose_workflow_handler))
}
