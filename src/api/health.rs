use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let chains: Vec<&str> = state
        .config
        .supported_chains()
        .iter()
        .map(|c| c.name())
        .collect();
    Json(serde_json::json!({
        "status": "ok",
        "agents": state.registry.list_agents().await.len(),
        "chains": chains,
    }))
}
