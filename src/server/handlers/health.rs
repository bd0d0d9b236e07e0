use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    /// Also ask the provider whether it is reachable.
    #[serde(default)]
    pub probe: bool,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    let dispatcher = state.dispatcher();
    let llm_reachable = if query.probe {
        Some(dispatcher.provider().health_check().await)
    } else {
        None
    };

    Json(json!({
        "status": "ok",
        "documents": state.documents.count().await,
        "storage_backend": state.documents.backend_name(),
        "provider": dispatcher.provider().name(),
        "model": dispatcher.model(),
        "llm_reachable": llm_reachable,
        "sessions": state.conversations().session_count().await,
    }))
}
