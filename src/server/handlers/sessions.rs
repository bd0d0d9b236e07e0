use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub question: String,
    /// Block until the answer is in instead of returning the placeholder.
    #[serde(default)]
    pub wait: bool,
}

pub async fn list_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sessions = state.conversations().list_sessions().await;
    Json(json!({ "sessions": sessions }))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<CreateSessionRequest>>,
) -> impl IntoResponse {
    let title = payload.and_then(|Json(body)| body.title);
    let session = state.conversations().create_session(title).await;
    (StatusCode::CREATED, Json(json!({ "session": session })))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .conversations()
        .get_session(&session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session '{}' not found", session_id)))?;
    Ok(Json(json!({ "session": session })))
}

pub async fn get_session_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = state.conversations().messages(&session_id).await?;
    Ok(Json(json!({ "messages": messages })))
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<PostMessageRequest>,
) -> Result<Response, ApiError> {
    let turn = state.chat.submit(&session_id, &payload.question).await?;

    if !payload.wait {
        let body = json!({ "user": turn.user, "assistant": turn.placeholder });
        return Ok((StatusCode::ACCEPTED, Json(body)).into_response());
    }

    let resolved = turn
        .handle
        .await
        .map_err(|e| ApiError::internal(format!("Answer task failed: {}", e)))?
        .ok_or_else(|| ApiError::internal("Resolved message disappeared"))?;
    Ok(Json(json!({ "user": turn.user, "assistant": resolved })).into_response())
}
