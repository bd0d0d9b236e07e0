use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::core::security::api_key_from_headers;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .admin
        .login(&payload.password)
        .await
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(json!({ "token": token })))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = api_key_from_headers(&headers).ok_or(ApiError::Unauthorized)?;
    if !state.admin.logout(token).await {
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(json!({ "status": "logged_out" })))
}
