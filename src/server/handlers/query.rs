use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "How many vacation days do I get?",
    "Can I work from a coffee shop?",
    "What is the process for parental leave?",
    "How do I claim health benefits?",
];

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.chat.query(&payload.question).await?;
    Ok(Json(result))
}

pub async fn suggestions() -> impl IntoResponse {
    Json(json!({ "suggestions": SUGGESTED_QUESTIONS }))
}
