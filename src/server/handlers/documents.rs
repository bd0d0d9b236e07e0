use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::core::security::require_admin;
use crate::knowledge::upload::document_from_upload;
use crate::knowledge::{DocumentPatch, NewDocument};
use crate::state::AppState;

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.admin).await?;
    let documents = state.documents.list().await;
    Ok(Json(json!({ "documents": documents })))
}

/// Manual entry: name and content are both required.
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<NewDocument>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.admin).await?;
    if payload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Document content is required".to_string()));
    }
    let document = state.documents.add(payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "document": document }))))
}

/// Accepts one or more `file` parts and an optional `category` part that
/// applies to all of them. Either every file is stored or none is.
pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.admin).await?;

    let mut files = Vec::new();
    let mut category = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("category") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                category = Some(text).filter(|c| !c.trim().is_empty());
            }
            _ => {
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                files.push((file_name, bytes));
            }
        }
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("No file provided".to_string()));
    }

    let new_docs = files
        .iter()
        .map(|(file_name, bytes)| {
            let mut new_doc = document_from_upload(file_name, bytes);
            new_doc.category = category.clone();
            new_doc
        })
        .collect();
    let created = state.documents.add_many(new_docs).await?;

    Ok((StatusCode::CREATED, Json(json!({ "documents": created }))))
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.admin).await?;
    let document = state
        .documents
        .get(&document_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Document '{}' not found", document_id)))?;
    Ok(Json(json!({ "document": document })))
}

pub async fn update_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<String>,
    Json(patch): Json<DocumentPatch>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.admin).await?;
    if patch.is_empty() {
        return Err(ApiError::BadRequest("Nothing to update".to_string()));
    }
    let document = state.documents.update(&document_id, patch).await?;
    Ok(Json(json!({ "document": document })))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &state.admin).await?;
    if !state.documents.delete(&document_id).await? {
        return Err(ApiError::NotFound(format!(
            "Document '{}' not found",
            document_id
        )));
    }
    Ok(Json(json!({ "status": "deleted", "id": document_id })))
}
