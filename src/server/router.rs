use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::config::ServerSettings;
use crate::core::security::API_KEY_HEADER;
use crate::server::handlers::{admin, config, documents, health, query, sessions};
use crate::state::AppState;

const UPLOAD_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Builds the HTTP surface.
///
/// Employee routes (query, sessions, suggestions) are open. Document and
/// config routes need an admin token in `x-api-key`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state);
    Router::new()
        .route("/health", get(health::health))
        .route("/api/status", get(health::get_status))
        .route("/api/query", post(query::query))
        .route("/api/suggestions", get(query::suggestions))
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/api/sessions/:session_id", get(sessions::get_session))
        .route(
            "/api/sessions/:session_id/messages",
            get(sessions::get_session_messages).post(sessions::post_message),
        )
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route(
            "/api/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/api/documents/upload",
            post(documents::upload_documents).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/documents/:document_id",
            get(documents::get_document)
                .patch(documents::update_document)
                .delete(documents::delete_document),
        )
        .route(
            "/api/config",
            get(config::get_config).patch(config::patch_config),
        )
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(state: &Arc<AppState>) -> CorsLayer {
    let config = match state.config.load_config() {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                "Failed to load config while building CORS layer: {}; using local defaults",
                err
            );
            Value::Null
        }
    };

    let configured = ServerSettings::from_config(&config).cors_allowed_origins;
    let origins = if configured.is_empty() {
        default_local_origins()
    } else {
        configured
    };

    let allow_origin = AllowOrigin::list(
        origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect::<Vec<_>>(),
    );

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(API_KEY_HEADER),
        ])
}

fn default_local_origins() -> Vec<String> {
    ["localhost", "127.0.0.1"]
        .iter()
        .flat_map(|host| {
            ["", ":3000", ":5173", ":8000"]
                .iter()
                .map(move |port| format!("http://{}{}", host, port))
        })
        .collect()
}
