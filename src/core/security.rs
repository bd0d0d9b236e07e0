//! Admin gate for the document manager.
//!
//! A single shared password unlocks admin routes. It is a UI gate only: the
//! password is compared as plain text and tokens live in memory until logout
//! or restart.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::HeaderMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::errors::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AdminGate {
    password: Arc<str>,
    tokens: Arc<RwLock<HashSet<String>>>,
}

impl AdminGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: Arc::from(password.into()),
            tokens: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Returns a fresh admin token when `candidate` matches the shared secret.
    pub async fn login(&self, candidate: &str) -> Option<String> {
        if candidate != &*self.password {
            tracing::warn!("Rejected admin login attempt");
            return None;
        }

        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        self.tokens.write().await.insert(token.clone());
        tracing::info!("Admin session opened");
        Some(token)
    }

    pub async fn logout(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token)
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        self.tokens.read().await.contains(token)
    }
}

pub fn api_key_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

pub async fn require_admin(headers: &HeaderMap, gate: &AdminGate) -> Result<(), ApiError> {
    let Some(token) = api_key_from_headers(headers) else {
        return Err(ApiError::Unauthorized);
    };

    if !gate.is_valid(token).await {
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}
