use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::types::{ConversationMessage, Role, SessionDetail, SessionInfo};
use crate::core::errors::ApiError;
use crate::rag::QueryResult;

pub const PLACEHOLDER_CONTENT: &str = "Thinking...";
pub const DEFAULT_SESSION_TITLE: &str = "New conversation";
const TITLE_MAX_CHARS: usize = 50;

struct Session {
    id: String,
    title: String,
    titled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    messages: Vec<ConversationMessage>,
}

impl Session {
    fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.messages.len(),
            pending_count: self.messages.iter().filter(|m| m.pending).count(),
        }
    }
}

/// In-memory chat transcripts, newest session first.
///
/// Locks are held only for the append/replace itself, never across an LLM
/// call.
#[derive(Clone, Default)]
pub struct ConversationStore {
    sessions: Arc<RwLock<Vec<Session>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_session(&self, title: Option<String>) -> SessionInfo {
        let now = Utc::now();
        let title = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        let session = Session {
            id: Uuid::new_v4().to_string(),
            titled: title.is_some(),
            title: title.unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string()),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };
        let info = session.info();
        self.sessions.write().await.insert(0, session);
        tracing::debug!("Created chat session {}", info.id);
        info
    }

    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        self.sessions.read().await.iter().map(Session::info).collect()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn get_session(&self, session_id: &str) -> Option<SessionDetail> {
        let sessions = self.sessions.read().await;
        sessions
            .iter()
            .find(|s| s.id == session_id)
            .map(|s| SessionDetail {
                info: s.info(),
                messages: s.messages.clone(),
            })
    }

    pub async fn messages(&self, session_id: &str) -> Result<Vec<ConversationMessage>, ApiError> {
        let sessions = self.sessions.read().await;
        sessions
            .iter()
            .find(|s| s.id == session_id)
            .map(|s| s.messages.clone())
            .ok_or_else(|| session_not_found(session_id))
    }

    pub async fn message(&self, session_id: &str, message_id: &str) -> Option<ConversationMessage> {
        let sessions = self.sessions.read().await;
        sessions
            .iter()
            .find(|s| s.id == session_id)?
            .messages
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
    }

    /// Appends the user message and a pending assistant placeholder, in that
    /// order, under one lock.
    pub async fn begin_turn(
        &self,
        session_id: &str,
        question: &str,
    ) -> Result<(ConversationMessage, ConversationMessage), ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| session_not_found(session_id))?;

        let now = Utc::now();
        let user = ConversationMessage {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: question.to_string(),
            category: None,
            citations: None,
            pending: false,
            created_at: now,
        };
        let placeholder = ConversationMessage {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: PLACEHOLDER_CONTENT.to_string(),
            category: None,
            citations: None,
            pending: true,
            created_at: now,
        };

        if !session.titled {
            session.title = title_from_question(question);
            session.titled = true;
        }
        session.messages.push(user.clone());
        session.messages.push(placeholder.clone());
        session.updated_at = now;

        Ok((user, placeholder))
    }

    /// Replaces a pending placeholder with the answer. Returns false if the
    /// message is gone or was already resolved.
    pub async fn resolve(&self, session_id: &str, message_id: &str, result: &QueryResult) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.iter_mut().find(|s| s.id == session_id) else {
            return false;
        };
        let Some(message) = session
            .messages
            .iter_mut()
            .find(|m| m.id == message_id && m.pending)
        else {
            return false;
        };

        message.content = result.answer.clone();
        message.category = Some(result.category.clone());
        message.citations = Some(result.citations.clone());
        message.pending = false;
        session.updated_at = Utc::now();
        true
    }
}

fn session_not_found(session_id: &str) -> ApiError {
    ApiError::NotFound(format!("Session '{}' not found", session_id))
}

fn title_from_question(question: &str) -> String {
    let trimmed = question.trim();
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    title.push_str("...");
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> QueryResult {
        QueryResult {
            answer: "15 days in your first year.".to_string(),
            citations: vec!["15 days first year.".to_string()],
            category: "Benefits".to_string(),
        }
    }

    #[tokio::test]
    async fn begin_turn_appends_user_then_placeholder() {
        let store = ConversationStore::new();
        let session = store.create_session(None).await;

        let (user, placeholder) = store.begin_turn(&session.id, "Vacation days?").await.unwrap();

        let messages = store.messages(&session.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], user);
        assert_eq!(messages[1], placeholder);
        assert_eq!(placeholder.role, Role::Assistant);
        assert_eq!(placeholder.content, PLACEHOLDER_CONTENT);
        assert!(placeholder.pending);
        assert!(!user.pending);
    }

    #[tokio::test]
    async fn resolve_replaces_placeholder_in_place() {
        let store = ConversationStore::new();
        let session = store.create_session(Some("Leave".to_string())).await;
        let (_, first) = store.begin_turn(&session.id, "one").await.unwrap();
        let (_, second) = store.begin_turn(&session.id, "two").await.unwrap();

        assert!(store.resolve(&session.id, &second.id, &answer()).await);

        let messages = store.messages(&session.id).await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].id, first.id);
        assert!(messages[1].pending);
        assert_eq!(messages[3].id, second.id);
        assert!(!messages[3].pending);
        assert_eq!(messages[3].content, "15 days in your first year.");
        assert_eq!(messages[3].category.as_deref(), Some("Benefits"));
        assert_eq!(
            messages[3].citations.as_deref(),
            Some(&["15 days first year.".to_string()][..])
        );
    }

    #[tokio::test]
    async fn resolve_is_one_shot_and_ignores_unknown_ids() {
        let store = ConversationStore::new();
        let session = store.create_session(None).await;
        let (user, placeholder) = store.begin_turn(&session.id, "q").await.unwrap();

        assert!(store.resolve(&session.id, &placeholder.id, &answer()).await);
        assert!(!store.resolve(&session.id, &placeholder.id, &QueryResult::error()).await);
        assert!(!store.resolve(&session.id, &user.id, &answer()).await);
        assert!(!store.resolve("missing", &placeholder.id, &answer()).await);

        let resolved = store.message(&session.id, &placeholder.id).await.unwrap();
        assert_eq!(resolved.category.as_deref(), Some("Benefits"));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = ConversationStore::new();
        assert!(matches!(
            store.begin_turn("nope", "q").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(store.messages("nope").await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn untitled_session_takes_first_question_as_title() {
        let store = ConversationStore::new();
        let session = store.create_session(Some("   ".to_string())).await;
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);

        let long_question = "x".repeat(80);
        store.begin_turn(&session.id, &long_question).await.unwrap();
        store.begin_turn(&session.id, "second question").await.unwrap();

        let detail = store.get_session(&session.id).await.unwrap();
        assert_eq!(detail.info.title, format!("{}...", "x".repeat(50)));
        assert_eq!(detail.info.message_count, 4);
        assert_eq!(detail.info.pending_count, 2);
    }

    #[tokio::test]
    async fn sessions_are_listed_newest_first() {
        let store = ConversationStore::new();
        let first = store.create_session(Some("first".to_string())).await;
        let second = store.create_session(Some("second".to_string())).await;

        let ids: Vec<String> = store.list_sessions().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(store.session_count().await, 2);
    }
}
