use tokio::task::JoinHandle;

use super::store::ConversationStore;
use super::types::ConversationMessage;
use crate::core::errors::ApiError;
use crate::knowledge::DocumentStore;
use crate::rag::{QueryDispatcher, QueryResult};

/// A submitted question whose answer is still being produced.
pub struct PendingTurn {
    pub user: ConversationMessage,
    pub placeholder: ConversationMessage,
    /// Yields the resolved assistant message.
    pub handle: JoinHandle<Option<ConversationMessage>>,
}

/// Runs questions against the knowledge base and records them in sessions.
#[derive(Clone)]
pub struct ChatService {
    conversations: ConversationStore,
    documents: DocumentStore,
    dispatcher: QueryDispatcher,
    max_question_length: usize,
}

impl ChatService {
    pub fn new(
        conversations: ConversationStore,
        documents: DocumentStore,
        dispatcher: QueryDispatcher,
        max_question_length: usize,
    ) -> Self {
        Self {
            conversations,
            documents,
            dispatcher,
            max_question_length,
        }
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn dispatcher(&self) -> &QueryDispatcher {
        &self.dispatcher
    }

    /// Checks the trimmed text only. Callers keep the question as typed.
    fn validate_question(&self, question: &str) -> Result<(), ApiError> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(ApiError::BadRequest("Question cannot be empty".to_string()));
        }
        if trimmed.chars().count() > self.max_question_length {
            return Err(ApiError::BadRequest(format!(
                "Question exceeds {} characters",
                self.max_question_length
            )));
        }
        Ok(())
    }

    /// One-shot question outside any session.
    pub async fn query(&self, question: &str) -> Result<QueryResult, ApiError> {
        self.validate_question(question)?;
        let documents = self.documents.list().await;
        Ok(self.dispatcher.dispatch(question, &documents).await)
    }

    /// Records the question and a pending placeholder, then resolves the
    /// placeholder on a background task. Overlapping submissions each get
    /// their own placeholder and may finish in any order.
    pub async fn submit(&self, session_id: &str, question: &str) -> Result<PendingTurn, ApiError> {
        self.validate_question(question)?;
        let (user, placeholder) = self.conversations.begin_turn(session_id, question).await?;
        let documents = self.documents.list().await;

        let conversations = self.conversations.clone();
        let dispatcher = self.dispatcher.clone();
        let question = question.to_string();
        let session_id = session_id.to_string();
        let message_id = placeholder.id.clone();

        let handle = tokio::spawn(async move {
            let result = dispatcher.dispatch(&question, &documents).await;
            if !conversations.resolve(&session_id, &message_id, &result).await {
                tracing::warn!(
                    "Placeholder {} in session {} was no longer pending",
                    message_id,
                    session_id
                );
            }
            conversations.message(&session_id, &message_id).await
        });

        Ok(PendingTurn {
            user,
            placeholder,
            handle,
        })
    }

    /// `submit` and wait for the answer.
    pub async fn ask(&self, session_id: &str, question: &str) -> Result<ConversationMessage, ApiError> {
        let turn = self.submit(session_id, question).await?;
        turn.handle
            .await
            .map_err(|e| ApiError::internal(format!("Answer task failed: {}", e)))?
            .ok_or_else(|| ApiError::internal("Resolved message disappeared"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::store::PLACEHOLDER_CONTENT;
    use crate::conversation::types::Role;
    use crate::knowledge::{MemoryKeyValueStore, NewDocument};
    use crate::llm::{LlmError, LlmProvider, StructuredRequest};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Echoes the question back as the answer, optionally waiting for a
    /// release signal first.
    struct EchoProvider {
        gate: Option<Arc<Notify>>,
        fail: bool,
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn generate_structured(&self, request: StructuredRequest) -> Result<String, LlmError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(LlmError::Timeout);
            }
            Ok(serde_json::json!({
                "answer": format!("echo: {}", request.user_input),
                "citations": [],
                "category": "General"
            })
            .to_string())
        }
    }

    async fn service_with(provider: EchoProvider, max_len: usize) -> ChatService {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let documents = DocumentStore::load(kv, "hr_docs", Vec::new()).await.unwrap();
        documents
            .add(NewDocument {
                name: "Vacation Policy".to_string(),
                content: "15 days first year.".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        ChatService::new(
            ConversationStore::new(),
            documents,
            QueryDispatcher::new(Arc::new(provider), "m"),
            max_len,
        )
    }

    #[tokio::test]
    async fn ask_resolves_placeholder_with_answer() {
        let service = service_with(EchoProvider { gate: None, fail: false }, 100).await;
        let session = service.conversations().create_session(None).await;

        let message = service.ask(&session.id, "  Vacation days?  ").await.unwrap();

        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "echo:   Vacation days?  ");
        assert!(!message.pending);

        let messages = service.conversations().messages(&session.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "  Vacation days?  ");
        assert_eq!(messages[1], message);
    }

    #[tokio::test]
    async fn placeholder_stays_pending_until_answer_arrives() {
        let gate = Arc::new(Notify::new());
        let service = service_with(
            EchoProvider {
                gate: Some(gate.clone()),
                fail: false,
            },
            100,
        )
        .await;
        let session = service.conversations().create_session(None).await;

        let turn = service.submit(&session.id, "q").await.unwrap();
        let snapshot = service.conversations().messages(&session.id).await.unwrap();
        assert!(snapshot[1].pending);
        assert_eq!(snapshot[1].content, PLACEHOLDER_CONTENT);

        gate.notify_one();
        let resolved = turn.handle.await.unwrap().unwrap();
        assert_eq!(resolved.id, turn.placeholder.id);
        assert!(!resolved.pending);
    }

    #[tokio::test]
    async fn overlapping_questions_each_resolve_their_own_placeholder() {
        let service = service_with(EchoProvider { gate: None, fail: false }, 100).await;
        let session = service.conversations().create_session(None).await;

        let first = service.submit(&session.id, "first").await.unwrap();
        let second = service.submit(&session.id, "second").await.unwrap();
        let second_done = second.handle.await.unwrap().unwrap();
        let first_done = first.handle.await.unwrap().unwrap();

        assert_eq!(first_done.content, "echo: first");
        assert_eq!(second_done.content, "echo: second");
        let messages = service.conversations().messages(&session.id).await.unwrap();
        assert_eq!(messages.len(), 4);
        assert!(messages.iter().all(|m| !m.pending));
    }

    #[tokio::test]
    async fn failure_renders_as_error_message() {
        let service = service_with(EchoProvider { gate: None, fail: true }, 100).await;
        let session = service.conversations().create_session(None).await;

        let message = service.ask(&session.id, "q").await.unwrap();

        assert_eq!(message.category.as_deref(), Some("Error"));
        assert_eq!(message.content, QueryResult::error().answer);
    }

    #[tokio::test]
    async fn blank_or_oversized_questions_append_nothing() {
        let service = service_with(EchoProvider { gate: None, fail: false }, 5).await;
        let session = service.conversations().create_session(None).await;

        for question in ["", "   \n\t", "longer than five"] {
            assert!(matches!(
                service.submit(&session.id, question).await,
                Err(ApiError::BadRequest(_))
            ));
        }
        assert!(service.conversations().messages(&session.id).await.unwrap().is_empty());
        assert!(matches!(service.query(" ").await, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn length_limit_ignores_surrounding_whitespace() {
        let service = service_with(EchoProvider { gate: None, fail: false }, 5).await;
        let result = service.query("\n  hello  \n").await.unwrap();
        assert_eq!(result.answer, "echo: \n  hello  \n");
    }

    #[tokio::test]
    async fn one_shot_query_uses_dispatcher() {
        let service = service_with(EchoProvider { gate: None, fail: false }, 100).await;
        let result = service.query("hello").await.unwrap();
        assert_eq!(result.answer, "echo: hello");
    }
}
