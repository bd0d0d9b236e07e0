use std::sync::Arc;

use chrono::Utc;

use crate::conversation::{ChatService, ConversationStore};
use crate::core::config::{
    admin_password, max_question_length, AppPaths, ConfigService, KnowledgeSettings, LlmSettings,
    StorageBackend,
};
use crate::core::security::AdminGate;
use crate::knowledge::seed::builtin_seed_documents;
use crate::knowledge::{DocumentStore, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
use crate::llm::build_provider;
use crate::rag::QueryDispatcher;

pub mod error;

use error::InitializationError;

/// Shared state handed to every route.
///
/// - `config`: merged `config.yml` + `secrets.yaml`
/// - `admin`: login tokens for the document and config routes
/// - `documents`: the knowledge base
/// - `chat`: sessions plus the dispatcher that answers into them
#[derive(Clone)]
pub struct AppState {
    pub config: ConfigService,
    pub admin: AdminGate,
    pub documents: DocumentStore,
    pub chat: ChatService,
}

impl AppState {
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        Self::initialize_with(Arc::new(AppPaths::new())).await
    }

    /// Loads configuration, opens storage, merges the seed documents and
    /// builds the configured LLM provider.
    pub async fn initialize_with(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let raw = config
            .load_config()
            .map_err(|e| InitializationError::Config(e.into()))?;

        let knowledge = KnowledgeSettings::from_config(&raw);
        let kv: Arc<dyn KeyValueStore> = match knowledge.storage_backend {
            StorageBackend::Sqlite => Arc::new(
                SqliteKeyValueStore::with_path(paths.db_path.clone())
                    .await
                    .map_err(|e| InitializationError::Storage(e.into()))?,
            ),
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory document storage; edits are lost on restart");
                Arc::new(MemoryKeyValueStore::new())
            }
        };

        let documents = DocumentStore::load(
            kv,
            &knowledge.namespace_key,
            builtin_seed_documents(Utc::now()),
        )
        .await
        .map_err(|e| InitializationError::Knowledge(e.into()))?;

        let llm = LlmSettings::from_config(&raw);
        let provider = build_provider(&llm).map_err(|e| InitializationError::Llm(e.into()))?;
        let dispatcher = QueryDispatcher::new(provider, llm.model);

        Ok(Self::from_parts(
            config,
            AdminGate::new(admin_password(&raw)),
            documents,
            dispatcher,
            max_question_length(&raw),
        ))
    }

    /// Assembles state from already-built pieces, with a fresh set of chat
    /// sessions.
    pub fn from_parts(
        config: ConfigService,
        admin: AdminGate,
        documents: DocumentStore,
        dispatcher: QueryDispatcher,
        max_question_length: usize,
    ) -> Arc<Self> {
        let chat = ChatService::new(
            ConversationStore::new(),
            documents.clone(),
            dispatcher,
            max_question_length,
        );

        Arc::new(AppState {
            config,
            admin,
            documents,
            chat,
        })
    }

    pub fn conversations(&self) -> &ConversationStore {
        self.chat.conversations()
    }

    pub fn dispatcher(&self) -> &QueryDispatcher {
        self.chat.dispatcher()
    }
}
