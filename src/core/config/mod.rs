pub mod paths;
pub mod service;
pub mod settings;
pub mod validation;

pub use paths::AppPaths;
pub use service::ConfigService;
pub use settings::{
    admin_password, max_question_length, KnowledgeSettings, LlmSettings, ProviderKind, ServerSettings,
    StorageBackend,
};
