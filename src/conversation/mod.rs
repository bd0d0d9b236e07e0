//! Chat sessions: transcripts plus the background resolution of each answer.

pub mod service;
pub mod store;
pub mod types;

pub use service::{ChatService, PendingTurn};
pub use store::ConversationStore;
pub use types::{ConversationMessage, Role, SessionDetail, SessionInfo};
