use async_trait::async_trait;

use super::error::LlmError;
use super::types::StructuredRequest;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "gemini", "openai")
    fn name(&self) -> &str;

    /// check if the provider is reachable with the configured credentials
    async fn health_check(&self) -> bool;

    /// single structured completion; returns the raw text the model produced
    async fn generate_structured(&self, request: StructuredRequest) -> Result<String, LlmError>;
}
