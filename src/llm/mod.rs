pub mod error;
pub mod gemini;
pub mod openai;
pub mod provider;
pub mod types;


use std::sync::Arc;

use reqwest::Client;

use crate::core::config::{LlmSettings, ProviderKind};

pub use error::LlmError;
pub use provider::LlmProvider;
pub use types::{SchemaProperty, SchemaType, StructuredRequest};

/// Builds the configured provider. The HTTP client only gets a timeout when
/// `request_timeout` is set.
pub fn build_provider(settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let mut builder = Client::builder();
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(LlmError::Transport)?;

    if settings.api_key.is_none() {
        tracing::warn!(
            "No API key configured for the {} provider; requests will likely be rejected",
            settings.provider.as_str()
        );
    }

    let provider: Arc<dyn LlmProvider> = match settings.provider {
        ProviderKind::Gemini => Arc::new(gemini::GeminiProvider::new(
            settings.base_url.clone(),
            settings.api_key.clone().unwrap_or_default(),
            client,
        )),
        ProviderKind::OpenAi => Arc::new(openai::OpenAiProvider::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            client,
        )),
    };

    tracing::info!(
        "LLM provider: {} (model {})",
        provider.name(),
        settings.model
    );
    Ok(provider)
}
