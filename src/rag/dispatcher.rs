use std::sync::Arc;

use serde_json::Value;

use super::context_builder::assemble;
use super::normalizer::{normalize, QueryResult};
use super::prompt::{answer_schema, build_system_instruction, SCHEMA_NAME};
use crate::knowledge::Document;
use crate::llm::{LlmError, LlmProvider, StructuredRequest};

/// Turns a question plus the document collection into a `QueryResult` with a
/// single provider call.
#[derive(Clone)]
pub struct QueryDispatcher {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl QueryDispatcher {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Never returns an error: transport and parse failures both come back as
    /// `QueryResult::error()`. One attempt, no retry.
    pub async fn dispatch(&self, question: &str, documents: &[Document]) -> QueryResult {
        let context = assemble(documents);
        tracing::debug!(
            "Dispatching question to {} ({} documents, {} context bytes)",
            self.provider.name(),
            documents.len(),
            context.len()
        );

        let request = StructuredRequest {
            model: self.model.clone(),
            system_instruction: build_system_instruction(&context),
            user_input: question.to_string(),
            schema_name: SCHEMA_NAME.to_string(),
            schema: answer_schema(),
        };

        let outcome = match self.provider.generate_structured(request).await {
            Ok(text) => parse_reply(&text),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(result) => result,
            Err(err) => {
                if err.is_transport() {
                    tracing::error!("LLM call failed: {}", err);
                } else {
                    tracing::error!("LLM returned an unusable reply: {}", err);
                }
                QueryResult::error()
            }
        }
    }
}

fn parse_reply(text: &str) -> Result<QueryResult, LlmError> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(LlmError::Malformed("empty reply".to_string()));
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| LlmError::Malformed(e.to_string()))?;
    Ok(normalize(Some(&value)))
}

/// Some OpenAI-compatible servers wrap JSON replies in a markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
