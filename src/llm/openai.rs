use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::error::LlmError;
use super::provider::LlmProvider;
use super::types::StructuredRequest;

/// Any OpenAI-compatible `/v1/chat/completions` endpoint (OpenAI, LM Studio,
/// Ollama, ...). Structured output goes through `response_format`.
#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(base_url: String, api_key: Option<String>, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);
        match self.authorized(self.client.get(&url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn generate_structured(&self, request: StructuredRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system_instruction },
                { "role": "user", "content": request.user_input }
            ],
            "stream": false,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "strict": true,
                    "schema": request.schema.to_json_schema()
                }
            }
        });

        let res = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = res.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .filter(|content| !content.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| LlmError::Malformed("completion has no message content".to_string()))
    }
}
