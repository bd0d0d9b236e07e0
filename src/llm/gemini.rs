use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::error::LlmError;
use super::provider::LlmProvider;
use super::types::StructuredRequest;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Generative Language REST API (`generateContent`).
#[derive(Clone)]
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(base_url: String, api_key: String, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}", self.base_url, model)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1beta/models", self.base_url);
        match self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn generate_structured(&self, request: StructuredRequest) -> Result<String, LlmError> {
        let url = format!("{}:generateContent", self.model_url(&request.model));

        let body = json!({
            "systemInstruction": {
                "parts": [{ "text": request.system_instruction }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.user_input }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": request.schema.to_gemini_schema()
            }
        });

        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
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
        extract_text(&payload)
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(payload: &Value) -> Result<String, LlmError> {
    let Some(candidate) = payload["candidates"].get(0) else {
        let reason = payload["promptFeedback"]["blockReason"]
            .as_str()
            .unwrap_or("no candidates returned");
        return Err(LlmError::Malformed(reason.to_string()));
    };

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate["finishReason"].as_str().unwrap_or("empty text");
        return Err(LlmError::Malformed(format!("candidate has no text ({})", reason)));
    }

    Ok(text)
}
