//! Typed views over the merged configuration value.
//!
//! Each view reads its own section and falls back to built-in defaults, so a
//! missing or partial `config.yml` still yields a runnable service.

use std::env;
use std::time::Duration;

use serde_json::Value;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_NAMESPACE_KEY: &str = "hr_docs";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_MAX_QUESTION_LENGTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    /// `None` means the call is never cut short.
    pub request_timeout: Option<Duration>,
}

impl LlmSettings {
    pub fn from_config(config: &Value) -> Self {
        let section = config.get("llm");
        let provider = match str_field(section, "provider") {
            Some("openai") => ProviderKind::OpenAi,
            _ => ProviderKind::Gemini,
        };

        let (default_model, default_base_url, env_keys): (&str, &str, &[&str]) = match provider {
            ProviderKind::Gemini => (
                DEFAULT_GEMINI_MODEL,
                DEFAULT_GEMINI_BASE_URL,
                &["GEMINI_API_KEY", "API_KEY"],
            ),
            ProviderKind::OpenAi => (
                DEFAULT_OPENAI_MODEL,
                DEFAULT_OPENAI_BASE_URL,
                &["OPENAI_API_KEY", "API_KEY"],
            ),
        };

        let api_key = str_field(section, "api_key")
            .filter(|key| !key.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                env_keys
                    .iter()
                    .filter_map(|name| env::var(name).ok())
                    .find(|value| !value.trim().is_empty())
            });

        Self {
            provider,
            model: non_empty_str_field(section, "model")
                .unwrap_or(default_model)
                .to_string(),
            base_url: non_empty_str_field(section, "base_url")
                .unwrap_or(default_base_url)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            request_timeout: section
                .and_then(|s| s.get("request_timeout_secs"))
                .and_then(|v| v.as_u64())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct KnowledgeSettings {
    pub storage_backend: StorageBackend,
    pub namespace_key: String,
}

impl KnowledgeSettings {
    pub fn from_config(config: &Value) -> Self {
        let section = config.get("knowledge");
        Self {
            storage_backend: match str_field(section, "storage_backend") {
                Some("memory") => StorageBackend::Memory,
                _ => StorageBackend::Sqlite,
            },
            namespace_key: non_empty_str_field(section, "namespace_key")
                .unwrap_or(DEFAULT_NAMESPACE_KEY)
                .to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl ServerSettings {
    pub fn from_config(config: &Value) -> Self {
        let section = config.get("server");
        let port = env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .or_else(|| {
                section
                    .and_then(|s| s.get("port"))
                    .and_then(|v| v.as_u64())
                    .and_then(|v| u16::try_from(v).ok())
            })
            .unwrap_or(8000);

        let cors_allowed_origins = section
            .and_then(|s| s.get("cors_allowed_origins"))
            .and_then(|v| v.as_array())
            .map(|list| {
                list.iter()
                    .filter_map(|item| item.as_str())
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Self {
            host: non_empty_str_field(section, "host")
                .unwrap_or("127.0.0.1")
                .to_string(),
            port,
            cors_allowed_origins,
        }
    }
}

pub fn admin_password(config: &Value) -> String {
    if let Ok(password) = env::var("POLICY_ASSISTANT_ADMIN_PASSWORD") {
        if !password.is_empty() {
            return password;
        }
    }
    non_empty_str_field(config.get("admin"), "password")
        .unwrap_or(DEFAULT_ADMIN_PASSWORD)
        .to_string()
}

pub fn max_question_length(config: &Value) -> usize {
    config
        .get("chat")
        .and_then(|v| v.get("max_question_length"))
        .and_then(|v| v.as_u64())
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(DEFAULT_MAX_QUESTION_LENGTH)
}

fn str_field<'a>(section: Option<&'a Value>, key: &str) -> Option<&'a str> {
    section.and_then(|s| s.get(key)).and_then(|v| v.as_str())
}

fn non_empty_str_field<'a>(section: Option<&'a Value>, key: &str) -> Option<&'a str> {
    str_field(section, key).filter(|v| !v.trim().is_empty())
}
