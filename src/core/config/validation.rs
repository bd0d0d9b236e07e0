use serde_json::{Map, Value};

use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65_535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_enum_field(llm, "llm.provider", "provider", &["gemini", "openai"])?;
        validate_non_empty_string_field(llm, "llm.model", "model")?;
        validate_optional_string_field(llm, "llm.base_url", "base_url")?;
        validate_optional_string_field(llm, "llm.api_key", "api_key")?;
        validate_u64_field(
            llm,
            "llm.request_timeout_secs",
            "request_timeout_secs",
            1,
            3_600,
        )?;
    }

    if let Some(knowledge) = expect_optional_object(root, "knowledge")? {
        validate_enum_field(
            knowledge,
            "knowledge.storage_backend",
            "storage_backend",
            &["sqlite", "memory"],
        )?;
        validate_non_empty_string_field(knowledge, "knowledge.namespace_key", "namespace_key")?;
    }

    if let Some(admin) = expect_optional_object(root, "admin")? {
        validate_non_empty_string_field(admin, "admin.password", "password")?;
    }

    if let Some(chat) = expect_optional_object(root, "chat")? {
        validate_u64_field(
            chat,
            "chat.max_question_length",
            "max_question_length",
            1,
            1_000_000,
        )?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() {
        return Ok(());
    }
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    match section.get(key) {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(config_type_error(path, "string")),
    }
}

fn validate_non_empty_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_enum_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if !allowed.contains(&text) {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': expected one of {}",
            path,
            allowed.join(", ")
        )));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_the_shipped_defaults() {
        let config = json!({
            "server": { "host": "127.0.0.1", "port": 8000, "cors_allowed_origins": ["http://localhost:5173"] },
            "llm": { "provider": "gemini", "model": "gemini-3-flash-preview" },
            "knowledge": { "storage_backend": "sqlite", "namespace_key": "hr_docs" },
            "chat": { "max_question_length": 10000 }
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_unknown_provider() {
        let config = json!({ "llm": { "provider": "carrier-pigeon" } });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("llm.provider"));
    }

    #[test]
    fn rejects_blank_admin_password() {
        let config = json!({ "admin": { "password": "  " } });
        assert!(matches!(validate_config(&config), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let config = json!({ "llm": { "request_timeout_secs": 0 } });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(validate_config(&json!([1, 2])).is_err());
    }
}
