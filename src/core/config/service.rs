use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::validation::validate_config;
use crate::core::errors::ApiError;

const REDACTED: &str = "****";

/// Key suffixes whose values belong in `secrets.yaml` and never leave the
/// service unredacted: `llm.api_key` and `admin.password`, plus anything an
/// operator adds under a similar name.
const SECRET_SUFFIXES: [&str; 4] = ["api_key", "password", "secret", "token"];

/// Reads and patches the service configuration.
///
/// The effective config is `config.yml` with `secrets.yaml` laid over it.
/// Patches are merged into the effective config, validated as a whole, then
/// split back into the two files.
#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    /// `POLICY_ASSISTANT_CONFIG_PATH`, then a user copy in the data dir, then
    /// the `config.yml` shipped next to the crate.
    pub fn config_path(&self) -> PathBuf {
        if let Some(path) = config_path_override() {
            return path;
        }
        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }
        self.paths.project_root.join("config.yml")
    }

    /// Edits always land in the data dir so the shipped defaults stay intact.
    pub fn config_write_path(&self) -> PathBuf {
        config_path_override().unwrap_or_else(|| self.paths.user_data_dir.join("config.yml"))
    }

    pub fn load_config(&self) -> Result<Value, ApiError> {
        let public_config = read_yaml_object(&self.config_path());
        let secrets = read_yaml_object(&self.paths.secrets_path);
        Ok(deep_merge(&public_config, &secrets))
    }

    /// Merges `patch` into the current config. Redacted placeholders in the
    /// patch keep the stored secret.
    pub fn update_config(&self, patch: Value) -> Result<(), ApiError> {
        let current = self.load_config()?;
        let patch = unredact(&patch, &current);
        let updated = deep_merge(&current, &patch);
        validate_config(&updated)?;

        let (public_config, secrets) = split_secrets(&updated);
        write_yaml(&self.config_write_path(), &public_config)?;
        write_yaml(&self.paths.secrets_path, &secrets)?;
        tracing::info!("Configuration updated");
        Ok(())
    }

    pub fn redact_sensitive_values(&self, value: &Value) -> Value {
        redact(value)
    }
}

fn config_path_override() -> Option<PathBuf> {
    env::var("POLICY_ASSISTANT_CONFIG_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_lowercase();
    SECRET_SUFFIXES.iter().any(|suffix| key.ends_with(suffix))
}

/// Missing, unreadable or non-mapping files all read as an empty mapping.
fn read_yaml_object(path: &Path) -> Value {
    let empty = Value::Object(Map::new());
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return empty,
        Err(err) => {
            tracing::warn!("Failed to read {}: {}", path.display(), err);
            return empty;
        }
    };

    match serde_yaml::from_str::<Value>(&contents) {
        Ok(value) if value.is_object() => value,
        Ok(_) => empty,
        Err(err) => {
            tracing::warn!("Ignoring malformed YAML in {}: {}", path.display(), err);
            empty
        }
    }
}

fn write_yaml(path: &Path, value: &Value) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ApiError::internal)?;
    }
    let yaml = serde_yaml::to_string(value).map_err(ApiError::internal)?;
    fs::write(path, yaml).map_err(ApiError::internal)
}

pub(crate) fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let (Value::Object(base_map), Value::Object(overlay_map)) = (base, overlay) else {
        return overlay.clone();
    };

    let mut merged = base_map.clone();
    for (key, value) in overlay_map {
        let next = match merged.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    Value::Object(merged)
}

/// Splits a config into the `config.yml` part and the `secrets.yaml` part.
/// Sections that end up empty are left out of either side.
fn split_secrets(config: &Value) -> (Value, Value) {
    let Value::Object(map) = config else {
        return (config.clone(), Value::Object(Map::new()));
    };

    let mut public_map = Map::new();
    let mut secret_map = Map::new();
    for (key, value) in map {
        if value.is_object() {
            let (public_part, secret_part) = split_secrets(value);
            for (target, part) in [(&mut public_map, public_part), (&mut secret_map, secret_part)] {
                if part.as_object().is_some_and(|m| !m.is_empty()) {
                    target.insert(key.clone(), part);
                }
            }
        } else if is_secret_key(key) && !value.is_null() {
            secret_map.insert(key.clone(), value.clone());
        } else {
            public_map.insert(key.clone(), value.clone());
        }
    }
    (Value::Object(public_map), Value::Object(secret_map))
}

fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| {
                    let shown = if is_secret_key(key) && !val.is_null() {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact(val)
                    };
                    (key.clone(), shown)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        _ => value.clone(),
    }
}

/// Drops redacted placeholders from a patch so merging keeps the stored
/// value.
fn unredact(patch: &Value, current: &Value) -> Value {
    let Value::Object(map) = patch else {
        return patch.clone();
    };

    let mut cleaned = Map::new();
    for (key, value) in map {
        if value.as_str() == Some(REDACTED) {
            continue;
        }
        let nested = if value.is_object() {
            unredact(value, current.get(key).unwrap_or(&Value::Null))
        } else {
            value.clone()
        };
        cleaned.insert(key.clone(), nested);
    }
    Value::Object(cleaned)
}
