use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATABASE_FILE: &str = "policy_assistant.db";
pub const SECRETS_FILE: &str = "secrets.yaml";
pub const LOG_DIR: &str = "logs";

/// Where the service keeps its state.
///
/// ```text
/// <project_root>/config.yml       shipped defaults
/// <user_data_dir>/config.yml      edits made through the config API
/// <user_data_dir>/secrets.yaml    api keys and the admin password
/// <user_data_dir>/policy_assistant.db
///                                 document collection (sqlite backend)
/// <user_data_dir>/logs/server.log.<date>
/// ```
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub user_data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub db_path: PathBuf,
    pub secrets_path: PathBuf,
}

impl AppPaths {
    /// `POLICY_ASSISTANT_ROOT` and `POLICY_ASSISTANT_DATA_DIR` win over
    /// discovery.
    pub fn new() -> Self {
        let project_root = discover_project_root();
        let user_data_dir = discover_user_data_dir(&project_root);
        Self::with_dirs(project_root, user_data_dir)
    }

    /// Explicit layout with no environment lookups. The data and log
    /// directories are created if missing; a failure here surfaces later when
    /// the database or log file is opened.
    pub fn with_dirs(project_root: PathBuf, user_data_dir: PathBuf) -> Self {
        let log_dir = user_data_dir.join(LOG_DIR);
        if let Err(err) = fs::create_dir_all(&log_dir) {
            eprintln!("Could not create {}: {}", log_dir.display(), err);
        }

        Self {
            db_path: user_data_dir.join(DATABASE_FILE),
            secrets_path: user_data_dir.join(SECRETS_FILE),
            log_dir,
            project_root,
            user_data_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

/// The crate dir when it carries `config.yml` (running from a checkout),
/// otherwise the working directory.
fn discover_project_root() -> PathBuf {
    if let Some(root) = env_path("POLICY_ASSISTANT_ROOT") {
        return root;
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join("config.yml").is_file() {
        manifest_dir
    } else {
        env::current_dir().unwrap_or(manifest_dir)
    }
}

/// Debug builds keep the database next to the checkout so a dev run never
/// touches an installed service's documents.
fn discover_user_data_dir(project_root: &Path) -> PathBuf {
    if let Some(dir) = env_path("POLICY_ASSISTANT_DATA_DIR") {
        return dir;
    }
    if cfg!(debug_assertions) {
        return project_root.to_path_buf();
    }
    platform_data_root().join(if cfg!(target_os = "linux") {
        "policy-assistant"
    } else {
        "PolicyAssistant"
    })
}

fn platform_data_root() -> PathBuf {
    if cfg!(target_os = "windows") {
        return env_path("LOCALAPPDATA")
            .or_else(|| env_path("USERPROFILE"))
            .unwrap_or_else(|| PathBuf::from("."));
    }

    let home = env_path("HOME").unwrap_or_else(|| PathBuf::from("."));
    if cfg!(target_os = "macos") {
        home.join("Library").join("Application Support")
    } else {
        env_path("XDG_DATA_HOME").unwrap_or_else(|| home.join(".local").join("share"))
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
