use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Backend used when nothing else is configured (the FastAPI dev server).
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "DERMACART_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Base URL of the skincare backend, without the `/api/v1` prefix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub debug: bool,
}

fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> String {
    ".dermacart".into()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            data_dir: default_data_dir(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            debug: false,
        }
    }
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = AppConfig {
        working_dir: wd.clone(),
        ..AppConfig::default()
    };

    // Global config first, project-local config overrides it
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("dermacart").join("config.json");
        if global_path.exists() {
            merge_config(&mut config, read_config_file(&global_path)?);
        }
    }

    let local_path = wd.join("dermacart.json");
    if local_path.exists() {
        merge_config(&mut config, read_config_file(&local_path)?);
    }

    detect_api_url(&mut config);

    tracing::debug!(api = %config.api_base_url, data = %config.data_path().display(), "config loaded");
    Ok(config)
}

fn read_config_file(path: &std::path::Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File(e.to_string()))?;
    serde_json::from_str(&content)
        .map_err(|e| ConfigError::Invalid(format!("{}: {e}", path.display())))
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.data_dir != default_data_dir() {
        base.data_dir = overlay.data_dir;
    }
    if overlay.api_base_url != default_api_base_url() {
        base.api_base_url = overlay.api_base_url;
    }
    if overlay.request_timeout_secs != default_request_timeout_secs() {
        base.request_timeout_secs = overlay.request_timeout_secs;
    }
    if overlay.debug {
        base.debug = true;
    }
}

fn detect_api_url(config: &mut AppConfig) {
    if let Ok(url) = std::env::var(API_URL_ENV) {
        if !url.is_empty() {
            config.api_base_url = url;
        }
    }
}

impl AppConfig {
    /// Tracing filter directive: `debug` when the flag or the config asks for it.
    pub fn log_filter(&self, debug_flag: bool) -> &'static str {
        if debug_flag || self.debug {
            "debug"
        } else {
            "warn"
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.working_dir.join(&self.data_dir)
    }

    /// Versioned API root, e.g. `http://localhost:8000/api/v1`.
    pub fn api_root(&self) -> String {
        format!("{}/api/v1", self.api_base_url.trim_end_matches('/'))
    }
}
