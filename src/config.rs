//! Runtime settings, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_UPLOAD_PATH: &str = "/api/upload";
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

pub const API_URL_VAR: &str = "REPORT_API_URL";
pub const UPLOAD_PATH_VAR: &str = "REPORT_UPLOAD_PATH";
pub const HEALTH_TIMEOUT_VAR: &str = "REPORT_HEALTH_TIMEOUT_SECS";
pub const DOWNLOAD_DIR_VAR: &str = "REPORT_DOWNLOAD_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Service root, without a trailing slash.
    pub api_base_url: String,
    pub upload_path: String,
    pub health_timeout: Duration,
    /// Save reports here directly instead of asking for a location.
    pub download_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
            download_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = value(API_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let upload_path = value(UPLOAD_PATH_VAR)
            .map(|path| {
                if path.starts_with('/') {
                    path
                } else {
                    format!("/{}", path)
                }
            })
            .unwrap_or(defaults.upload_path);

        let health_timeout = match value(HEALTH_TIMEOUT_VAR) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "Ignoring invalid {}={:?}, using {}s",
                        HEALTH_TIMEOUT_VAR,
                        raw,
                        DEFAULT_HEALTH_TIMEOUT_SECS
                    );
                    defaults.health_timeout
                }
            },
            None => defaults.health_timeout,
        };

        let download_dir = value(DOWNLOAD_DIR_VAR).map(PathBuf::from);

        Self {
            api_base_url,
            upload_path,
            health_timeout,
            download_dir,
        }
    }
}
