//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root directory uploaded archives live under
    pub uploads_dir: PathBuf,
    /// Root directory for per-job scratch workspaces
    pub temp_dir: PathBuf,
    /// OCR model identifier loaded by the engine
    pub model: String,
    /// Force CPU inference even when a GPU is available
    pub force_cpu: bool,
    /// Base URL of the OCR engine service
    pub ocr_service_url: String,
    /// When true, pages the engine fails on are skipped instead of
    /// failing the whole job
    pub ignore_page_errors: bool,
    /// Bounded block time for each queue poll; keeps the loop
    /// responsive to shutdown while idle
    pub poll_timeout: Duration,
    /// Delay before retrying after an unexpected loop error
    pub error_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("/data/uploads"),
            temp_dir: PathBuf::from("/data/temp"),
            model: "kha-white/manga-ocr-base".to_string(),
            force_cpu: false,
            ocr_service_url: "http://localhost:8571".to_string(),
            ignore_page_errors: false,
            poll_timeout: Duration::from_secs(5),
            error_backoff: Duration::from_secs(1),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            uploads_dir: std::env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/data/uploads")),
            temp_dir: std::env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/data/temp")),
            model: std::env::var("MOKURO_MODEL")
                .unwrap_or_else(|_| "kha-white/manga-ocr-base".to_string()),
            force_cpu: env_flag("FORCE_CPU"),
            ocr_service_url: std::env::var("OCR_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8571".to_string()),
            ignore_page_errors: env_flag("OCR_IGNORE_ERRORS"),
            poll_timeout: Duration::from_secs(
                std::env::var("WORKER_POLL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            error_backoff: Duration::from_secs(
                std::env::var("WORKER_ERROR_BACKOFF_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1),
            ),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
