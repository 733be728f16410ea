//! OCR engine delegate.
//!
//! The engine itself is an external sidecar service sharing this
//! worker's filesystem; this module wraps it behind a single
//! operation: consume a volume's page images, produce a mokuro
//! document at a target path. Model loading happens once per process
//! (see [`crate::controller::ProcessingContext`]); per-job calls are
//! synchronous from the worker's point of view and have no timeout —
//! OCR over a large volume runs as long as it runs.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use mokuro_models::{MokuroDocument, MokuroPage, TextBlock};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::volume::Volume;

/// Version string stamped into generated documents.
const OUTPUT_FORMAT_VERSION: &str = "0.2.1";

/// The delegated OCR capability.
///
/// `process` must not retry internally; retry policy belongs to the
/// caller. On success the document exists at `output_path`, complete
/// and parseable; on failure nothing is left there.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn process(&self, volume: &Volume, output_path: &Path) -> WorkerResult<()>;
}

/// Client for the manga-OCR sidecar service.
pub struct RemoteOcrEngine {
    http: Client,
    base_url: String,
    ignore_page_errors: bool,
}

#[derive(Debug, Serialize)]
struct LoadModelRequest<'a> {
    model: &'a str,
    force_cpu: bool,
}

#[derive(Debug, Serialize)]
struct OcrRequest {
    pages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    pages: Vec<OcrPageResult>,
}

#[derive(Debug, Deserialize)]
struct OcrPageResult {
    #[serde(default)]
    img_width: u32,
    #[serde(default)]
    img_height: u32,
    #[serde(default)]
    blocks: Vec<TextBlock>,
    /// Set when detection failed for this page
    #[serde(default)]
    error: Option<String>,
}

impl RemoteOcrEngine {
    /// Connect to the sidecar and load the configured model.
    ///
    /// This is the expensive step (model weights, device setup) and
    /// is performed at most once per worker process.
    pub async fn connect(config: &WorkerConfig) -> WorkerResult<Self> {
        // No request timeout: OCR duration is unbounded by design.
        let http = Client::builder()
            .build()
            .map_err(|e| WorkerError::config(format!("failed to build HTTP client: {e}")))?;

        let base_url = config.ocr_service_url.trim_end_matches('/').to_string();

        info!("Loading OCR model: {}", config.model);
        http.post(format!("{base_url}/models/load"))
            .json(&LoadModelRequest {
                model: &config.model,
                force_cpu: config.force_cpu,
            })
            .send()
            .await
            .map_err(|e| WorkerError::engine_processing(format!("model load failed: {e}")))?
            .error_for_status()
            .map_err(|e| WorkerError::engine_processing(format!("model load failed: {e}")))?;

        Ok(Self {
            http,
            base_url,
            ignore_page_errors: config.ignore_page_errors,
        })
    }
}

#[async_trait]
impl OcrEngine for RemoteOcrEngine {
    async fn process(&self, volume: &Volume, output_path: &Path) -> WorkerResult<()> {
        let request = OcrRequest {
            pages: volume
                .pages
                .iter()
                .map(|page| page.display().to_string())
                .collect(),
        };

        let response: OcrResponse = self
            .http
            .post(format!("{}/ocr", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| WorkerError::engine_processing(e.to_string()))?
            .error_for_status()
            .map_err(|e| WorkerError::engine_processing(e.to_string()))?
            .json()
            .await
            .map_err(|e| WorkerError::engine_processing(format!("invalid engine response: {e}")))?;

        if response.pages.len() != volume.pages.len() {
            return Err(WorkerError::engine_processing(format!(
                "engine returned {} pages for {} inputs",
                response.pages.len(),
                volume.pages.len()
            )));
        }

        let document = self.build_document(volume, response)?;
        write_document(&document, output_path).await
    }
}

impl RemoteOcrEngine {
    fn build_document(&self, volume: &Volume, response: OcrResponse) -> WorkerResult<MokuroDocument> {
        let mut pages = Vec::with_capacity(response.pages.len());

        for (source, result) in volume.pages.iter().zip(response.pages) {
            if let Some(error) = result.error {
                if !self.ignore_page_errors {
                    return Err(WorkerError::engine_processing(format!(
                        "OCR failed on {}: {}",
                        source.display(),
                        error
                    )));
                }
                warn!("Skipping page {}: {}", source.display(), error);
                continue;
            }

            let img_path = source
                .strip_prefix(&volume.root)
                .unwrap_or(source)
                .display()
                .to_string();

            pages.push(MokuroPage {
                img_width: result.img_width,
                img_height: result.img_height,
                img_path,
                blocks: result.blocks,
            });
        }

        Ok(MokuroDocument {
            version: OUTPUT_FORMAT_VERSION.to_string(),
            title: Some(volume.title.clone()),
            title_uuid: Some(Uuid::new_v4().to_string()),
            volume: Some(volume.title.clone()),
            volume_uuid: Some(Uuid::new_v4().to_string()),
            pages,
        })
    }
}

/// Write the document so the output is never observable half-done:
/// serialize to a sibling temp file, then rename into place.
async fn write_document(document: &MokuroDocument, output_path: &Path) -> WorkerResult<()> {
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let staging_path = output_path.with_extension("mokuro.tmp");
    let payload = serde_json::to_vec(document)?;

    tokio::fs::write(&staging_path, payload).await?;
    tokio::fs::rename(&staging_path, output_path).await?;
    Ok(())
}
