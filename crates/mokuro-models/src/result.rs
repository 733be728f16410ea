//! The durable outcome record for one job.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{JobId, MokuroDocument, OcrJob};

/// Job result, written once to the result store with a fixed
/// expiration and never updated.
///
/// Success carries the output location, page count and the full
/// mokuro document; failure carries the error message verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    /// Whether the job succeeded
    pub success: bool,
    /// Job ID
    pub job_id: JobId,
    /// Volume ID, passed through from the job
    pub volume_id: String,
    /// Path of the generated mokuro document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mokuro_path: Option<PathBuf>,
    /// Number of pages in the generated document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    /// The full generated document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mokuro_data: Option<MokuroDocument>,
    /// Error message when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobResult {
    /// Build the success record for a job.
    pub fn success(job: &OcrJob, page_count: usize, document: MokuroDocument) -> Self {
        Self {
            success: true,
            job_id: job.job_id.clone(),
            volume_id: job.volume_id.clone(),
            mokuro_path: Some(job.output_path.clone()),
            page_count: Some(page_count),
            mokuro_data: Some(document),
            error: None,
        }
    }

    /// Build the failure record for a job.
    pub fn failure(job: &OcrJob, error: impl Into<String>) -> Self {
        Self {
            success: false,
            job_id: job.job_id.clone(),
            volume_id: job.volume_id.clone(),
            mokuro_path: None,
            page_count: None,
            mokuro_data: None,
            error: Some(error.into()),
        }
    }
}
