//! Job definitions for queue processing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a job.
///
/// Assigned by the producer and passed through verbatim; it is the
/// correlation key across progress events and the stored result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of archive-to-mokuro conversion work, as serialized on
/// the processing queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrJob {
    /// Unique job ID
    pub job_id: JobId,
    /// Volume this job belongs to; never interpreted by the worker
    pub volume_id: String,
    /// Absolute path to the input archive
    pub archive_path: PathBuf,
    /// Absolute path where the mokuro document must be written
    pub output_path: PathBuf,
}

impl OcrJob {
    /// Create a new job.
    pub fn new(
        volume_id: impl Into<String>,
        archive_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            job_id: JobId::new(),
            volume_id: volume_id.into(),
            archive_path: archive_path.into(),
            output_path: output_path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_payload() {
        let payload = r#"{
            "jobId": "j1",
            "volumeId": "v1",
            "archivePath": "/data/uploads/a.cbz",
            "outputPath": "/data/out/a.mokuro"
        }"#;

        let job: OcrJob = serde_json::from_str(payload).expect("decode job");
        assert_eq!(job.job_id.as_str(), "j1");
        assert_eq!(job.volume_id, "v1");
        assert_eq!(job.archive_path, PathBuf::from("/data/uploads/a.cbz"));
        assert_eq!(job.output_path, PathBuf::from("/data/out/a.mokuro"));
    }

    #[test]
    fn serde_roundtrip() {
        let job = OcrJob::new("vol-7", "/uploads/vol7.cbz", "/out/vol7.mokuro");
        let json = serde_json::to_string(&job).expect("serialize job");

        assert!(json.contains("\"jobId\""));
        assert!(json.contains("\"archivePath\""));

        let decoded: OcrJob = serde_json::from_str(&json).expect("deserialize job");
        assert_eq!(decoded.job_id, job.job_id);
        assert_eq!(decoded.volume_id, job.volume_id);
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let err = serde_json::from_str::<OcrJob>("{\"jobId\": \"j1\"}");
        assert!(err.is_err());
    }
}
