//! Progress event types.
//!
//! These messages keep the wire format of the original progress
//! channel consumers: flat camelCase JSON with a float epoch
//! timestamp.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::JobId;

/// Job status carried by a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// Job is being processed
    Processing,
    /// Job completed successfully
    Completed,
    /// Job failed
    Failed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Processing => "processing",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Failed => "failed",
        }
    }

    /// Terminal statuses end a job's event stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressStatus::Completed | ProgressStatus::Failed)
    }
}

/// A progress update broadcast while a job runs.
///
/// Fire-and-forget: events are published, never persisted. Within one
/// job the `progress` value is non-decreasing until the terminal
/// event, and exactly one terminal event (`completed` at 100 or
/// `failed` at 0) is published, always last.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Job ID
    pub job_id: JobId,
    /// Percent complete, 0-100
    pub progress: u8,
    /// Current status
    pub status: ProgressStatus,
    /// Human-readable message
    pub message: String,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

impl ProgressEvent {
    /// A non-terminal update at the given percentage.
    pub fn processing(job_id: &JobId, progress: u8, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.clone(),
            progress: progress.min(100),
            status: ProgressStatus::Processing,
            message: message.into(),
            timestamp: epoch_now(),
        }
    }

    /// The terminal success event, always at 100.
    pub fn completed(job_id: &JobId, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.clone(),
            progress: 100,
            status: ProgressStatus::Completed,
            message: message.into(),
            timestamp: epoch_now(),
        }
    }

    /// The terminal failure event, progress reset to 0.
    pub fn failed(job_id: &JobId, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.clone(),
            progress: 0,
            status: ProgressStatus::Failed,
            message: message.into(),
            timestamp: epoch_now(),
        }
    }
}

fn epoch_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
