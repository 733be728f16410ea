//! Worker error types.
//!
//! Every variant except startup connectivity is job-local: the job
//! controller folds it into a failed result and the consumer loop
//! carries on.

use std::path::PathBuf;

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("no image files found in archive")]
    EmptyArchive,

    #[error("failed to build volume from extracted archive")]
    NoContentFound,

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("OCR engine error: {0}")]
    EngineProcessing(String),

    #[error("mokuro file was not generated: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Queue error: {0}")]
    Queue(#[from] mokuro_queue::QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkerError {
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn engine_processing(msg: impl Into<String>) -> Self {
        Self::EngineProcessing(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
