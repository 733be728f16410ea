//! Shared data models for the mokuro worker.
//!
//! This crate provides Serde-serializable types for:
//! - OCR jobs consumed from the queue
//! - Progress events published while a job runs
//! - The durable job result record
//! - The mokuro output document format

pub mod document;
pub mod job;
pub mod progress;
pub mod result;

// Re-export common types
pub use document::{MokuroDocument, MokuroPage, TextBlock};
pub use job::{JobId, OcrJob};
pub use progress::{ProgressEvent, ProgressStatus};
pub use result::JobResult;
