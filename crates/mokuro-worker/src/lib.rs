//! Archive OCR processing worker.
//!
//! This crate provides:
//! - The per-job lifecycle controller (extraction, preparation,
//!   delegated OCR, finalization, scratch cleanup)
//! - The queue consumer loop
//! - The OCR engine client and its lazy once-per-process handle

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod runner;
pub mod stager;
pub mod volume;
pub mod workspace;

pub use config::WorkerConfig;
pub use controller::{run_job, ProcessingContext};
pub use engine::{OcrEngine, RemoteOcrEngine};
pub use error::{WorkerError, WorkerResult};
pub use runner::JobRunner;
pub use volume::Volume;
pub use workspace::Workspace;
