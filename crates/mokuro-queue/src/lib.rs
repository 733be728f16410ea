//! Redis plumbing for the mokuro worker.
//!
//! This crate provides:
//! - Job consumption from a Redis list queue (bounded blocking pop)
//! - Progress events via Redis Pub/Sub
//! - The TTL-bounded job result store

pub mod error;
pub mod progress;
pub mod queue;
pub mod results;

pub use error::{QueueError, QueueResult};
pub use progress::{ProgressChannel, ProgressSink};
pub use queue::{JobQueue, QueueConfig};
pub use results::{ResultStore, RESULT_TTL_SECS};
