//! Queue consumer loop.

use tokio::sync::watch;
use tracing::{error, info};

use mokuro_models::OcrJob;
use mokuro_queue::{JobQueue, ResultStore};

use crate::controller::{self, ProcessingContext};

/// The process-wide driver: pops jobs one at a time, runs each to
/// its terminal outcome, and persists the result. Runs until the
/// shutdown signal flips; an in-flight job is finished first.
pub struct JobRunner {
    queue: JobQueue,
    results: ResultStore,
    ctx: ProcessingContext,
}

impl JobRunner {
    /// Create a new runner.
    pub fn new(queue: JobQueue, results: ResultStore, ctx: ProcessingContext) -> Self {
        Self {
            queue,
            results,
            ctx,
        }
    }

    /// Consume jobs until shutdown is signalled.
    ///
    /// The queue poll blocks with a bounded timeout, so an idle loop
    /// notices shutdown within one poll interval. Errors inside an
    /// iteration are logged and followed by a short backoff — after
    /// startup, nothing here is fatal.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Listening for jobs on queue: {}",
            self.queue.config().queue_name
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutting down worker...");
                        break;
                    }
                }
                popped = self.queue.pop_job(self.ctx.config.poll_timeout) => {
                    match popped {
                        Ok(Some(job)) => self.handle_job(job).await,
                        // Idle poll timeout, or a malformed payload
                        // that was logged and skipped.
                        Ok(None) => {}
                        Err(e) => {
                            error!("Error in job loop: {}", e);
                            tokio::time::sleep(self.ctx.config.error_backoff).await;
                        }
                    }
                }
            }
        }
    }

    /// Run one job and persist its result, whatever the outcome.
    async fn handle_job(&self, job: OcrJob) {
        info!("Received job: {}", job.job_id);

        let result = controller::run_job(&self.ctx, &job).await;

        if let Err(e) = self.results.store(&result).await {
            error!("Failed to store result for job {}: {}", job.job_id, e);
            tokio::time::sleep(self.ctx.config.error_backoff).await;
        }
    }
}
