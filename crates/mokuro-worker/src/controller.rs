//! Per-job lifecycle controller.
//!
//! Drives one job through extraction, preparation, delegated OCR and
//! finalization, publishing a progress checkpoint at each stage.
//! Every outcome — success or any failure — is folded into exactly
//! one [`JobResult`] and exactly one terminal progress event;
//! nothing escapes the [`run_job`] boundary. The scratch workspace
//! is removed on every exit path.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use mokuro_models::{JobResult, MokuroDocument, OcrJob, ProgressEvent};
use mokuro_queue::ProgressSink;

use crate::config::WorkerConfig;
use crate::engine::{OcrEngine, RemoteOcrEngine};
use crate::error::{WorkerError, WorkerResult};
use crate::stager;
use crate::volume::Volume;
use crate::workspace::Workspace;

/// Long-lived state shared by all jobs a worker processes: the
/// configuration, the progress sink, and the once-initialized OCR
/// engine handle. Owned by the process entry point and passed by
/// reference into each job.
pub struct ProcessingContext {
    pub config: WorkerConfig,
    pub progress: Arc<dyn ProgressSink>,
    engine: OnceCell<Arc<dyn OcrEngine>>,
}

impl ProcessingContext {
    /// Create a context whose engine is constructed lazily on the
    /// first job that needs it.
    pub fn new(config: WorkerConfig, progress: Arc<dyn ProgressSink>) -> Self {
        Self {
            config,
            progress,
            engine: OnceCell::new(),
        }
    }

    /// Create a context with a pre-built engine.
    pub fn with_engine(
        config: WorkerConfig,
        progress: Arc<dyn ProgressSink>,
        engine: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            config,
            progress,
            engine: OnceCell::new_with(Some(engine)),
        }
    }

    /// The engine handle, constructing it if this is the first use.
    ///
    /// Construction runs at most once per process even if callers
    /// were ever made concurrent; a failed construction fails the
    /// current job and is attempted again on the next.
    pub async fn engine(&self) -> WorkerResult<&Arc<dyn OcrEngine>> {
        self.engine
            .get_or_try_init(|| async {
                let engine = RemoteOcrEngine::connect(&self.config).await?;
                Ok(Arc::new(engine) as Arc<dyn OcrEngine>)
            })
            .await
    }
}

/// Process one job to its terminal outcome.
pub async fn run_job(ctx: &ProcessingContext, job: &OcrJob) -> JobResult {
    info!("Processing job {}: volume {}", job.job_id, job.volume_id);
    publish(ctx, ProgressEvent::processing(&job.job_id, 0, "Starting archive extraction...")).await;

    let workspace = match Workspace::create(&ctx.config.temp_dir, &job.job_id).await {
        Ok(workspace) => workspace,
        Err(e) => return fail(ctx, job, e).await,
    };

    let outcome = execute(ctx, job, &workspace).await;
    workspace.cleanup().await;

    match outcome {
        Ok(document) => {
            info!("Successfully processed job {}", job.job_id);
            publish(ctx, ProgressEvent::completed(&job.job_id, "Processing complete!")).await;
            JobResult::success(job, document.page_count(), document)
        }
        Err(e) => fail(ctx, job, e).await,
    }
}

/// The fallible stage pipeline. Any error here short-circuits every
/// later stage; the caller owns workspace cleanup and the terminal
/// event.
async fn execute(
    ctx: &ProcessingContext,
    job: &OcrJob,
    workspace: &Workspace,
) -> WorkerResult<MokuroDocument> {
    // Extracting
    publish(ctx, ProgressEvent::processing(&job.job_id, 10, "Extracting archive...")).await;
    let staged = stager::stage(&job.archive_path, &workspace.extracted_dir()).await?;
    debug!("Staged {} page images for job {}", staged.len(), job.job_id);

    // Preparing
    publish(ctx, ProgressEvent::processing(&job.job_id, 20, "Preparing volume for OCR...")).await;
    let fallback_title = job
        .archive_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| job.volume_id.clone());
    let volume = Volume::from_staged(&workspace.extracted_dir(), &fallback_title)?;

    // Processing
    publish(
        ctx,
        ProgressEvent::processing(&job.job_id, 30, "Running OCR (this may take a while)..."),
    )
    .await;
    let engine = ctx.engine().await?;
    engine.process(&volume, &job.output_path).await?;

    // Finalizing
    publish(ctx, ProgressEvent::processing(&job.job_id, 90, "Finalizing...")).await;
    finalize(&job.output_path).await
}

/// Verify the delegate honored its contract and read the result back.
///
/// The engine guarantees the document exists on success, but the
/// check stays: a missing file here is a contract violation we report
/// as a job failure, not a panic.
async fn finalize(output_path: &std::path::Path) -> WorkerResult<MokuroDocument> {
    let exists = tokio::fs::try_exists(output_path).await.unwrap_or(false);
    if !exists {
        return Err(WorkerError::MissingOutput(output_path.to_path_buf()));
    }

    let raw = tokio::fs::read_to_string(output_path).await?;
    let document: MokuroDocument = serde_json::from_str(&raw)?;
    Ok(document)
}

async fn fail(ctx: &ProcessingContext, job: &OcrJob, e: WorkerError) -> JobResult {
    error!("Error processing job {}: {}", job.job_id, e);
    publish(ctx, ProgressEvent::failed(&job.job_id, format!("Error: {}", e))).await;
    JobResult::failure(job, e.to_string())
}

/// Publish an event, logging (not escalating) failures: a broken
/// progress channel must never fail the job itself.
async fn publish(ctx: &ProcessingContext, event: ProgressEvent) {
    if let Err(e) = ctx.progress.publish(event).await {
        warn!("Failed to publish progress: {}", e);
    }
}
