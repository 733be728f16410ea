//! Job queue backed by a Redis list.
//!
//! Producers push JSON-encoded jobs onto a list; each worker pops
//! with a bounded blocking `BLPOP`. The pop is the only cross-worker
//! coordination point: Redis removes the item atomically, so a job
//! is delivered to exactly one worker and is never redelivered.

use std::time::Duration;

use redis::AsyncCommands;
use tracing::{debug, warn};

use mokuro_models::OcrJob;

use crate::error::{QueueError, QueueResult};

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis host
    pub host: String,
    /// Redis port
    pub port: u16,
    /// Redis database index
    pub db: i64,
    /// Redis password, if the server requires one
    pub password: Option<String>,
    /// List name jobs are consumed from
    pub queue_name: String,
    /// Pub/Sub channel progress events are published to
    pub progress_channel: String,
    /// Key namespace for stored job results
    pub result_namespace: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            password: None,
            queue_name: "mokuro:processing".to_string(),
            progress_channel: "mokuro:progress".to_string(),
            result_namespace: "mokuro".to_string(),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("REDIS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6379),
            db: std::env::var("REDIS_DB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            password: std::env::var("REDIS_PASSWORD").ok().filter(|s| !s.is_empty()),
            queue_name: std::env::var("QUEUE_NAME")
                .unwrap_or_else(|_| "mokuro:processing".to_string()),
            progress_channel: std::env::var("PROGRESS_CHANNEL")
                .unwrap_or_else(|_| "mokuro:progress".to_string()),
            result_namespace: std::env::var("RESULT_NAMESPACE")
                .unwrap_or_else(|_| "mokuro".to_string()),
        }
    }

    /// Connection URL built from the host/port/db/password parts.
    pub fn redis_url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Job queue client.
pub struct JobQueue {
    client: redis::Client,
    config: QueueConfig,
}

impl JobQueue {
    /// Create a new job queue client.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    /// The configuration this queue was built with.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Verify the server is reachable.
    ///
    /// Called once at worker startup; an unreachable queue is fatal.
    pub async fn ping(&self) -> QueueResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueError::connection_failed(e.to_string()))?;

        redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| QueueError::connection_failed(e.to_string()))?;

        debug!("Connected to Redis at {}:{}", self.config.host, self.config.port);
        Ok(())
    }

    /// Enqueue a job.
    pub async fn push(&self, job: &OcrJob) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(job)?;

        conn.rpush::<_, _, ()>(&self.config.queue_name, payload)
            .await?;

        debug!("Enqueued job {}", job.job_id);
        Ok(())
    }

    /// Pop one job, blocking up to `timeout`.
    ///
    /// Returns `Ok(None)` when the timeout elapses with an empty
    /// queue, and also when the popped payload fails to decode: the
    /// pop already removed the item, so a malformed message is logged
    /// and skipped rather than redelivered.
    pub async fn pop_job(&self, timeout: Duration) -> QueueResult<Option<OcrJob>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let reply: Option<(String, String)> = conn
            .blpop(&self.config.queue_name, timeout.as_secs_f64())
            .await?;

        let Some((_list, payload)) = reply else {
            return Ok(None);
        };

        match serde_json::from_str::<OcrJob>(&payload) {
            Ok(job) => {
                debug!("Dequeued job {}", job.job_id);
                Ok(Some(job))
            }
            Err(e) => {
                warn!("Discarding malformed job payload: {}", e);
                Ok(None)
            }
        }
    }

    /// Number of jobs waiting in the queue.
    pub async fn len(&self) -> QueueResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.llen(&self.config.queue_name).await?;
        Ok(len)
    }
}
