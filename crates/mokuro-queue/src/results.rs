//! Keyed job result store.

use redis::AsyncCommands;
use tracing::debug;

use mokuro_models::{JobId, JobResult};

use crate::error::QueueResult;
use crate::queue::QueueConfig;

/// Results expire one hour after the job finishes.
pub const RESULT_TTL_SECS: u64 = 3600;

/// Store for durable, TTL-bounded job results.
pub struct ResultStore {
    client: redis::Client,
    namespace: String,
}

impl ResultStore {
    /// Create a new result store.
    pub fn new(config: &QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url())?;
        Ok(Self {
            client,
            namespace: config.result_namespace.clone(),
        })
    }

    /// Key a result is stored under.
    pub fn key(&self, job_id: &JobId) -> String {
        format!("{}:result:{}", self.namespace, job_id)
    }

    /// Store a result with the fixed expiration.
    ///
    /// Called exactly once per dequeued job, success or failure.
    pub async fn store(&self, result: &JobResult) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(result)?;

        conn.set_ex::<_, _, ()>(self.key(&result.job_id), payload, RESULT_TTL_SECS)
            .await?;

        debug!("Stored result for job {}", result.job_id);
        Ok(())
    }

    /// Fetch a result, if it exists and has not expired.
    pub async fn fetch(&self, job_id: &JobId) -> QueueResult<Option<JobResult>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let payload: Option<String> = conn.get(self.key(job_id)).await?;
        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}
