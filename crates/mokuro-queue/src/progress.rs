//! Progress events via Redis Pub/Sub.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use mokuro_models::ProgressEvent;

use crate::error::QueueResult;
use crate::queue::QueueConfig;

/// Destination for progress events.
///
/// The worker only ever publishes; abstracting the sink keeps the
/// job controller testable without a running Redis server.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Publish one event. Fire-and-forget from the caller's point of
    /// view: a failed publish must never fail the job.
    async fn publish(&self, event: ProgressEvent) -> QueueResult<()>;
}

/// Channel for publishing/subscribing to progress events.
pub struct ProgressChannel {
    client: redis::Client,
    channel: String,
}

impl ProgressChannel {
    /// Create a new progress channel.
    pub fn new(config: &QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url())?;
        Ok(Self {
            client,
            channel: config.progress_channel.clone(),
        })
    }

    /// The channel name events are published to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Subscribe to progress events.
    /// Returns a pinned stream that can be polled with `.next()`.
    pub async fn subscribe(
        &self,
    ) -> QueueResult<std::pin::Pin<Box<dyn futures_util::Stream<Item = ProgressEvent> + Send>>>
    {
        use futures_util::StreamExt;

        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let payload: String = msg.get_payload().ok()?;
            serde_json::from_str(&payload).ok()
        });

        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl ProgressSink for ProgressChannel {
    async fn publish(&self, event: ProgressEvent) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(&event)?;

        debug!(
            "Publishing progress: {} - {}% - {}",
            event.job_id,
            event.progress,
            event.status.as_str()
        );
        conn.publish::<_, _, ()>(&self.channel, payload).await?;

        Ok(())
    }
}
