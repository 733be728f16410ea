//! Redis integration tests.
//!
//! These run against a live server; start one locally and run with
//! `cargo test -- --ignored`.

use std::time::Duration;

use mokuro_models::{JobResult, OcrJob, ProgressEvent};
use mokuro_queue::{JobQueue, ProgressChannel, ProgressSink, QueueConfig, ResultStore};

fn test_config(queue_name: &str) -> QueueConfig {
    dotenvy::dotenv().ok();
    QueueConfig {
        queue_name: queue_name.to_string(),
        ..QueueConfig::from_env()
    }
}

/// Test Redis connection.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_connection() {
    let queue = JobQueue::new(test_config("mokuro:test:ping")).expect("Failed to create queue");
    queue.ping().await.expect("Failed to ping Redis");

    let len = queue.len().await.expect("Failed to get queue length");
    println!("Queue length: {}", len);
}

/// Test job push and pop cycle.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_job_push_pop() {
    let queue = JobQueue::new(test_config("mokuro:test:pushpop")).expect("Failed to create queue");

    let job = OcrJob::new("vol_test_1", "/data/uploads/a.cbz", "/data/out/a.mokuro");
    let job_id = job.job_id.clone();

    queue.push(&job).await.expect("Failed to push");

    let popped = queue
        .pop_job(Duration::from_secs(1))
        .await
        .expect("Failed to pop")
        .expect("Expected a job");

    assert_eq!(popped.job_id, job_id);
    assert_eq!(popped.volume_id, "vol_test_1");
}

/// Popping an empty queue times out with no job.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_pop_timeout() {
    let queue = JobQueue::new(test_config("mokuro:test:empty")).expect("Failed to create queue");

    let popped = queue
        .pop_job(Duration::from_secs(1))
        .await
        .expect("Failed to pop");
    assert!(popped.is_none());
}

/// A malformed payload is skipped, not an error.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_malformed_payload_skipped() {
    use redis::AsyncCommands;

    let config = test_config("mokuro:test:malformed");
    let queue = JobQueue::new(config.clone()).expect("Failed to create queue");

    let client = redis::Client::open(config.redis_url()).expect("Failed to open client");
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("Failed to connect");
    conn.rpush::<_, _, ()>(&config.queue_name, "{not json")
        .await
        .expect("Failed to push raw payload");

    let popped = queue
        .pop_job(Duration::from_secs(1))
        .await
        .expect("pop should not error on malformed payload");
    assert!(popped.is_none());
}

/// Test result store set/fetch and expiration flag.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_result_store() {
    use redis::AsyncCommands;

    let config = test_config("mokuro:test:results");
    let store = ResultStore::new(&config).expect("Failed to create store");

    let job = OcrJob::new("vol_r1", "/uploads/r.cbz", "/out/r.mokuro");
    let result = JobResult::failure(&job, "no image files found in archive");

    store.store(&result).await.expect("Failed to store");

    let fetched = store
        .fetch(&job.job_id)
        .await
        .expect("Failed to fetch")
        .expect("Expected a stored result");
    assert!(!fetched.success);
    assert_eq!(fetched.error.as_deref(), Some("no image files found in archive"));

    // The entry carries the fixed one-hour expiration.
    let client = redis::Client::open(config.redis_url()).expect("Failed to open client");
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("Failed to connect");
    let ttl: i64 = conn.ttl(store.key(&job.job_id)).await.expect("Failed to read TTL");
    assert!(ttl > 0 && ttl <= 3600);
}

/// Test publish/subscribe round trip on the progress channel.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_progress_publish_subscribe() {
    use futures_util::StreamExt;

    let config = test_config("mokuro:test:progress");
    let channel = ProgressChannel::new(&config).expect("Failed to create channel");

    let mut stream = channel.subscribe().await.expect("Failed to subscribe");

    let job = OcrJob::new("vol_p1", "/uploads/p.cbz", "/out/p.mokuro");
    channel
        .publish(ProgressEvent::processing(&job.job_id, 30, "Running OCR..."))
        .await
        .expect("Failed to publish");

    let event = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("Timed out waiting for event")
        .expect("Stream ended");

    assert_eq!(event.job_id, job.job_id);
    assert_eq!(event.progress, 30);
}
