// ABOUTME: Tests for the worker lifecycle: start, stop, failure, and restart
// ABOUTME: Runs real tokio tasks with short poll intervals

use guanaco_core::testing::{self, RecordingTransport, ScriptedGenerator};
use guanaco_core::{Agent, Worker, WorkerError};
use std::sync::Arc;
use std::time::{Duration, Instant};

const FAST: Duration = Duration::from_millis(20);

fn agent_with(transport: Arc<RecordingTransport>) -> Agent {
    Agent::new()
        .with_name("alpha")
        .with_identity(testing::identity("bot-1"))
        .with_transport(transport)
        .with_generator(Arc::new(ScriptedGenerator::new("Hi")))
}

async fn wait_until(mut condition: impl FnMut() -> bool, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

#[tokio::test]
async fn test_worker_is_idle_until_started() {
    let worker = Worker::new(agent_with(Arc::new(RecordingTransport::new())), FAST);
    assert!(!worker.is_running());
    assert_eq!(worker.name(), "alpha");
    assert_eq!(worker.interval(), FAST);
}

#[tokio::test]
async fn test_start_then_stop() {
    let transport = Arc::new(RecordingTransport::new());
    let mut worker = Worker::new(agent_with(transport.clone()), FAST);

    worker.start().unwrap();
    assert!(worker.is_running());

    assert!(wait_until(|| transport.fetch_count() >= 2, Duration::from_secs(2)).await);

    worker.stop().await;
    assert!(!worker.is_running());
    assert!(worker.cycles() >= 2);
    assert!(worker.last_error().is_none());
}

#[tokio::test]
async fn test_double_start_is_rejected() {
    let mut worker = Worker::new(agent_with(Arc::new(RecordingTransport::new())), FAST);

    worker.start().unwrap();
    let err = worker.start().unwrap_err();
    assert_eq!(
        err,
        WorkerError::AlreadyRunning {
            agent: "alpha".into()
        }
    );

    worker.stop().await;
}

#[tokio::test]
async fn test_stop_when_idle_is_a_no_op() {
    let mut worker = Worker::new(agent_with(Arc::new(RecordingTransport::new())), FAST);
    worker.stop().await;
    worker.stop().await;
    assert!(!worker.is_running());
}

#[tokio::test]
async fn test_stop_does_not_wait_out_a_long_interval() {
    let transport = Arc::new(RecordingTransport::new());
    let mut worker = Worker::new(agent_with(transport.clone()), Duration::from_secs(100));

    worker.start().unwrap();
    assert!(wait_until(|| transport.fetch_count() >= 1, Duration::from_secs(2)).await);

    let started = Instant::now();
    worker.stop().await;

    assert!(started.elapsed() < Duration::from_secs(6));
    assert!(!worker.is_running());
}

#[tokio::test]
async fn test_stop_lets_an_in_flight_cycle_finish() {
    let transport = Arc::new(
        RecordingTransport::new()
            .with_channel(testing::channel("1", "General", "Hello", "user-7"))
            .with_fetch_delay(Duration::from_millis(200)),
    );
    let mut worker = Worker::new(agent_with(transport.clone()), Duration::from_secs(100));

    worker.start().unwrap();
    assert!(wait_until(|| transport.fetch_count() >= 1, Duration::from_secs(2)).await);
    worker.stop().await;

    assert_eq!(transport.sent().len(), 1);
    assert_eq!(transport.marked_read(), vec!["1".to_string()]);
}

#[tokio::test]
async fn test_stop_gives_up_after_timeout() {
    let transport = Arc::new(
        RecordingTransport::new().with_fetch_delay(Duration::from_secs(30)),
    );
    let mut worker = Worker::new(agent_with(transport.clone()), FAST)
        .with_stop_timeout(Duration::from_millis(100));

    worker.start().unwrap();
    assert!(wait_until(|| transport.fetch_count() >= 1, Duration::from_secs(2)).await);

    let started = Instant::now();
    worker.stop().await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!worker.is_running());
}

#[tokio::test]
async fn test_agent_failure_ends_the_loop() {
    let transport = Arc::new(RecordingTransport::new().failing_fetch("Unauthorized"));
    let mut worker = Worker::new(agent_with(transport.clone()), FAST);

    worker.start().unwrap();
    assert!(wait_until(|| !worker.is_running(), Duration::from_secs(2)).await);

    // Exactly one attempt, no retries
    tokio::time::sleep(FAST * 3).await;
    assert_eq!(transport.fetch_count(), 1);

    let error = worker.last_error().expect("failure should be recorded");
    assert!(error.contains("Unauthorized"));
    assert_eq!(worker.cycles(), 0);

    worker.stop().await;
}

#[tokio::test]
async fn test_missing_collaborator_ends_the_loop() {
    let agent = Agent::new()
        .with_name("lonely")
        .with_identity(testing::identity("bot-1"));
    let mut worker = Worker::new(agent, FAST);

    worker.start().unwrap();
    assert!(wait_until(|| !worker.is_running(), Duration::from_secs(2)).await);
    assert!(worker
        .last_error()
        .unwrap()
        .contains("chat transport"));
}

#[tokio::test]
async fn test_dead_worker_can_be_started_again() {
    let transport = Arc::new(RecordingTransport::new().failing_fetch("Unauthorized"));
    let mut worker = Worker::new(agent_with(transport.clone()), FAST);

    worker.start().unwrap();
    assert!(wait_until(|| !worker.is_running(), Duration::from_secs(2)).await);

    worker.start().unwrap();
    assert!(wait_until(|| transport.fetch_count() >= 2, Duration::from_secs(2)).await);
    worker.stop().await;
}

#[tokio::test]
async fn test_marked_channel_is_answered_once_across_cycles() {
    let transport = Arc::new(
        RecordingTransport::new().with_channel(testing::channel("1", "General", "Hello", "user-7")),
    );
    let mut worker = Worker::new(agent_with(transport.clone()), FAST);

    worker.start().unwrap();
    assert!(wait_until(|| transport.fetch_count() >= 4, Duration::from_secs(2)).await);
    worker.stop().await;

    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_channel_unread_again_is_answered_on_a_later_cycle() {
    let transport = Arc::new(
        RecordingTransport::new().with_channel(testing::channel("1", "General", "Hello", "user-7")),
    );
    let mut worker = Worker::new(agent_with(transport.clone()), FAST);

    worker.start().unwrap();
    assert!(wait_until(|| transport.marked_read().len() == 1, Duration::from_secs(2)).await);

    transport.push_unread(testing::channel("1", "General", "Still there?", "user-7"));
    assert!(wait_until(|| transport.sent().len() == 2, Duration::from_secs(2)).await);
    worker.stop().await;

    assert_eq!(transport.marked_read(), vec!["1".to_string(), "1".to_string()]);
}

#[tokio::test]
async fn test_custom_name_and_unnamed_default() {
    let worker = Worker::new(Agent::new(), FAST);
    assert_eq!(worker.name(), guanaco_core::agent::UNNAMED_AGENT);

    let worker = Worker::new(Agent::new(), FAST).with_name("agent_3");
    assert_eq!(worker.name(), "agent_3");
}
