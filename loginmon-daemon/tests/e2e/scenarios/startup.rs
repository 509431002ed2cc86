//! Startup probe and fatal startup failures.

use std::sync::Arc;
use std::time::{Duration, Instant};

use loginmon_daemon::orchestrator::{RunExit, probe_store};

use crate::helpers::env::{HOSTNAME, TestEnv};
use crate::helpers::mock_docker::ChannelDockerSource;
use crate::helpers::mock_writer::{PingBehavior, RecordingWriter};

#[tokio::test]
async fn startup_resolves_identity_from_config() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());

    // When
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // Then
    assert_eq!(daemon.identity().hostname(), HOSTNAME);
    assert_eq!(daemon.identity().measurement_base(), "events");
    assert_eq!(daemon.identity().database(), "loginmon");
    assert!(writer.batches().is_empty());
}

#[tokio::test]
async fn unreachable_store_is_fatal() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::with_ping(PingBehavior::Fail));
    let docker = Arc::new(ChannelDockerSource::new());

    // When
    let err = env.start(&writer, &docker).await.err().expect("startup must fail");

    // Then
    assert!(err.to_string().contains("error connecting to influxdb"));
    assert!(writer.batches().is_empty());
}

#[tokio::test]
async fn silent_store_fails_within_startup_timeout() {
    // Given: a store that never answers and a 1s startup bound
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::with_ping(PingBehavior::Hang));
    let docker = Arc::new(ChannelDockerSource::new());

    // When
    let started = Instant::now();
    let err = env.start(&writer, &docker).await.err().expect("startup must fail");

    // Then
    assert!(err.to_string().contains("failed to respond"));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn probe_store_honours_timeout() {
    let writer = RecordingWriter::with_ping(PingBehavior::Hang);
    let err = probe_store(&writer, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to respond"));

    let writer = RecordingWriter::new();
    probe_store(&writer, Duration::from_millis(50))
        .await
        .expect("healthy store");
}

#[tokio::test]
async fn missing_auth_log_is_fatal() {
    // Given
    let mut env = TestEnv::new();
    env.config.auth.log_path = env
        .auth_log
        .with_file_name("does-not-exist.log")
        .display()
        .to_string();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());

    // When
    let err = env.start(&writer, &docker).await.err().expect("startup must fail");

    // Then
    assert!(err.to_string().contains("failed to open auth log"));
}

#[tokio::test]
async fn unreachable_docker_is_fatal() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::unreachable());

    // When
    let err = env.start(&writer, &docker).await.err().expect("startup must fail");

    // Then
    assert!(err.to_string().contains("error connecting to docker"));
    assert!(writer.batches().is_empty());
}

#[tokio::test]
async fn shutdown_stops_idle_watchers() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When: shutdown is requested while both watchers wait for input
    let exit = tokio::time::timeout(
        Duration::from_secs(5),
        daemon.run_until(async { "SIGTERM" }),
    )
    .await
    .expect("run_until must return after shutdown");

    // Then
    assert!(matches!(exit, RunExit::Shutdown("SIGTERM")));
}
