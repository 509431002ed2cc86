//! Failures that drop a single event or stop a single watcher.

use std::sync::Arc;
use std::time::SystemTime;

use loginmon_core::error::WriteError;
use loginmon_core::event::{NormalizedEvent, Provider};
use loginmon_core::forward::{EventForwarder, ForwardError};
use loginmon_core::identity::ProcessIdentity;
use loginmon_docker_watcher::DockerWatcherError;

use crate::helpers::env::{HOSTNAME, TestEnv, WAIT};
use crate::helpers::events::{SSH_LOGIN_ALICE, SSH_LOGOUT_BOB, container_event};
use crate::helpers::mock_docker::ChannelDockerSource;
use crate::helpers::mock_writer::RecordingWriter;

#[tokio::test]
async fn failed_write_does_not_block_next_event() {
    // Given: the store rejects the next write
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    writer.fail_next(WriteError::Rejected {
        status: 500,
        body: "timeout".to_owned(),
    });
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When: two events arrive
    env.append(SSH_LOGIN_ALICE);
    env.append(SSH_LOGOUT_BOB);
    let waiter = Arc::clone(&writer);
    daemon
        .run_until(async move {
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then: the first was dropped, the second written
    assert_eq!(writer.pending_failures(), 0);
    let points = writer.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].tag("user"), Some("bob"));
}

#[tokio::test]
async fn docker_stream_error_leaves_auth_watcher_running() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When: the docker stream fails, later an auth line arrives
    docker.send_error(DockerWatcherError::Stream("connection reset".to_owned()));
    docker.send(container_event("start", "web1", "nginx", "web"));

    let waiter = Arc::clone(&writer);
    let auth_log = env.auth_log.clone();
    daemon
        .run_until(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            append_line(&auth_log, SSH_LOGIN_ALICE);
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then: the auth event was recorded, the container event after the error was not
    let points = writer.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].tag("event"), Some("login"));
}

#[tokio::test]
async fn docker_stream_end_leaves_auth_watcher_running() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When
    docker.close();
    env.append(SSH_LOGOUT_BOB);
    let waiter = Arc::clone(&writer);
    daemon
        .run_until(async move {
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then
    assert_eq!(writer.points().len(), 1);
}

#[tokio::test]
async fn reserved_tag_conflict_writes_nothing() {
    // Given
    let writer = Arc::new(RecordingWriter::new());
    let identity = Arc::new(ProcessIdentity::new(HOSTNAME, "events", "loginmon"));
    let forwarder = EventForwarder::new(identity, Arc::clone(&writer));

    // When: an event tries to override the hostname tag
    let event = NormalizedEvent::new(Provider::Auth, "login", "spoofed", SystemTime::now())
        .with_tag("hostname", "elsewhere");
    let result = forwarder.forward(event).await;

    // Then
    assert!(matches!(result, Err(ForwardError::TagConflict(_))));
    assert!(writer.batches().is_empty());
}

fn append_line(path: &std::path::Path, line: &str) {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .expect("open auth log");
    writeln!(file, "{line}").expect("append auth log");
}
