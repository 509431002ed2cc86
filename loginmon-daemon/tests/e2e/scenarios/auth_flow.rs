//! Auth log lines flowing through to the store.

use std::sync::Arc;

use loginmon_core::event::FieldValue;
use loginmon_daemon::orchestrator::RunExit;

use crate::helpers::env::{HOSTNAME, TestEnv, WAIT};
use crate::helpers::events::{CRON_NOISE, SSH_LOGIN_ALICE, SSH_LOGOUT_BOB};
use crate::helpers::mock_docker::ChannelDockerSource;
use crate::helpers::mock_writer::RecordingWriter;

#[tokio::test]
async fn ssh_login_becomes_login_point() {
    // Given: a started daemon tailing an empty auth log
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When: sshd logs a session open for alice
    env.append(SSH_LOGIN_ALICE);
    let waiter = Arc::clone(&writer);
    let exit = daemon
        .run_until(async move {
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then: one login point with the reserved tags and the user tag
    assert!(matches!(exit, RunExit::Shutdown("test")));

    let batches = writer.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].database(), "loginmon");

    let point = &batches[0].points()[0];
    assert_eq!(point.measurement(), "authEvents");
    assert_eq!(point.tags().len(), 3);
    assert_eq!(point.tag("hostname"), Some(HOSTNAME));
    assert_eq!(point.tag("event"), Some("login"));
    assert_eq!(point.tag("user"), Some("alice"));
    assert_eq!(
        point.field("description"),
        Some(&FieldValue::String("User alice logged in".to_owned()))
    );
}

#[tokio::test]
async fn unrelated_line_produces_nothing() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When: a cron line, then a logout line behind it
    env.append(CRON_NOISE);
    env.append(SSH_LOGOUT_BOB);
    let waiter = Arc::clone(&writer);
    daemon
        .run_until(async move {
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then: only the logout was written
    let points = writer.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].tag("event"), Some("logout"));
    assert_eq!(points[0].tag("user"), Some("bob"));
}

#[tokio::test]
async fn lines_written_before_startup_are_not_replayed() {
    // Given: history already in the auth log
    let env = TestEnv::new();
    env.append(SSH_LOGIN_ALICE);

    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When: a new logout arrives after startup
    env.append(SSH_LOGOUT_BOB);
    let waiter = Arc::clone(&writer);
    daemon
        .run_until(async move {
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then: only the new line is reported
    let points = writer.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].tag("user"), Some("bob"));
}

#[tokio::test]
async fn measurement_base_is_title_cased() {
    // Given
    let mut env = TestEnv::new();
    env.config.identity.measurement = "ssh sessions".to_owned();
    env.config.identity.database = "audit".to_owned();

    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When
    env.append(SSH_LOGIN_ALICE);
    let waiter = Arc::clone(&writer);
    daemon
        .run_until(async move {
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then
    let batches = writer.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].database(), "audit");
    assert_eq!(batches[0].points()[0].measurement(), "authSsh Sessions");
}
