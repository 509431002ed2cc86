//! Container lifecycle events flowing through to the store.

use std::sync::Arc;

use loginmon_core::event::FieldValue;
use loginmon_core::event::RawRuntimeEvent;

use crate::helpers::env::{HOSTNAME, TestEnv, WAIT};
use crate::helpers::events::{container_event, network_event};
use crate::helpers::mock_docker::ChannelDockerSource;
use crate::helpers::mock_writer::RecordingWriter;

#[tokio::test]
async fn container_start_becomes_point() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When: web1 (nginx, compose service web) starts
    docker.send(container_event("start", "web1", "nginx", "web"));
    let waiter = Arc::clone(&writer);
    daemon
        .run_until(async move {
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then
    let points = writer.points();
    assert_eq!(points.len(), 1);

    let point = &points[0];
    assert_eq!(point.measurement(), "dockerEvents");
    assert_eq!(point.tags().len(), 5);
    assert_eq!(point.tag("hostname"), Some(HOSTNAME));
    assert_eq!(point.tag("event"), Some("containerStart"));
    assert_eq!(point.tag("container"), Some("web1"));
    assert_eq!(point.tag("image"), Some("nginx"));
    assert_eq!(point.tag("service"), Some("web"));
    assert_eq!(
        point.field("description"),
        Some(&FieldValue::String("Container web1 started.".to_owned()))
    );
}

#[tokio::test]
async fn only_start_and_die_of_containers_are_recorded() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When: noise around a die event
    docker.send(network_event("connect"));
    docker.send(container_event("pause", "web1", "nginx", "web"));
    docker.send(RawRuntimeEvent::new("image", "start"));
    docker.send(container_event("die", "web1", "nginx", "web"));
    let waiter = Arc::clone(&writer);
    daemon
        .run_until(async move {
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then
    let points = writer.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].tag("event"), Some("containerDie"));
    assert_eq!(
        points[0].field("description"),
        Some(&FieldValue::String("Container web1 died.".to_owned()))
    );
}

#[tokio::test]
async fn container_without_compose_service_omits_tag() {
    // Given
    let env = TestEnv::new();
    let writer = Arc::new(RecordingWriter::new());
    let docker = Arc::new(ChannelDockerSource::new());
    let daemon = env.start(&writer, &docker).await.expect("startup");

    // When
    docker.send(
        RawRuntimeEvent::new("container", "start")
            .with_attribute("name", "adhoc")
            .with_attribute("image", "alpine"),
    );
    let waiter = Arc::clone(&writer);
    daemon
        .run_until(async move {
            waiter.wait_for_points(1, WAIT).await;
            "test"
        })
        .await;

    // Then
    let points = writer.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].tag("container"), Some("adhoc"));
    assert_eq!(points[0].tag("service"), None);
}
