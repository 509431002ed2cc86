//! Docker event source abstraction for testability.
//!
//! The [`DockerEventSource`] trait abstracts the bollard event API, allowing
//! production code to use [`BollardEventSource`] while tests feed a fixed list
//! of events.
//!
//! # Architecture
//!
//! ```text
//! Docker Daemon ──/events──> BollardEventSource ──RawRuntimeEvent──> DockerWatcher
//! ```
//!
//! # Examples
//!
//! ```ignore
//! use loginmon_docker_watcher::{BollardEventSource, DockerEventSource};
//!
//! let source = BollardEventSource::connect_local()?;
//! source.ping().await?;
//! let events = source.events();
//! # Ok::<(), loginmon_docker_watcher::DockerWatcherError>(())
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use bollard::models::EventMessage;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use loginmon_core::event::RawRuntimeEvent;

use crate::error::DockerWatcherError;

/// Stream of runtime events produced by a [`DockerEventSource`].
pub type EventStream = BoxStream<'static, Result<RawRuntimeEvent, DockerWatcherError>>;

/// Trait abstracting the Docker event API.
///
/// The trait is `Send + Sync + 'static`, allowing the source to be shared
/// across async tasks.
pub trait DockerEventSource: Send + Sync + 'static {
    /// Subscribes to the live event stream.
    ///
    /// The stream is unbounded; it ends only if the daemon closes the
    /// connection, and yields `Err` on transport failures.
    fn events(&self) -> EventStream;

    /// Checks Docker daemon connectivity.
    ///
    /// # Errors
    ///
    /// Returns `DockerWatcherError::Api` if the daemon is unreachable.
    fn ping(&self) -> impl Future<Output = Result<(), DockerWatcherError>> + Send;
}

/// Production event source using `bollard`.
///
/// # Connection Management
///
/// - Connection timeout: 120 seconds
/// - API version: Default (auto-negotiated)
/// - Socket path: `DOCKER_HOST` or the platform default, unless given explicitly
pub struct BollardEventSource {
    docker: Arc<bollard::Docker>,
}

impl BollardEventSource {
    /// Connects to Docker using the local defaults (honours `DOCKER_HOST`).
    ///
    /// # Errors
    ///
    /// Returns `DockerWatcherError::Connection` if the client cannot be built.
    pub fn connect_local() -> Result<Self, DockerWatcherError> {
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            DockerWatcherError::Connection(format!("failed to connect to docker: {e}"))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects to Docker using a specific socket path.
    ///
    /// # Errors
    ///
    /// Returns `DockerWatcherError::Connection` if the client cannot be built.
    pub fn connect_with_socket(socket_path: &str) -> Result<Self, DockerWatcherError> {
        let docker =
            bollard::Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| {
                    DockerWatcherError::Connection(format!(
                        "failed to connect to docker at {socket_path}: {e}"
                    ))
                })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects using `socket` when non-empty, local defaults otherwise.
    pub fn connect(socket: &str) -> Result<Self, DockerWatcherError> {
        if socket.trim().is_empty() {
            Self::connect_local()
        } else {
            Self::connect_with_socket(socket)
        }
    }
}

impl DockerEventSource for BollardEventSource {
    fn events(&self) -> EventStream {
        self.docker
            .events::<String>(None)
            .map(|item| {
                item.map(raw_event_from_message)
                    .map_err(|e| DockerWatcherError::Stream(e.to_string()))
            })
            .boxed()
    }

    async fn ping(&self) -> Result<(), DockerWatcherError> {
        self.docker
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| DockerWatcherError::Api(format!("ping failed: {e}")))
    }
}

/// Converts a bollard event message into a [`RawRuntimeEvent`].
///
/// Missing fields become empty strings. The timestamp prefers `timeNano`,
/// then `time` (seconds), then the current time.
pub fn raw_event_from_message(message: EventMessage) -> RawRuntimeEvent {
    let category = message.typ.map(|t| t.to_string()).unwrap_or_default();
    let action = message.action.unwrap_or_default();
    let attributes: HashMap<String, String> = message
        .actor
        .and_then(|actor| actor.attributes)
        .unwrap_or_default();

    RawRuntimeEvent {
        category,
        action,
        attributes,
        timestamp: event_time(message.time_nano, message.time),
    }
}

fn event_time(time_nano: Option<i64>, time: Option<i64>) -> SystemTime {
    if let Some(nanos) = time_nano.and_then(|n| u64::try_from(n).ok()).filter(|n| *n > 0) {
        return SystemTime::UNIX_EPOCH + Duration::from_nanos(nanos);
    }
    if let Some(secs) = time.and_then(|s| u64::try_from(s).ok()).filter(|s| *s > 0) {
        return SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
    }
    SystemTime::now()
}

/// 테스트용 Mock 이벤트 소스
///
/// 미리 지정한 이벤트 목록을 한 번 내보내고 스트림을 끝냅니다.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MockEventSource {
    events: std::sync::Mutex<Vec<Result<RawRuntimeEvent, DockerWatcherError>>>,
    fail_ping: bool,
}

#[cfg(test)]
impl MockEventSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_events(
        self,
        events: Vec<Result<RawRuntimeEvent, DockerWatcherError>>,
    ) -> Self {
        *self.events.lock().unwrap() = events;
        self
    }

    pub(crate) fn with_failing_ping(mut self) -> Self {
        self.fail_ping = true;
        self
    }
}

#[cfg(test)]
impl DockerEventSource for MockEventSource {
    fn events(&self) -> EventStream {
        let events = std::mem::take(&mut *self.events.lock().unwrap());
        futures_util::stream::iter(events).boxed()
    }

    async fn ping(&self) -> Result<(), DockerWatcherError> {
        if self.fail_ping {
            return Err(DockerWatcherError::Api("mock ping failure".to_owned()));
        }
        Ok(())
    }
}
