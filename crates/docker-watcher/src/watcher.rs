//! Docker watcher: 런타임 이벤트 스트림을 컨테이너 이벤트로 변환
//!
//! # 필터
//! - 범주가 `container`가 아니면 로그를 남기고 건너뜁니다.
//! - 액션 `start` → `containerStart`, `die` → `containerDie`, 그 외는 조용히 건너뜁니다.
//!
//! # 태그
//! | 속성 | 태그 |
//! |---|---|
//! | `com.docker.compose.service` | `service` (없으면 생략) |
//! | `name` | `container` |
//! | `image` | `image` |

use futures_util::{Stream, StreamExt, pin_mut};
use metrics::counter;
use tracing::{debug, error, info};

use loginmon_core::event::{NormalizedEvent, Provider, RawRuntimeEvent};
use loginmon_core::forward::EventSink;
use loginmon_core::metrics as m;

use crate::error::DockerWatcherError;

/// 감시 대상 이벤트 범주
pub const CATEGORY_CONTAINER: &str = "container";

/// compose 서비스 이름 속성
pub const ATTR_SERVICE: &str = "com.docker.compose.service";
/// 컨테이너 이름 속성
pub const ATTR_NAME: &str = "name";
/// 이미지 속성
pub const ATTR_IMAGE: &str = "image";

pub const TAG_SERVICE: &str = "service";
pub const TAG_CONTAINER: &str = "container";
pub const TAG_IMAGE: &str = "image";

/// 이름 속성이 없을 때 설명에 쓰는 값
const UNKNOWN_CONTAINER: &str = "<unknown>";

/// 기록 대상 컨테이너 액션
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    Start,
    Die,
}

impl ContainerAction {
    /// 런타임 액션 문자열을 매핑합니다. 대상이 아니면 `None`.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "start" => Some(Self::Start),
            "die" => Some(Self::Die),
            _ => None,
        }
    }

    /// `event` 태그 값
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start => "containerStart",
            Self::Die => "containerDie",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Die => "died",
        }
    }
}

/// Docker 이벤트 watcher
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerWatcher;

impl DockerWatcher {
    pub fn new() -> Self {
        Self
    }

    /// 소스가 끝나거나 에러를 보고할 때까지 이벤트를 처리합니다.
    ///
    /// # Errors
    /// 소스가 보고한 첫 에러. 이 watcher만 멈춥니다.
    pub async fn run<S, K>(&self, source: S, sink: &K) -> Result<(), DockerWatcherError>
    where
        S: Stream<Item = Result<RawRuntimeEvent, DockerWatcherError>>,
        K: EventSink,
    {
        pin_mut!(source);

        while let Some(item) = source.next().await {
            let raw = match item {
                Ok(raw) => raw,
                Err(e) => {
                    error!(error = %e, "docker event stream failed, stopping docker watcher");
                    return Err(e);
                }
            };

            if let Some(event) = self.process_event(&raw) {
                info!(kind = %event.kind, "{}", event.description);
                sink.emit(event).await;
            }
        }

        info!("docker event stream ended");
        Ok(())
    }

    /// 이벤트 하나를 변환합니다. 대상이 아니면 `None`.
    pub fn process_event(&self, raw: &RawRuntimeEvent) -> Option<NormalizedEvent> {
        if raw.category != CATEGORY_CONTAINER {
            debug!(category = %raw.category, action = %raw.action, "received non-container event, skipping");
            counter!(m::DOCKER_EVENTS_SKIPPED_TOTAL).increment(1);
            return None;
        }

        let Some(action) = ContainerAction::from_action(&raw.action) else {
            counter!(m::DOCKER_EVENTS_SKIPPED_TOTAL).increment(1);
            return None;
        };

        let name = non_empty(raw.attribute(ATTR_NAME));
        let description = format!(
            "Container {} {}.",
            name.unwrap_or(UNKNOWN_CONTAINER),
            action.verb()
        );

        let mut event =
            NormalizedEvent::new(Provider::Docker, action.kind(), description, raw.timestamp);

        for (tag, value) in [
            (TAG_CONTAINER, name),
            (TAG_IMAGE, non_empty(raw.attribute(ATTR_IMAGE))),
            (TAG_SERVICE, non_empty(raw.attribute(ATTR_SERVICE))),
        ] {
            if let Some(value) = value {
                event = event.with_tag(tag, value);
            }
        }

        Some(event)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
