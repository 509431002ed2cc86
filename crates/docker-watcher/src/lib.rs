//! loginmon Docker watcher
//!
//! # 모듈 구성
//!
//! - [`docker`]: Docker 이벤트 API 추상화 (bollard 구현 + 테스트 mock)
//! - [`watcher`]: 런타임 이벤트 → 컨테이너 이벤트 → [`EventSink`](loginmon_core::EventSink)
//! - [`error`]: 도메인 에러 타입

pub mod docker;
pub mod error;
pub mod watcher;

pub use docker::{BollardEventSource, DockerEventSource, EventStream};
pub use error::DockerWatcherError;
pub use watcher::{ContainerAction, DockerWatcher};
