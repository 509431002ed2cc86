//! Docker watcher 에러 타입
//!
//! `From<DockerWatcherError> for LoginmonError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use loginmon_core::error::{LoginmonError, SourceError};

/// Docker 이벤트 소스 이름 (에러/로그 표시용)
pub(crate) const SOURCE_NAME: &str = "docker";

/// Docker watcher 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum DockerWatcherError {
    /// Docker 소켓 연결 실패
    #[error("docker connection error: {0}")]
    Connection(String),

    /// Docker API 호출 실패 (ping 등)
    #[error("docker api error: {0}")]
    Api(String),

    /// 이벤트 스트림 에러
    #[error("docker event stream error: {0}")]
    Stream(String),
}

impl From<DockerWatcherError> for LoginmonError {
    fn from(err: DockerWatcherError) -> Self {
        match err {
            DockerWatcherError::Stream(_) => LoginmonError::Source(SourceError::Terminated {
                source_name: SOURCE_NAME.to_owned(),
                reason: err.to_string(),
            }),
            other => LoginmonError::Source(SourceError::Open {
                source_name: SOURCE_NAME.to_owned(),
                reason: other.to_string(),
            }),
        }
    }
}
