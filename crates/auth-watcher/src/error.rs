//! auth watcher 에러 타입
//!
//! `From<AuthWatcherError> for LoginmonError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use loginmon_core::error::{LoginmonError, SourceError};

/// auth 로그 소스 이름 (에러/로그 표시용)
pub(crate) const SOURCE_NAME: &str = "auth";

/// auth watcher 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AuthWatcherError {
    /// 로그 파일을 열 수 없음
    #[error("failed to open auth log {path}: {reason}")]
    Open {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 로테이션 이후 새 파일을 다시 열 수 없음
    #[error("failed to reopen auth log {path}: {reason}")]
    Reopen { path: String, reason: String },

    /// 읽기 중 I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AuthWatcherError> for LoginmonError {
    fn from(err: AuthWatcherError) -> Self {
        match err {
            AuthWatcherError::Open { .. } => LoginmonError::Source(SourceError::Open {
                source_name: SOURCE_NAME.to_owned(),
                reason: err.to_string(),
            }),
            other => LoginmonError::Source(SourceError::Terminated {
                source_name: SOURCE_NAME.to_owned(),
                reason: other.to_string(),
            }),
        }
    }
}
