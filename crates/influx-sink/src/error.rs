//! InfluxDB 싱크 에러 타입
//!
//! 쓰기 경로에서는 [`WriteError`]로 변환되어 forwarder까지 전달됩니다.

use loginmon_core::error::{LoginmonError, WriteError};

/// InfluxDB 싱크 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum InfluxError {
    /// HTTP 클라이언트 생성 실패
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// 잘못된 엔드포인트 URL
    #[error("invalid influxdb url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// line protocol 인코딩 실패
    #[error("line protocol encode error: {0}")]
    Encode(String),

    /// 요청 전송 실패
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// 요청 타임아웃
    #[error("request timed out")]
    Timeout,

    /// 서버가 요청을 거부함 (2xx 이외)
    #[error("influxdb responded {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for InfluxError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InfluxError::Timeout
        } else {
            InfluxError::Request(e)
        }
    }
}

impl From<InfluxError> for WriteError {
    fn from(err: InfluxError) -> Self {
        match err {
            InfluxError::Encode(reason) => WriteError::Encode(reason),
            InfluxError::Rejected { status, body } => WriteError::Rejected { status, body },
            other => WriteError::Transport(other.to_string()),
        }
    }
}

impl From<InfluxError> for LoginmonError {
    fn from(err: InfluxError) -> Self {
        LoginmonError::Sink(err.into())
    }
}
