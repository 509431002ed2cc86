//! 에러 타입: 도메인별 에러 정의

/// loginmon 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LoginmonError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 이벤트 소스 에러 (auth 로그, Docker 이벤트 스트림)
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// 시계열 저장소 쓰기 에러
    #[error("sink error: {0}")]
    Sink(#[from] WriteError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 호스트명 override가 비어 있고 시스템 호스트명도 얻지 못함
    #[error("hostname not provided and system lookup failed: {reason}")]
    HostnameUnavailable { reason: String },
}

/// 이벤트 소스 에러
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// 소스를 열 수 없음 (시작 시점)
    #[error("failed to open source '{source_name}': {reason}")]
    Open { source_name: String, reason: String },

    /// 소스가 복구 불가능한 에러를 보고함
    #[error("source '{source_name}' terminated: {reason}")]
    Terminated { source_name: String, reason: String },
}

/// 이벤트 태그가 예약 태그(`hostname`, `event`)와 충돌함
///
/// 정규화 단계에서 반환되며, 해당 이벤트는 기록되지 않고 버려집니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tag '{key}' conflicts with a reserved tag")]
pub struct TagConflict {
    /// 충돌한 태그 키
    pub key: String,
}

/// 시계열 저장소 쓰기 에러
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// 포인트를 저장소 와이어 포맷으로 인코딩하지 못함
    #[error("encode failed: {0}")]
    Encode(String),

    /// 전송 실패 (연결 거부, 타임아웃 등)
    #[error("transport failed: {0}")]
    Transport(String),

    /// 저장소가 요청을 거부함
    #[error("rejected by store with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
