//! 이벤트 스키마: 두 소스가 공유하는 정규화 이벤트와 저장용 포인트
//!
//! 흐름:
//! ```text
//! RawLine ─────────┐
//!                  ├─> NormalizedEvent ─> (normalize) ─> CanonicalPoint ─> sink
//! RawRuntimeEvent ─┘
//! ```
//!
//! [`NormalizedEvent`]는 watcher가 생성하고, [`CanonicalPoint`]는
//! 정규화 단계에서만 생성됩니다. 둘 다 한 번 쓰이고 버려집니다.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::SystemTime;

// --- 예약 태그 / 필드 키 ---

/// 호스트 식별 태그 (정규화 단계에서만 주입)
pub const TAG_HOSTNAME: &str = "hostname";
/// 이벤트 종류 태그 (정규화 단계에서만 주입)
pub const TAG_EVENT: &str = "event";
/// 이벤트가 직접 지정할 수 없는 태그 키
pub const RESERVED_TAGS: [&str; 2] = [TAG_HOSTNAME, TAG_EVENT];
/// 사람이 읽는 설명 필드
pub const FIELD_DESCRIPTION: &str = "description";

/// 이벤트 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// PAM 인증 로그
    Auth,
    /// 컨테이너 런타임 이벤트
    Docker,
}

impl Provider {
    /// measurement 접두어로 쓰이는 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Docker => "docker",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 로그 파일에서 읽은 한 줄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 줄바꿈이 제거된 원문
    pub text: String,
    /// 라인을 읽은 시각
    pub observed_at: SystemTime,
}

impl RawLine {
    /// 현재 시각으로 라인을 생성합니다.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_time(text, SystemTime::now())
    }

    /// 관측 시각을 지정하여 라인을 생성합니다.
    pub fn with_time(text: impl Into<String>, observed_at: SystemTime) -> Self {
        Self {
            text: text.into(),
            observed_at,
        }
    }
}

/// 컨테이너 런타임이 보고한 원시 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRuntimeEvent {
    /// 이벤트 범주 (container, image, network, ...)
    pub category: String,
    /// 액션 (start, die, exec_create, ...)
    pub action: String,
    /// actor 속성 맵
    pub attributes: HashMap<String, String>,
    /// 이벤트 발생 시각
    pub timestamp: SystemTime,
}

impl RawRuntimeEvent {
    /// 속성 없이 현재 시각으로 이벤트를 생성합니다.
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            attributes: HashMap::new(),
            timestamp: SystemTime::now(),
        }
    }

    /// 속성을 추가합니다.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// 발생 시각을 설정합니다.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// 속성 값을 조회합니다.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// 출처와 무관한 정규화 이벤트
///
/// `tags`에는 이벤트 고유 태그만 담깁니다. `hostname`과 `event`는
/// [`normalize`](crate::normalize::normalize)가 주입하며, 이벤트가 이 키를
/// 가지고 있으면 정규화가 [`TagConflict`](crate::error::TagConflict)로 실패합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    /// 이벤트 출처
    pub provider: Provider,
    /// 이벤트 종류 (login, logout, containerStart, containerDie)
    pub kind: String,
    /// 이벤트 고유 태그
    pub tags: BTreeMap<String, String>,
    /// 사람이 읽는 설명
    pub description: String,
    /// 이벤트 시각
    pub timestamp: SystemTime,
}

impl NormalizedEvent {
    /// 태그 없는 이벤트를 생성합니다.
    pub fn new(
        provider: Provider,
        kind: impl Into<String>,
        description: impl Into<String>,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            provider,
            kind: kind.into(),
            tags: BTreeMap::new(),
            description: description.into(),
            timestamp,
        }
    }

    /// 태그를 추가합니다. 같은 키가 이미 있으면 덮어씁니다.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// 태그 값을 조회합니다.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

impl fmt::Display for NormalizedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.provider, self.kind, self.description)
    }
}

/// 포인트 필드 값
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// 저장 직전의 완전한 시계열 레코드
///
/// 생성 후에는 변경할 수 없습니다. 태그와 필드는 키 순으로 정렬되어 있습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalPoint {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    timestamp: SystemTime,
}

impl CanonicalPoint {
    /// 새 포인트를 생성합니다.
    pub fn new(
        measurement: impl Into<String>,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, FieldValue>,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            measurement: measurement.into(),
            tags,
            fields,
            timestamp,
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// 태그 값을 조회합니다.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// 필드 값을 조회합니다.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}
