//! loginmon 공통 크레이트
//!
//! 두 watcher와 싱크가 공유하는 이벤트 스키마, 정규화, 싱크 trait,
//! 에러, 설정을 정의합니다.

pub mod config;
pub mod error;
pub mod event;
pub mod forward;
pub mod identity;
pub mod metrics;
pub mod normalize;
pub mod sink;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, LoginmonError, SourceError, TagConflict, WriteError};

// 설정
pub use config::LoginmonConfig;

// 이벤트
pub use event::{CanonicalPoint, FieldValue, NormalizedEvent, Provider, RawLine, RawRuntimeEvent};

// 정규화 / 싱크
pub use forward::{EventForwarder, EventSink, ForwardError};
pub use identity::ProcessIdentity;
pub use normalize::normalize;
pub use sink::{PointBatch, PointWriter, SinkWriter};
