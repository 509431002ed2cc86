//! loginmon auth watcher
//!
//! # 모듈 구성
//!
//! - [`tail`]: 로테이션을 따라가는 로그 파일 tailer
//! - [`parser`]: PAM 세션 라인에서 로그인/로그아웃과 사용자명 추출
//! - [`watcher`]: 라인 스트림 → auth 이벤트 → [`EventSink`](loginmon_core::EventSink)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! /var/log/auth.log -> FileTailer -> AuthWatcher -> parse_line -> EventSink
//!                      (RawLine)                   (AuthMatch)   (NormalizedEvent)
//! ```

pub mod error;
pub mod parser;
pub mod tail;
pub mod watcher;

pub use error::AuthWatcherError;
pub use parser::{AuthKind, AuthMatch, Fingerprints, parse_line};
pub use tail::{FileTailer, TailConfig};
pub use watcher::AuthWatcher;
