//! auth watcher: 로그 라인 스트림을 auth 이벤트로 변환
//!
//! 라인마다 [`parse_line`]을 적용하고, 매칭되면
//! `NormalizedEvent { provider: auth, kind, tags: {user}, ... }`를 싱크로 보냅니다.
//! 소스가 에러를 보고하면 로그를 남기고 그 에러를 반환합니다.

use futures_util::{Stream, StreamExt, pin_mut};
use metrics::counter;
use tracing::{error, info};

use loginmon_core::event::{NormalizedEvent, Provider, RawLine};
use loginmon_core::forward::EventSink;
use loginmon_core::metrics as m;

use crate::error::AuthWatcherError;
use crate::parser::{Fingerprints, parse_line};

/// auth 이벤트의 사용자 태그 키
pub const TAG_USER: &str = "user";

/// auth 로그 watcher
#[derive(Debug, Clone, Default)]
pub struct AuthWatcher {
    fingerprints: Fingerprints,
}

impl AuthWatcher {
    pub fn new(fingerprints: Fingerprints) -> Self {
        Self { fingerprints }
    }

    /// 소스가 끝나거나 에러를 보고할 때까지 라인을 처리합니다.
    ///
    /// # Errors
    /// 소스가 보고한 첫 에러. 이 watcher만 멈추며 다른 watcher에는 영향이 없습니다.
    pub async fn run<S, K>(&self, source: S, sink: &K) -> Result<(), AuthWatcherError>
    where
        S: Stream<Item = Result<RawLine, AuthWatcherError>>,
        K: EventSink,
    {
        pin_mut!(source);

        while let Some(item) = source.next().await {
            let line = match item {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, "auth log source failed, stopping auth watcher");
                    return Err(e);
                }
            };

            counter!(m::AUTH_LINES_READ_TOTAL).increment(1);

            if let Some(event) = self.process_line(&line) {
                info!(kind = %event.kind, "{}", event.description);
                sink.emit(event).await;
            }
        }

        info!("auth log source ended");
        Ok(())
    }

    /// 라인 하나를 이벤트로 변환합니다. 매칭되지 않으면 `None`.
    pub fn process_line(&self, line: &RawLine) -> Option<NormalizedEvent> {
        let matched = parse_line(line, &self.fingerprints)?;
        let description = format!("User {} {}", matched.user, matched.kind.verb());

        Some(
            NormalizedEvent::new(
                Provider::Auth,
                matched.kind.as_str(),
                description,
                line.observed_at,
            )
            .with_tag(TAG_USER, matched.user),
        )
    }
}
