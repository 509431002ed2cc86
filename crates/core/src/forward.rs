//! 이벤트 전달: 정규화 → 쓰기, 이벤트 단위 실패 격리
//!
//! watcher는 [`EventSink`]에만 의존합니다. 데몬에서는 [`EventForwarder`]가
//! 이를 구현하며, 두 watcher가 하나의 forwarder를 `Arc`로 공유합니다.
//!
//! 태그 충돌과 쓰기 실패는 로그와 메트릭으로만 드러나고 호출자에게
//! 전파되지 않습니다. 실패한 이벤트는 버려지고 다음 이벤트 처리는 계속됩니다.

use std::future::Future;
use std::sync::Arc;

use metrics::counter;
use tracing::{debug, error, warn};

use crate::error::{TagConflict, WriteError};
use crate::event::NormalizedEvent;
use crate::identity::ProcessIdentity;
use crate::metrics as m;
use crate::normalize::normalize;
use crate::sink::{PointWriter, SinkWriter};

/// 정규화 이벤트를 받는 쪽
pub trait EventSink: Send + Sync {
    /// 이벤트 하나를 전달합니다. 실패는 구현체 내부에서 처리합니다.
    fn emit(&self, event: NormalizedEvent) -> impl Future<Output = ()> + Send;
}

/// 이벤트 하나를 전달하지 못한 이유
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error(transparent)]
    TagConflict(#[from] TagConflict),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// 정규화 후 저장소에 기록하는 [`EventSink`] 구현
pub struct EventForwarder<W> {
    identity: Arc<ProcessIdentity>,
    writer: SinkWriter<W>,
}

impl<W: PointWriter> EventForwarder<W> {
    pub fn new(identity: Arc<ProcessIdentity>, writer: Arc<W>) -> Self {
        Self {
            identity,
            writer: SinkWriter::new(writer),
        }
    }

    pub fn identity(&self) -> &ProcessIdentity {
        &self.identity
    }

    /// 이벤트를 정규화하고 기록합니다.
    ///
    /// 실패는 로그와 메트릭으로 기록한 뒤 그대로 반환합니다.
    pub async fn forward(&self, event: NormalizedEvent) -> Result<(), ForwardError> {
        let provider = event.provider.as_str();

        let point = match normalize(&self.identity, &event) {
            Ok(point) => point,
            Err(conflict) => {
                warn!(
                    provider,
                    kind = %event.kind,
                    key = %conflict.key,
                    description = %event.description,
                    "dropping event with conflicting tag"
                );
                counter!(m::EVENTS_DROPPED_TOTAL, m::LABEL_REASON => m::REASON_TAG_CONFLICT)
                    .increment(1);
                return Err(conflict.into());
            }
        };

        if let Err(e) = self.writer.write(&self.identity, point).await {
            error!(
                provider,
                kind = %event.kind,
                description = %event.description,
                error = %e,
                "failed to write event, dropping"
            );
            counter!(m::EVENTS_DROPPED_TOTAL, m::LABEL_REASON => m::REASON_WRITE_FAILED)
                .increment(1);
            return Err(e.into());
        }

        debug!(provider, kind = %event.kind, "event written");
        counter!(m::EVENTS_EMITTED_TOTAL, m::LABEL_PROVIDER => provider).increment(1);
        counter!(m::POINTS_WRITTEN_TOTAL).increment(1);
        Ok(())
    }
}

impl<W: PointWriter> EventSink for EventForwarder<W> {
    async fn emit(&self, event: NormalizedEvent) {
        // 실패는 forward 내부에서 이미 기록됨
        let _ = self.forward(event).await;
    }
}
