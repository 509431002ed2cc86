//! 싱크: 시계열 저장소 쓰기 capability와 단일 포인트 writer
//!
//! [`PointWriter`]는 저장소 클라이언트가 구현하는 trait입니다.
//! 실제 구현은 `loginmon-influx-sink`의 `InfluxClient`이고, 테스트에서는
//! 메모리 내 mock을 사용합니다.
//!
//! [`SinkWriter`]는 포인트 하나를 데이터베이스 범위의 단일 포인트 배치로
//! 감싸서 writer에 넘깁니다. 재시도나 버퍼링은 하지 않습니다.

use std::future::Future;
use std::sync::Arc;

use crate::error::WriteError;
use crate::event::CanonicalPoint;
use crate::identity::ProcessIdentity;

/// 하나의 데이터베이스를 대상으로 하는 포인트 묶음
#[derive(Debug, Clone, PartialEq)]
pub struct PointBatch {
    database: String,
    points: Vec<CanonicalPoint>,
}

impl PointBatch {
    /// 빈 배치를 생성합니다.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            points: Vec::new(),
        }
    }

    /// 포인트 하나로 구성된 배치를 생성합니다.
    pub fn single(database: impl Into<String>, point: CanonicalPoint) -> Self {
        let mut batch = Self::new(database);
        batch.push(point);
        batch
    }

    /// 포인트를 추가합니다.
    pub fn push(&mut self, point: CanonicalPoint) {
        self.points.push(point);
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn points(&self) -> &[CanonicalPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 시계열 저장소 쓰기 capability
///
/// 여러 task가 동시에 호출할 수 있어야 합니다 (`Send + Sync + 'static`).
/// 각 호출은 독립적이며 호출 간 순서 보장은 없습니다.
pub trait PointWriter: Send + Sync + 'static {
    /// 배치를 저장소에 기록합니다.
    fn write(&self, batch: PointBatch) -> impl Future<Output = Result<(), WriteError>> + Send;

    /// 저장소 연결을 확인합니다.
    fn ping(&self) -> impl Future<Output = Result<(), WriteError>> + Send;
}

/// 단일 포인트 writer
///
/// 내부 writer를 `Arc`로 공유하므로 clone 비용이 작습니다.
pub struct SinkWriter<W> {
    writer: Arc<W>,
}

impl<W> Clone for SinkWriter<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<W: PointWriter> SinkWriter<W> {
    pub fn new(writer: Arc<W>) -> Self {
        Self { writer }
    }

    /// 포인트를 `identity.database()` 범위의 단일 포인트 배치로 기록합니다.
    pub async fn write(
        &self,
        identity: &ProcessIdentity,
        point: CanonicalPoint,
    ) -> Result<(), WriteError> {
        let batch = PointBatch::single(identity.database(), point);
        self.writer.write(batch).await
    }
}
