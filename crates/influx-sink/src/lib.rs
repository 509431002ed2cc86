//! loginmon InfluxDB 싱크
//!
//! [`InfluxClient`]는 [`PointWriter`](loginmon_core::PointWriter)를 구현하여
//! 정규화된 포인트를 InfluxDB 1.x HTTP API로 기록합니다.
//!
//! - [`client`]: `/ping`, `/write` HTTP 클라이언트
//! - [`line_protocol`]: 포인트 → line protocol 인코더
//! - [`error`]: 도메인 에러 타입

pub mod client;
pub mod error;
pub mod line_protocol;

pub use client::{InfluxClient, InfluxClientConfig};
pub use error::InfluxError;
pub use line_protocol::{encode_batch, encode_point};
