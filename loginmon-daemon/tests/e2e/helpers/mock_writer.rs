//! In-memory store writer.
//!
//! Records every batch it accepts and supports failure injection for
//! `write` and `ping`.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use loginmon_core::error::WriteError;
use loginmon_core::event::CanonicalPoint;
use loginmon_core::sink::{PointBatch, PointWriter};

/// How `ping` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingBehavior {
    Ok,
    Fail,
    /// Never answers.
    Hang,
}

pub struct RecordingWriter {
    batches: Mutex<Vec<PointBatch>>,
    failures: Mutex<VecDeque<WriteError>>,
    ping: PingBehavior,
}

#[allow(dead_code)]
impl RecordingWriter {
    pub fn new() -> Self {
        Self::with_ping(PingBehavior::Ok)
    }

    pub fn with_ping(ping: PingBehavior) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            ping,
        }
    }

    /// The next `write` call fails with `err` instead of recording.
    pub fn fail_next(&self, err: WriteError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn batches(&self) -> Vec<PointBatch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn points(&self) -> Vec<CanonicalPoint> {
        self.batches()
            .iter()
            .flat_map(|b| b.points().to_vec())
            .collect()
    }

    pub fn pending_failures(&self) -> usize {
        self.failures.lock().unwrap().len()
    }

    /// Poll until at least `count` points are recorded or `timeout` passes.
    pub async fn wait_for_points(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.points().len() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl PointWriter for RecordingWriter {
    async fn write(&self, batch: PointBatch) -> Result<(), WriteError> {
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.batches.lock().unwrap().push(batch);
        Ok(())
    }

    async fn ping(&self) -> Result<(), WriteError> {
        match self.ping {
            PingBehavior::Ok => Ok(()),
            PingBehavior::Fail => Err(WriteError::Transport("connection refused".to_owned())),
            PingBehavior::Hang => std::future::pending().await,
        }
    }
}
