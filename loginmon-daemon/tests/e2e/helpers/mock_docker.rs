//! Channel-backed Docker event source.
//!
//! Tests push events while the daemon runs; closing the channel ends the
//! stream the way a Docker daemon disconnect would.

use std::sync::Mutex;

use futures_util::StreamExt;
use tokio::sync::mpsc;

use loginmon_core::event::RawRuntimeEvent;
use loginmon_docker_watcher::{DockerEventSource, DockerWatcherError, EventStream};

type Item = Result<RawRuntimeEvent, DockerWatcherError>;

pub struct ChannelDockerSource {
    tx: Mutex<Option<mpsc::UnboundedSender<Item>>>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<Item>>>,
    reachable: bool,
}

#[allow(dead_code)]
impl ChannelDockerSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
            reachable: true,
        }
    }

    /// A source whose `ping` fails.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn send(&self, event: RawRuntimeEvent) {
        self.push(Ok(event));
    }

    pub fn send_error(&self, err: DockerWatcherError) {
        self.push(Err(err));
    }

    /// End the event stream.
    pub fn close(&self) {
        self.tx.lock().unwrap().take();
    }

    fn push(&self, item: Item) {
        if let Some(tx) = self.tx.lock().unwrap().as_ref() {
            let _ = tx.send(item);
        }
    }
}

impl DockerEventSource for ChannelDockerSource {
    fn events(&self) -> EventStream {
        match self.rx.lock().unwrap().take() {
            Some(rx) => futures_util::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })
            .boxed(),
            None => futures_util::stream::empty().boxed(),
        }
    }

    async fn ping(&self) -> Result<(), DockerWatcherError> {
        if self.reachable {
            Ok(())
        } else {
            Err(DockerWatcherError::Api(
                "ping failed: connection refused".to_owned(),
            ))
        }
    }
}
