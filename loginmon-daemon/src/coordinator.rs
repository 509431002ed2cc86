//! Fan-in of concurrently running watchers.
//!
//! [`WatcherSet`] spawns each watcher as its own task and waits for all of
//! them. A watcher that returns early, with or without an error, is logged
//! and the remaining watchers keep running.

use std::collections::HashMap;
use std::future::Future;

use tokio::task::{Id, JoinSet};
use tracing::{error, info, warn};

use loginmon_core::error::{LoginmonError, SourceError};

/// How a single watcher finished.
#[derive(Debug)]
pub struct WatcherOutcome {
    /// Name given at spawn time.
    pub name: String,
    pub result: Result<(), LoginmonError>,
}

impl WatcherOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// A set of named watcher tasks.
#[derive(Default)]
pub struct WatcherSet {
    tasks: JoinSet<WatcherOutcome>,
    names: HashMap<Id, String>,
}

impl WatcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a watcher on the current runtime.
    pub fn spawn<F>(&mut self, name: impl Into<String>, watcher: F)
    where
        F: Future<Output = Result<(), LoginmonError>> + Send + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let handle = self.tasks.spawn(async move {
            let result = watcher.await;
            WatcherOutcome {
                name: task_name,
                result,
            }
        });
        info!(watcher = %name, "watcher started");
        self.names.insert(handle.id(), name);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait until every watcher has returned.
    ///
    /// Outcomes are in completion order. A panicked or cancelled task is
    /// reported as a terminated source under its spawn name.
    pub async fn join_all(&mut self) -> Vec<WatcherOutcome> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());

        while let Some(joined) = self.tasks.join_next_with_id().await {
            let outcome = match joined {
                Ok((id, outcome)) => {
                    self.names.remove(&id);
                    outcome
                }
                Err(join_err) => {
                    let name = self
                        .names
                        .remove(&join_err.id())
                        .unwrap_or_else(|| "unknown".to_owned());
                    WatcherOutcome {
                        result: Err(SourceError::Terminated {
                            source_name: name.clone(),
                            reason: join_err.to_string(),
                        }
                        .into()),
                        name,
                    }
                }
            };

            match &outcome.result {
                Ok(()) => info!(watcher = %outcome.name, "watcher returned"),
                Err(e) => error!(watcher = %outcome.name, error = %e, "watcher stopped with error"),
            }
            if !self.tasks.is_empty() {
                warn!(
                    watcher = %outcome.name,
                    remaining = self.tasks.len(),
                    "other watchers keep running"
                );
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Abort every remaining watcher and wait for them to finish.
    pub async fn shutdown(&mut self) {
        self.tasks.shutdown().await;
        self.names.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    fn terminated(name: &str) -> LoginmonError {
        SourceError::Terminated {
            source_name: name.to_owned(),
            reason: "boom".to_owned(),
        }
        .into()
    }

    #[tokio::test]
    async fn empty_set_joins_immediately() {
        let mut set = WatcherSet::new();
        assert!(set.is_empty());
        assert!(set.join_all().await.is_empty());
    }

    #[tokio::test]
    async fn early_failure_does_not_cancel_others() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let mut set = WatcherSet::new();
        set.spawn("auth", async { Err(terminated("auth")) });
        set.spawn("docker", async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(set.len(), 2);

        let outcomes = set.join_all().await;
        assert_eq!(outcomes.len(), 2);
        assert!(finished.load(Ordering::SeqCst));

        assert_eq!(outcomes[0].name, "auth");
        assert!(!outcomes[0].is_ok());
        assert_eq!(outcomes[1].name, "docker");
        assert!(outcomes[1].is_ok());
    }

    #[tokio::test]
    async fn panicking_watcher_is_reported_by_name() {
        let mut set = WatcherSet::new();
        set.spawn("docker", async { panic!("watcher bug") });
        set.spawn("auth", async { Ok(()) });

        let outcomes = set.join_all().await;
        let docker = outcomes.iter().find(|o| o.name == "docker").unwrap();
        assert!(matches!(
            docker.result,
            Err(LoginmonError::Source(SourceError::Terminated { .. }))
        ));
        assert!(outcomes.iter().any(|o| o.name == "auth" && o.is_ok()));
    }

    #[tokio::test]
    async fn shutdown_aborts_pending_watchers() {
        let mut set = WatcherSet::new();
        set.spawn("forever", std::future::pending());
        set.shutdown().await;
        assert!(set.is_empty());
    }
}
