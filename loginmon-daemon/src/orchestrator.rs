//! Startup and lifecycle of the loginmon daemon.
//!
//! # Startup (all fatal, nothing is written before it completes)
//!
//! 1. Resolve the process identity (hostname, measurement base, database)
//! 2. Probe the store with `ping`, bounded by `startup_timeout_secs`
//! 3. Open the auth log (a missing file is fatal)
//! 4. Connect to the Docker daemon and `ping` it
//!
//! # Run
//!
//! Both watchers are spawned into a [`WatcherSet`] sharing one
//! [`EventForwarder`]. The daemon returns once every watcher has returned,
//! or as soon as SIGTERM/SIGINT arrives, in which case the remaining
//! watchers are aborted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use loginmon_auth_watcher::{AuthWatcher, FileTailer, Fingerprints, TailConfig};
use loginmon_core::config::LoginmonConfig;
use loginmon_core::error::LoginmonError;
use loginmon_core::forward::EventForwarder;
use loginmon_core::identity::ProcessIdentity;
use loginmon_core::sink::PointWriter;
use loginmon_docker_watcher::{BollardEventSource, DockerEventSource, DockerWatcher};
use loginmon_influx_sink::{InfluxClient, InfluxClientConfig};

use crate::coordinator::{WatcherOutcome, WatcherSet};
use crate::metrics_server;

/// Watcher name used in logs and outcomes.
pub const AUTH_WATCHER: &str = "auth";
/// Watcher name used in logs and outcomes.
pub const DOCKER_WATCHER: &str = "docker";

/// How [`Orchestrator::run_until`] ended.
#[derive(Debug)]
pub enum RunExit {
    /// Every watcher returned on its own.
    WatchersFinished(Vec<WatcherOutcome>),
    /// Shutdown was requested; remaining watchers were aborted.
    Shutdown(&'static str),
}

/// A fully started daemon, ready to run its watchers.
pub struct Orchestrator<W, D> {
    forwarder: Arc<EventForwarder<W>>,
    tailer: FileTailer,
    docker: Arc<D>,
    fingerprints: Fingerprints,
}

impl Orchestrator<InfluxClient, BollardEventSource> {
    /// Build the production daemon from a validated configuration.
    ///
    /// Installs the metrics recorder when enabled, creates the InfluxDB
    /// client and the Docker connection, then runs [`Orchestrator::start`].
    ///
    /// # Errors
    ///
    /// Returns an error if any startup step fails.
    pub async fn build_from_config(config: &LoginmonConfig) -> Result<Self> {
        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        let client = InfluxClient::new(InfluxClientConfig::from_config(&config.influxdb))
            .map_err(|e| anyhow::anyhow!("failed to create influxdb client: {}", e))?;

        let docker = BollardEventSource::connect(&config.docker.socket)
            .map_err(|e| anyhow::anyhow!("failed to create docker client: {}", e))?;

        Self::start(config, Arc::new(client), Arc::new(docker)).await
    }
}

impl<W: PointWriter, D: DockerEventSource> Orchestrator<W, D> {
    /// Run every startup step against the given store and runtime clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the hostname cannot be resolved, the store does
    /// not answer within the startup timeout, the auth log cannot be
    /// opened, or the Docker daemon is unreachable.
    pub async fn start(config: &LoginmonConfig, writer: Arc<W>, docker: Arc<D>) -> Result<Self> {
        let identity = ProcessIdentity::resolve(&config.identity)
            .map_err(|e| anyhow::anyhow!("failed to resolve process identity: {}", e))?;
        info!(
            hostname = identity.hostname(),
            measurement = identity.measurement_base(),
            database = identity.database(),
            "process identity resolved"
        );

        let startup_timeout = Duration::from_secs(config.influxdb.startup_timeout_secs);
        probe_store(writer.as_ref(), startup_timeout).await?;
        info!(url = %config.influxdb.url, "influxdb reachable");

        let tail = TailConfig::new(&config.auth.log_path)
            .with_poll_interval(Duration::from_millis(config.auth.poll_interval_ms));
        let tailer = FileTailer::open(tail)
            .await
            .map_err(|e| anyhow::anyhow!("failed to open auth log: {}", e))?;
        info!(path = %tailer.path().display(), "auth log opened");

        probe_docker(docker.as_ref(), startup_timeout).await?;
        info!("docker daemon reachable");

        let fingerprints = Fingerprints::new(
            config.auth.login_fingerprint.as_str(),
            config.auth.logout_fingerprint.as_str(),
        );

        Ok(Self {
            forwarder: Arc::new(EventForwarder::new(Arc::new(identity), writer)),
            tailer,
            docker,
            fingerprints,
        })
    }

    pub fn identity(&self) -> &ProcessIdentity {
        self.forwarder.identity()
    }

    /// Run both watchers until they return or SIGTERM/SIGINT arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handlers cannot be installed.
    pub async fn run(self) -> Result<RunExit> {
        let signal = shutdown_signal()?;
        Ok(self.run_until(signal).await)
    }

    /// Run both watchers until they return or `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> RunExit
    where
        F: Future<Output = &'static str>,
    {
        let Self {
            forwarder,
            tailer,
            docker,
            fingerprints,
        } = self;

        let mut watchers = WatcherSet::new();

        let lines = tailer.into_stream();
        let auth_sink = Arc::clone(&forwarder);
        watchers.spawn(AUTH_WATCHER, async move {
            AuthWatcher::new(fingerprints)
                .run(lines, auth_sink.as_ref())
                .await
                .map_err(LoginmonError::from)
        });

        let events = docker.events();
        let docker_sink = Arc::clone(&forwarder);
        watchers.spawn(DOCKER_WATCHER, async move {
            DockerWatcher::new()
                .run(events, docker_sink.as_ref())
                .await
                .map_err(LoginmonError::from)
        });

        info!(watchers = watchers.len(), "loginmon running");

        let exit = tokio::select! {
            outcomes = watchers.join_all() => RunExit::WatchersFinished(outcomes),
            signal = shutdown => RunExit::Shutdown(signal),
        };

        match &exit {
            RunExit::WatchersFinished(outcomes) => {
                let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
                info!(failed, "all watchers returned");
            }
            RunExit::Shutdown(signal) => {
                info!(signal, "shutdown signal received, stopping watchers");
                watchers.shutdown().await;
            }
        }

        exit
    }
}

/// Check store connectivity, bounding the whole probe by `timeout`.
///
/// # Errors
///
/// Returns an error if `ping` fails or does not finish in time.
pub async fn probe_store<W: PointWriter>(writer: &W, timeout: Duration) -> Result<()> {
    match tokio::time::timeout(timeout, writer.ping()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(anyhow::anyhow!("error connecting to influxdb: {}", e)),
        Err(_) => Err(anyhow::anyhow!(
            "influxdb failed to respond within {}s",
            timeout.as_secs_f64()
        )),
    }
}

/// Check Docker daemon connectivity, bounded by `timeout`.
///
/// # Errors
///
/// Returns an error if `ping` fails or does not finish in time.
pub async fn probe_docker<D: DockerEventSource>(docker: &D, timeout: Duration) -> Result<()> {
    match tokio::time::timeout(timeout, docker.ping()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(anyhow::anyhow!("error connecting to docker: {}", e)),
        Err(_) => Err(anyhow::anyhow!(
            "docker failed to respond within {}s",
            timeout.as_secs_f64()
        )),
    }
}

/// Install SIGTERM/SIGINT handlers and return a future resolving to the
/// name of the first signal received.
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}
