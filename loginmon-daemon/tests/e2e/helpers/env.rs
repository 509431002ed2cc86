//! Temporary auth log and daemon configuration.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use loginmon_core::config::LoginmonConfig;
use loginmon_daemon::orchestrator::Orchestrator;

use super::mock_docker::ChannelDockerSource;
use super::mock_writer::RecordingWriter;

pub const HOSTNAME: &str = "e2e-host";

/// How long scenarios wait for points to arrive.
pub const WAIT: Duration = Duration::from_secs(5);

pub struct TestEnv {
    _dir: TempDir,
    pub auth_log: PathBuf,
    pub config: LoginmonConfig,
}

#[allow(dead_code)]
impl TestEnv {
    /// An empty auth log and a config pointing at it.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let auth_log = dir.path().join("auth.log");
        std::fs::write(&auth_log, "").expect("create auth log");

        let mut config = LoginmonConfig::default();
        config.identity.hostname = HOSTNAME.to_owned();
        config.auth.log_path = auth_log.display().to_string();
        config.auth.poll_interval_ms = 20;
        config.influxdb.startup_timeout_secs = 1;

        Self {
            _dir: dir,
            auth_log,
            config,
        }
    }

    pub fn append(&self, line: &str) {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&self.auth_log)
            .expect("open auth log");
        writeln!(file, "{line}").expect("append auth log");
    }

    /// Run every startup step against the given mocks.
    pub async fn start(
        &self,
        writer: &Arc<RecordingWriter>,
        docker: &Arc<ChannelDockerSource>,
    ) -> anyhow::Result<Orchestrator<RecordingWriter, ChannelDockerSource>> {
        Orchestrator::start(&self.config, Arc::clone(writer), Arc::clone(docker)).await
    }
}
