//! CLI argument definitions for loginmon-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.
//! Flags are the highest-precedence configuration layer:
//! defaults, then the TOML file, then `LOGINMON_*` environment
//! variables, then these flags.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use loginmon_core::config::LoginmonConfig;

/// Login and container lifecycle monitor.
///
/// Tails the PAM auth log for session open/close lines, watches the
/// Docker event stream for container start/die, and records each
/// event as a point in InfluxDB.
#[derive(Parser, Debug, Default)]
#[command(name = "loginmon-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to a loginmon.toml configuration file.
    ///
    /// Without it, built-in defaults are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hostname tag value (defaults to the system hostname).
    #[arg(long)]
    pub host: Option<String>,

    /// InfluxDB HTTP endpoint.
    #[arg(long = "influxdb")]
    pub influxdb: Option<String>,

    /// InfluxDB username.
    #[arg(long)]
    pub username: Option<String>,

    /// InfluxDB password.
    #[arg(long)]
    pub password: Option<String>,

    /// InfluxDB database name.
    #[arg(long)]
    pub db: Option<String>,

    /// Measurement base name.
    #[arg(long)]
    pub measurement: Option<String>,

    /// Path of the PAM auth log to tail.
    #[arg(long)]
    pub authlog: Option<String>,

    /// Log the effective configuration (password masked) before starting.
    #[arg(long)]
    pub print_config: bool,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Build the effective configuration from every layer and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed,
    /// or if the merged configuration is invalid.
    pub async fn resolve_config(&self) -> Result<LoginmonConfig> {
        let mut config = match &self.config {
            Some(path) => LoginmonConfig::from_file(path).await.map_err(|e| {
                anyhow::anyhow!("failed to load config {}: {}", path.display(), e)
            })?,
            None => LoginmonConfig::default(),
        };

        config.apply_env_overrides();
        self.apply_overrides(&mut config);

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
        Ok(config)
    }

    /// Apply flags that were given on the command line.
    pub fn apply_overrides(&self, config: &mut LoginmonConfig) {
        override_with(&mut config.identity.hostname, &self.host);
        override_with(&mut config.influxdb.url, &self.influxdb);
        override_with(&mut config.influxdb.username, &self.username);
        override_with(&mut config.influxdb.password, &self.password);
        override_with(&mut config.identity.database, &self.db);
        override_with(&mut config.identity.measurement, &self.measurement);
        override_with(&mut config.auth.log_path, &self.authlog);
        override_with(&mut config.general.log_level, &self.log_level);
        override_with(&mut config.general.log_format, &self.log_format);
    }
}

fn override_with(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}
