use anyhow::Result;
use clap::Parser;

use loginmon_daemon::cli::DaemonCli;
use loginmon_daemon::logging::init_tracing;
use loginmon_daemon::orchestrator::{Orchestrator, RunExit};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();
    let config = cli.resolve_config().await?;

    init_tracing(&config.general)?;

    if cli.print_config {
        let rendered = config.redacted().to_toml_string()?;
        tracing::info!(config = %rendered, "effective configuration");
    }

    if cli.validate {
        tracing::info!("configuration is valid");
        return Ok(());
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "loginmon-daemon starting");

    let daemon = Orchestrator::build_from_config(&config).await?;

    match daemon.run().await? {
        RunExit::WatchersFinished(outcomes) => {
            let failed: Vec<_> = outcomes
                .iter()
                .filter(|o| !o.is_ok())
                .map(|o| o.name.as_str())
                .collect();
            if !failed.is_empty() {
                return Err(anyhow::anyhow!(
                    "watchers stopped with errors: {}",
                    failed.join(", ")
                ));
            }
        }
        RunExit::Shutdown(_) => {}
    }

    tracing::info!("loginmon-daemon shut down");
    Ok(())
}
