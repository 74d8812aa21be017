//! Expiry scan CLI command.

use anyhow::Result;
use clap::Args;

use crate::cli::output::{output, CommandOutput};
use crate::services::engagement::ScanReport;
use crate::services::{LifecycleDaemon, LifecycleDaemonConfig, LifecycleEvent, StopReason};

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Keep running on the configured daily schedule instead of exiting
    #[arg(long)]
    pub watch: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct ScanOutput {
    pub report: ScanReport,
}

impl CommandOutput for ScanOutput {
    fn to_human(&self) -> String {
        format!(
            "Scan finished: {} overdue, {} moved into execution, {} failed",
            self.report.scanned, self.report.moved, self.report.failed
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.report).unwrap_or_default()
    }
}

pub async fn execute(args: ScanArgs, json_mode: bool) -> Result<()> {
    let (config, pool) = super::open_pool().await?;
    let service = super::build_service(&config, pool);

    if !args.watch {
        let daemon = LifecycleDaemon::with_defaults(service);
        let report = daemon.run_once().await?;
        output(&ScanOutput { report }, json_mode);
        return Ok(());
    }

    let daemon_config = LifecycleDaemonConfig::from_scheduler(&config.scheduler)
        .map_err(|e| anyhow::anyhow!(e))?;
    let daemon = LifecycleDaemon::new(service, daemon_config);
    let handle = daemon.handle();
    let mut events = daemon.run().await;

    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        handle.stop();
    });

    while let Some(event) = events.recv().await {
        match event {
            LifecycleEvent::Started => eprintln!("Lifecycle daemon started"),
            LifecycleEvent::ScanStarted { run_number } => {
                eprintln!("Scan #{run_number} started");
            }
            LifecycleEvent::ScanCompleted {
                run_number,
                report,
                duration_ms,
            } => {
                eprintln!(
                    "Scan #{run_number} finished in {duration_ms}ms: {} overdue, {} moved, {} failed",
                    report.scanned, report.moved, report.failed
                );
            }
            LifecycleEvent::ScanFailed { run_number, error } => {
                eprintln!("Scan #{run_number} failed: {error}");
            }
            LifecycleEvent::Stopped { reason } => {
                match reason {
                    StopReason::Requested => eprintln!("Lifecycle daemon stopped"),
                    StopReason::TooManyFailures => {
                        anyhow::bail!("Lifecycle daemon stopped after repeated scan failures")
                    }
                }
                break;
            }
        }
    }

    Ok(())
}
