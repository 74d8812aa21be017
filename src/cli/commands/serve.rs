//! HTTP API serve command.

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use crate::adapters::http::{ApiServer, HttpServerConfig};
use crate::services::{LifecycleDaemon, LifecycleDaemonConfig};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the configured bind port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Serve requests only; skip the scheduled expiry scan
    #[arg(long)]
    pub no_scheduler: bool,
}

pub async fn execute(args: ServeArgs, _json_mode: bool) -> Result<()> {
    let (config, pool) = super::open_pool().await?;
    let service = super::build_service(&config, pool);

    // The daemon shares the service and runs on its own task; the
    // request path never waits on it.
    let daemon_handle = if args.no_scheduler {
        None
    } else {
        let daemon_config = LifecycleDaemonConfig::from_scheduler(&config.scheduler)
            .map_err(|e| anyhow::anyhow!(e))?;
        let daemon = LifecycleDaemon::new(service.clone(), daemon_config);
        let handle = daemon.handle();
        let mut events = daemon.run().await;
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                info!(?event, "lifecycle");
            }
        });
        Some(handle)
    };

    let mut server_config = HttpServerConfig::from(&config.api);
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let server = ApiServer::new(service, server_config);
    let result = server
        .serve_with_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Failed to listen for shutdown signal");
            }
        })
        .await;

    if let Some(handle) = daemon_handle {
        handle.stop();
    }

    result.map_err(|e| anyhow::anyhow!("HTTP server failed: {e}"))
}
