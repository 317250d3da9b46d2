//! Sluice daemon binary.

mod cli;

use std::sync::Arc;

use clap::Parser;
use sluice_bus::EventBus;
use sluice_core::{CoreConfig, Service};
use sluice_registry::{SwitchEvent, SwitchRegistry};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_args.directive())),
        )
        .init();

    let mut config = CoreConfig::load_or_create(&cli.config)?;
    cli.core.apply(&mut config);
    info!(?config, "starting control-channel core");

    let bus = EventBus::default();
    let registry = Arc::new(SwitchRegistry::new());

    let mut registry_events = registry.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = registry_events.recv().await {
            match event {
                SwitchEvent::Discovered { datapath_id } => {
                    info!(%datapath_id, "switch connected");
                }
                SwitchEvent::ConnectionRebound {
                    datapath_id,
                    connection,
                } => {
                    info!(%datapath_id, %connection, "switch reconnected");
                }
                SwitchEvent::FeaturesUpdated { datapath_id, ports } => {
                    debug!(%datapath_id, ports, "switch features updated");
                }
                SwitchEvent::FlowsUpdated { datapath_id, flows } => {
                    debug!(%datapath_id, flows, "switch flows updated");
                }
            }
        }
    });

    // the transport layer attaches to the same bus; the core runs until
    // interrupted
    let handle = Service::new(bus, registry, config).spawn();

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, shutting down");
    handle.shutdown().await;

    Ok(())
}
