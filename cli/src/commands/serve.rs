// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Serve the CSI endpoint
//!
//! Loads the node configuration, wires the node service to the host
//! mounter and runs the gRPC server until SIGINT or SIGTERM.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use fsx_csi_core::application::NodeService;
use fsx_csi_core::domain::node::NodeOperation;
use fsx_csi_core::domain::node_config::NodeConfigManifest;
use fsx_csi_core::infrastructure::mounter::SystemMounter;
use fsx_csi_core::presentation::grpc::{
    start_grpc_server, CsiIdentityService, CsiNodeService, Endpoint,
};

/// Flags that override the configuration file
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Node identifier reported through NodeGetInfo
    #[arg(long, value_name = "ID")]
    pub node_id: Option<String>,

    /// CSI endpoint, unix:///path or tcp://host:port
    #[arg(long, value_name = "ENDPOINT")]
    pub endpoint: Option<String>,
}

impl ServeArgs {
    pub fn is_empty(&self) -> bool {
        self.node_id.is_none() && self.endpoint.is_none()
    }

    /// Flags given to `serve` win over the ones given before it
    pub fn or(self, fallback: ServeArgs) -> ServeArgs {
        ServeArgs {
            node_id: self.node_id.or(fallback.node_id),
            endpoint: self.endpoint.or(fallback.endpoint),
        }
    }
}

/// Load configuration and apply CLI overrides on top of the file and
/// environment
pub fn resolve_config(
    config_path: Option<PathBuf>,
    args: &ServeArgs,
) -> Result<(NodeConfigManifest, Option<PathBuf>)> {
    let (mut config, source) =
        NodeConfigManifest::load_or_default(config_path).context("Failed to load configuration")?;

    if let Some(node_id) = &args.node_id {
        config.spec.node.id = node_id.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.spec.network.endpoint = endpoint.clone();
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok((config, source))
}

pub async fn run(config_path: Option<PathBuf>, args: ServeArgs) -> Result<()> {
    let (config, source) = resolve_config(config_path, &args)?;

    match &source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    let endpoint: Endpoint = config
        .spec
        .network
        .endpoint
        .parse()
        .with_context(|| format!("Invalid endpoint '{}'", config.spec.network.endpoint))?;

    info!(
        node_id = %config.spec.node.id,
        version = env!("CARGO_PKG_VERSION"),
        "FSx CSI node plugin starting"
    );
    let served: Vec<&str> = NodeOperation::supported().map(NodeOperation::rpc_name).collect();
    info!("Serving {}", served.join(", "));

    let mounter = Arc::new(SystemMounter::new(config.spec.mount.bind_fs_type.clone()));
    let service = Arc::new(NodeService::from_config(&config.spec, mounter));

    start_grpc_server(
        &endpoint,
        CsiNodeService::new(service),
        CsiIdentityService::default(),
        shutdown_signal(),
    )
    .await?;

    info!("FSx CSI node plugin shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
