// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! gRPC server bootstrap
//!
//! Serves the CSI Identity and Node services on the plugin endpoint. The
//! kubelet talks to node plugins over a unix socket; TCP is accepted for
//! local testing with tools such as `csc`.

use anyhow::Context;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tokio::net::{TcpListener, UnixListener};
use tokio_stream::wrappers::{TcpListenerStream, UnixListenerStream};
use tracing::{debug, info};

use super::identity::CsiIdentityService;
use super::node::CsiNodeService;

/// Where the plugin listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `unix:///path/to/socket`
    Unix(PathBuf),
    /// `tcp://host:port`
    Tcp(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("endpoint cannot be empty")]
    Empty,

    #[error("unsupported endpoint scheme in '{0}', expected unix:// or tcp://")]
    UnsupportedScheme(String),

    #[error("endpoint '{0}' has no address")]
    MissingAddress(String),
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EndpointError::Empty);
        }

        let (scheme, address) = s
            .split_once("://")
            .ok_or_else(|| EndpointError::UnsupportedScheme(s.to_string()))?;
        if address.is_empty() {
            return Err(EndpointError::MissingAddress(s.to_string()));
        }

        match scheme.to_ascii_lowercase().as_str() {
            "unix" => Ok(Endpoint::Unix(PathBuf::from(address))),
            "tcp" => Ok(Endpoint::Tcp(address.to_string())),
            _ => Err(EndpointError::UnsupportedScheme(s.to_string())),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            Endpoint::Tcp(address) => write!(f, "tcp://{}", address),
        }
    }
}

/// Start the gRPC server and run until `shutdown` resolves
pub async fn start_grpc_server<F>(
    endpoint: &Endpoint,
    node: CsiNodeService,
    identity: CsiIdentityService,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let router = tonic::transport::Server::builder()
        .add_service(identity.into_server())
        .add_service(node.into_server());

    info!("Starting CSI gRPC server on {}", endpoint);

    match endpoint {
        Endpoint::Unix(path) => {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create socket directory {:?}", parent))?;
            }
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!("Removed stale socket {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove stale socket {:?}", path))
                }
            }

            let listener = UnixListener::bind(path)
                .with_context(|| format!("Failed to bind unix socket {:?}", path))?;
            router
                .serve_with_incoming_shutdown(UnixListenerStream::new(listener), shutdown)
                .await
                .context("gRPC server failed")?;
        }
        Endpoint::Tcp(address) => {
            let listener = TcpListener::bind(address.as_str())
                .await
                .with_context(|| format!("Failed to bind {}", address))?;
            router
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
                .await
                .context("gRPC server failed")?;
        }
    }

    info!("CSI gRPC server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unix_endpoint() {
        assert_eq!(
            "unix:///csi/csi.sock".parse::<Endpoint>(),
            Ok(Endpoint::Unix(PathBuf::from("/csi/csi.sock")))
        );
        assert_eq!(
            "UNIX:///var/lib/kubelet/plugins/fsx.csi.aws.com/csi.sock".parse::<Endpoint>(),
            Ok(Endpoint::Unix(PathBuf::from(
                "/var/lib/kubelet/plugins/fsx.csi.aws.com/csi.sock"
            )))
        );
    }

    #[test]
    fn test_parse_tcp_endpoint() {
        assert_eq!(
            "tcp://127.0.0.1:10000".parse::<Endpoint>(),
            Ok(Endpoint::Tcp("127.0.0.1:10000".to_string()))
        );
    }

    #[test]
    fn test_parse_invalid_endpoints() {
        assert_eq!("".parse::<Endpoint>(), Err(EndpointError::Empty));
        assert!(matches!(
            "/csi/csi.sock".parse::<Endpoint>(),
            Err(EndpointError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            "http://localhost:80".parse::<Endpoint>(),
            Err(EndpointError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            "unix://".parse::<Endpoint>(),
            Err(EndpointError::MissingAddress(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        let endpoint = Endpoint::Unix(PathBuf::from("/csi/csi.sock"));
        assert_eq!(endpoint.to_string(), "unix:///csi/csi.sock");
    }

    #[tokio::test]
    async fn test_serves_on_unix_socket_and_replaces_stale_file() {
        use crate::application::node_service::NodeService;
        use crate::domain::node_config::NodeConfigManifest;
        use crate::infrastructure::mounter::RecordingMounter;
        use std::sync::Arc;

        let dir = tempfile::TempDir::new().unwrap();
        let socket = dir.path().join("csi.sock");
        std::fs::write(&socket, b"stale").unwrap();

        let manifest = NodeConfigManifest::default();
        let service = NodeService::from_config(&manifest.spec, Arc::new(RecordingMounter::new()));
        let endpoint = Endpoint::Unix(socket.clone());

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            start_grpc_server(
                &endpoint,
                CsiNodeService::new(Arc::new(service)),
                CsiIdentityService::default(),
                async {
                    let _ = rx.await;
                },
            )
            .await
        });

        // wait for the listener to replace the stale file
        for _ in 0..50 {
            if tokio::net::UnixStream::connect(&socket).await.is_ok() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(tokio::net::UnixStream::connect(&socket).await.is_ok());

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
