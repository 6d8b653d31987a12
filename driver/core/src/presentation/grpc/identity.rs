// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! CSI Identity gRPC service

use std::collections::HashMap;
use tonic::{Request, Response, Status};
use tracing::debug;

use super::csi;
use super::csi::identity_server::{Identity, IdentityServer};

/// Name the driver registers with the kubelet
pub const DRIVER_NAME: &str = "fsx.csi.aws.com";

pub struct CsiIdentityService {
    name: String,
    version: String,
}

impl CsiIdentityService {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn into_server(self) -> IdentityServer<Self> {
        IdentityServer::new(self)
    }
}

impl Default for CsiIdentityService {
    fn default() -> Self {
        Self::new(DRIVER_NAME, env!("CARGO_PKG_VERSION"))
    }
}

#[tonic::async_trait]
impl Identity for CsiIdentityService {
    async fn get_plugin_info(
        &self,
        _request: Request<csi::GetPluginInfoRequest>,
    ) -> Result<Response<csi::GetPluginInfoResponse>, Status> {
        debug!("GetPluginInfo: called");
        Ok(Response::new(csi::GetPluginInfoResponse {
            name: self.name.clone(),
            vendor_version: self.version.clone(),
            manifest: HashMap::new(),
        }))
    }

    /// Node-only plugin: no controller service, no topology constraints
    async fn get_plugin_capabilities(
        &self,
        _request: Request<csi::GetPluginCapabilitiesRequest>,
    ) -> Result<Response<csi::GetPluginCapabilitiesResponse>, Status> {
        debug!("GetPluginCapabilities: called");
        Ok(Response::new(csi::GetPluginCapabilitiesResponse {
            capabilities: vec![],
        }))
    }

    async fn probe(
        &self,
        _request: Request<csi::ProbeRequest>,
    ) -> Result<Response<csi::ProbeResponse>, Status> {
        Ok(Response::new(csi::ProbeResponse { ready: Some(true) }))
    }
}
