// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! CSI Node gRPC service
//!
//! Thin adapter over [`NodeService`]: converts CSI messages into domain
//! requests and [`NodeError`] into [`Status`].

use std::sync::Arc;
use tonic::{Request, Response, Status};

use crate::application::node_service::NodeService;
use crate::domain::node::{NodeCapability, NodeError};
use crate::domain::volume::{
    self, AccessMode, PublishVolumeRequest, UnpublishVolumeRequest, VolumeCapability,
    VolumeContext, VolumeId,
};

use super::csi;
use super::csi::node_server::{Node, NodeServer};
use super::csi::node_service_capability::rpc::Type as RpcType;
use super::csi::volume_capability::access_mode::Mode;

pub struct CsiNodeService {
    service: Arc<NodeService>,
}

impl CsiNodeService {
    pub fn new(service: Arc<NodeService>) -> Self {
        Self { service }
    }

    pub fn into_server(self) -> NodeServer<Self> {
        NodeServer::new(self)
    }
}

impl From<NodeError> for Status {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::InvalidArgument(reason) => Status::invalid_argument(reason),
            err @ NodeError::Internal { .. } => Status::internal(err.to_string()),
            err @ NodeError::Unimplemented(_) => Status::unimplemented(err.to_string()),
        }
    }
}

fn access_mode_from_proto(mode: i32) -> AccessMode {
    match Mode::try_from(mode).unwrap_or(Mode::Unknown) {
        Mode::Unknown => AccessMode::Unknown,
        Mode::SingleNodeWriter => AccessMode::SingleNodeWriter,
        Mode::SingleNodeReaderOnly => AccessMode::SingleNodeReaderOnly,
        Mode::MultiNodeReaderOnly => AccessMode::MultiNodeReaderOnly,
        Mode::MultiNodeSingleWriter => AccessMode::MultiNodeSingleWriter,
        Mode::MultiNodeMultiWriter => AccessMode::MultiNodeMultiWriter,
        Mode::SingleNodeSingleWriter => AccessMode::SingleNodeSingleWriter,
        Mode::SingleNodeMultiWriter => AccessMode::SingleNodeMultiWriter,
    }
}

fn capability_from_proto(capability: csi::VolumeCapability) -> VolumeCapability {
    // A capability without an access mode is treated as UNKNOWN and rejected
    // by validation like any other unsupported mode
    let access_mode = capability
        .access_mode
        .map(|m| access_mode_from_proto(m.mode))
        .unwrap_or(AccessMode::Unknown);

    let access_type = capability.access_type.map(|t| match t {
        csi::volume_capability::AccessType::Block(_) => volume::AccessType::Block,
        csi::volume_capability::AccessType::Mount(m) => volume::AccessType::Mount {
            fs_type: m.fs_type,
            mount_flags: m.mount_flags,
        },
    });

    VolumeCapability {
        access_mode,
        access_type,
    }
}

fn capability_to_proto(capability: NodeCapability) -> csi::NodeServiceCapability {
    let rpc_type = match capability {
        NodeCapability::StageUnstageVolume => RpcType::StageUnstageVolume,
        NodeCapability::GetVolumeStats => RpcType::GetVolumeStats,
        NodeCapability::ExpandVolume => RpcType::ExpandVolume,
        NodeCapability::VolumeCondition => RpcType::VolumeCondition,
        NodeCapability::SingleNodeMultiWriter => RpcType::SingleNodeMultiWriter,
        NodeCapability::VolumeMountGroup => RpcType::VolumeMountGroup,
    };

    csi::NodeServiceCapability {
        r#type: Some(csi::node_service_capability::Type::Rpc(
            csi::node_service_capability::Rpc {
                r#type: rpc_type as i32,
            },
        )),
    }
}

#[tonic::async_trait]
impl Node for CsiNodeService {
    async fn node_stage_volume(
        &self,
        _request: Request<csi::NodeStageVolumeRequest>,
    ) -> Result<Response<csi::NodeStageVolumeResponse>, Status> {
        self.service.stage_volume().await?;
        Ok(Response::new(csi::NodeStageVolumeResponse {}))
    }

    async fn node_unstage_volume(
        &self,
        _request: Request<csi::NodeUnstageVolumeRequest>,
    ) -> Result<Response<csi::NodeUnstageVolumeResponse>, Status> {
        self.service.unstage_volume().await?;
        Ok(Response::new(csi::NodeUnstageVolumeResponse {}))
    }

    async fn node_publish_volume(
        &self,
        request: Request<csi::NodePublishVolumeRequest>,
    ) -> Result<Response<csi::NodePublishVolumeResponse>, Status> {
        let req = request.into_inner();

        // publish_context, staging_target_path and secrets are not used
        let publish = PublishVolumeRequest {
            volume_id: VolumeId::new(req.volume_id),
            volume_context: VolumeContext::from(req.volume_context),
            target_path: req.target_path,
            volume_capability: req.volume_capability.map(capability_from_proto),
            readonly: req.readonly,
        };

        self.service.publish_volume(&publish).await?;
        Ok(Response::new(csi::NodePublishVolumeResponse {}))
    }

    async fn node_unpublish_volume(
        &self,
        request: Request<csi::NodeUnpublishVolumeRequest>,
    ) -> Result<Response<csi::NodeUnpublishVolumeResponse>, Status> {
        let req = request.into_inner();

        let unpublish = UnpublishVolumeRequest {
            volume_id: VolumeId::new(req.volume_id),
            target_path: req.target_path,
        };

        self.service.unpublish_volume(&unpublish).await?;
        Ok(Response::new(csi::NodeUnpublishVolumeResponse {}))
    }

    async fn node_get_volume_stats(
        &self,
        _request: Request<csi::NodeGetVolumeStatsRequest>,
    ) -> Result<Response<csi::NodeGetVolumeStatsResponse>, Status> {
        self.service.get_volume_stats().await?;
        Ok(Response::new(csi::NodeGetVolumeStatsResponse { usage: vec![] }))
    }

    async fn node_expand_volume(
        &self,
        _request: Request<csi::NodeExpandVolumeRequest>,
    ) -> Result<Response<csi::NodeExpandVolumeResponse>, Status> {
        self.service.expand_volume().await?;
        Ok(Response::new(csi::NodeExpandVolumeResponse { capacity_bytes: 0 }))
    }

    async fn node_get_capabilities(
        &self,
        _request: Request<csi::NodeGetCapabilitiesRequest>,
    ) -> Result<Response<csi::NodeGetCapabilitiesResponse>, Status> {
        let capabilities = self
            .service
            .get_capabilities()
            .iter()
            .copied()
            .map(capability_to_proto)
            .collect();

        Ok(Response::new(csi::NodeGetCapabilitiesResponse { capabilities }))
    }

    async fn node_get_info(
        &self,
        _request: Request<csi::NodeGetInfoRequest>,
    ) -> Result<Response<csi::NodeGetInfoResponse>, Status> {
        let info = self.service.get_info();

        Ok(Response::new(csi::NodeGetInfoResponse {
            node_id: info.node_id,
            // 0 means no limit
            max_volumes_per_node: 0,
            accessible_topology: None,
        }))
    }
}
