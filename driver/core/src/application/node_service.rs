// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Node Service Application Service
//!
//! Entry points of the CSI Node service, independent of transport. Each
//! call is a single pass of validate → plan → execute; nothing is retried
//! internally and nothing is remembered between calls.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::mount_executor::MountExecutor;
use crate::application::mount_planner::MountPlanner;
use crate::application::request_validator::RequestValidator;
use crate::domain::mounter::Mounter;
use crate::domain::node::{NodeCapability, NodeError, NodeInfo, NodeOperation};
use crate::domain::node_config::NodeConfigSpec;
use crate::domain::volume::{PublishVolumeRequest, UnpublishVolumeRequest};

pub struct NodeService {
    node_id: String,
    capabilities: Vec<NodeCapability>,
    validator: RequestValidator,
    planner: MountPlanner,
    executor: MountExecutor,
}

impl NodeService {
    pub fn new(
        node_id: impl Into<String>,
        capabilities: Vec<NodeCapability>,
        validator: RequestValidator,
        planner: MountPlanner,
        executor: MountExecutor,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            capabilities,
            validator,
            planner,
            executor,
        }
    }

    /// Wire the service from the `spec:` section of the node configuration
    pub fn from_config(spec: &NodeConfigSpec, mounter: Arc<dyn Mounter>) -> Self {
        Self::new(
            spec.node.id.clone(),
            spec.capabilities.node.clone(),
            RequestValidator::new(spec.capabilities.access_modes.clone()),
            MountPlanner::from_config(&spec.mount),
            MountExecutor::from_config(mounter, &spec.mount),
        )
    }

    pub async fn stage_volume(&self) -> Result<(), NodeError> {
        self.unsupported(NodeOperation::StageVolume)
    }

    pub async fn unstage_volume(&self) -> Result<(), NodeError> {
        self.unsupported(NodeOperation::UnstageVolume)
    }

    pub async fn publish_volume(&self, req: &PublishVolumeRequest) -> Result<(), NodeError> {
        debug!("NodePublishVolume: called with args {:?}", req);

        let target = self.validator.validate_publish(req)?;
        let plan = self.planner.plan_publish(&target);
        self.executor.publish(&plan).await?;

        info!(
            volume_id = %req.volume_id,
            target = %plan.target_path.display(),
            "Volume published"
        );
        Ok(())
    }

    pub async fn unpublish_volume(&self, req: &UnpublishVolumeRequest) -> Result<(), NodeError> {
        debug!("NodeUnpublishVolume: called with args {:?}", req);

        let target = self.validator.validate_unpublish(req)?;
        let plan = self.planner.plan_unpublish(&target);
        self.executor.unpublish(&plan).await?;

        info!(
            volume_id = %req.volume_id,
            target = %plan.target_path.display(),
            "Volume unpublished"
        );
        Ok(())
    }

    pub async fn get_volume_stats(&self) -> Result<(), NodeError> {
        self.unsupported(NodeOperation::GetVolumeStats)
    }

    pub async fn expand_volume(&self) -> Result<(), NodeError> {
        self.unsupported(NodeOperation::ExpandVolume)
    }

    pub fn get_capabilities(&self) -> &[NodeCapability] {
        debug!("NodeGetCapabilities: called");
        &self.capabilities
    }

    pub fn get_info(&self) -> NodeInfo {
        debug!("NodeGetInfo: called");
        NodeInfo {
            node_id: self.node_id.clone(),
        }
    }

    fn unsupported(&self, operation: NodeOperation) -> Result<(), NodeError> {
        debug_assert!(!operation.is_supported());
        warn!("{} called but not implemented by this node plugin", operation);
        Err(NodeError::Unimplemented(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node_config::NodeConfigManifest;
    use crate::infrastructure::mounter::RecordingMounter;

    fn service(capabilities: Vec<NodeCapability>) -> NodeService {
        let mut manifest = NodeConfigManifest::default();
        manifest.spec.node.id = "node-1".to_string();
        manifest.spec.capabilities.node = capabilities;
        NodeService::from_config(&manifest.spec, Arc::new(RecordingMounter::new()))
    }

    #[tokio::test]
    async fn test_stub_operations_are_unimplemented() {
        let service = service(vec![]);

        assert!(matches!(
            service.stage_volume().await,
            Err(NodeError::Unimplemented(NodeOperation::StageVolume))
        ));
        assert!(matches!(
            service.unstage_volume().await,
            Err(NodeError::Unimplemented(NodeOperation::UnstageVolume))
        ));
        assert!(matches!(
            service.get_volume_stats().await,
            Err(NodeError::Unimplemented(NodeOperation::GetVolumeStats))
        ));
        assert!(matches!(
            service.expand_volume().await,
            Err(NodeError::Unimplemented(NodeOperation::ExpandVolume))
        ));
    }

    #[test]
    fn test_capabilities_come_from_config() {
        assert!(service(vec![]).get_capabilities().is_empty());
        assert_eq!(
            service(vec![NodeCapability::VolumeMountGroup]).get_capabilities(),
            [NodeCapability::VolumeMountGroup]
        );
    }

    #[test]
    fn test_node_info() {
        assert_eq!(service(vec![]).get_info().node_id, "node-1");
    }
}
