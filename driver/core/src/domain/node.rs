// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Node service operations, capabilities and errors
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Closed set of node operations and the error contract they
//!   report through

use crate::domain::mounter::MountError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every entry point of the CSI Node service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOperation {
    StageVolume,
    UnstageVolume,
    PublishVolume,
    UnpublishVolume,
    GetVolumeStats,
    ExpandVolume,
    GetCapabilities,
    GetInfo,
}

impl NodeOperation {
    pub const ALL: [NodeOperation; 8] = [
        Self::StageVolume,
        Self::UnstageVolume,
        Self::PublishVolume,
        Self::UnpublishVolume,
        Self::GetVolumeStats,
        Self::ExpandVolume,
        Self::GetCapabilities,
        Self::GetInfo,
    ];

    /// Whether this node plugin serves the operation at all.
    ///
    /// Publishing goes straight from volume context to target, so there is
    /// no staging step; usage statistics and expansion are out of scope.
    pub fn is_supported(self) -> bool {
        !matches!(
            self,
            Self::StageVolume | Self::UnstageVolume | Self::GetVolumeStats | Self::ExpandVolume
        )
    }

    /// Operations served by this node plugin, in RPC declaration order
    pub fn supported() -> impl Iterator<Item = NodeOperation> {
        Self::ALL.into_iter().filter(|op| op.is_supported())
    }

    pub fn rpc_name(self) -> &'static str {
        match self {
            Self::StageVolume => "NodeStageVolume",
            Self::UnstageVolume => "NodeUnstageVolume",
            Self::PublishVolume => "NodePublishVolume",
            Self::UnpublishVolume => "NodeUnpublishVolume",
            Self::GetVolumeStats => "NodeGetVolumeStats",
            Self::ExpandVolume => "NodeExpandVolume",
            Self::GetCapabilities => "NodeGetCapabilities",
            Self::GetInfo => "NodeGetInfo",
        }
    }
}

impl std::fmt::Display for NodeOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rpc_name())
    }
}

/// Optional node RPCs a plugin may advertise through GetCapabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCapability {
    StageUnstageVolume,
    GetVolumeStats,
    ExpandVolume,
    VolumeCondition,
    SingleNodeMultiWriter,
    VolumeMountGroup,
}

impl NodeCapability {
    /// Node operation the capability commits the plugin to serving.
    ///
    /// Advertising a capability whose operation is unsupported makes the
    /// kubelet call an RPC that always fails; STAGE_UNSTAGE_VOLUME would
    /// block every publish.
    pub fn operation(self) -> NodeOperation {
        match self {
            Self::StageUnstageVolume => NodeOperation::StageVolume,
            Self::GetVolumeStats | Self::VolumeCondition => NodeOperation::GetVolumeStats,
            Self::ExpandVolume => NodeOperation::ExpandVolume,
            Self::SingleNodeMultiWriter | Self::VolumeMountGroup => NodeOperation::PublishVolume,
        }
    }

    pub fn is_servable(self) -> bool {
        self.operation().is_supported()
    }
}

/// Identity reported by GetNodeInfo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub node_id: String,
}

/// Node service errors
///
/// Variants line up one-to-one with the gRPC status codes the Node service
/// reports.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A required field is missing or the capability is unsupported.
    /// Always raised before any mounter call.
    #[error("{0}")]
    InvalidArgument(String),

    /// The mounter failed part-way through publish or unpublish
    #[error("{message}: {source}")]
    Internal {
        message: String,
        #[source]
        source: MountError,
    },

    #[error("{0} is not implemented by this node plugin")]
    Unimplemented(NodeOperation),
}

impl NodeError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    pub fn internal(message: impl Into<String>, source: MountError) -> Self {
        Self::Internal {
            message: message.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_operations() {
        let supported: Vec<_> = NodeOperation::supported().collect();

        assert_eq!(
            supported,
            vec![
                NodeOperation::PublishVolume,
                NodeOperation::UnpublishVolume,
                NodeOperation::GetCapabilities,
                NodeOperation::GetInfo,
            ]
        );
    }

    #[test]
    fn test_capabilities_follow_supported_operations() {
        assert!(!NodeCapability::StageUnstageVolume.is_servable());
        assert!(!NodeCapability::GetVolumeStats.is_servable());
        assert!(!NodeCapability::VolumeCondition.is_servable());
        assert!(!NodeCapability::ExpandVolume.is_servable());
        assert!(NodeCapability::SingleNodeMultiWriter.is_servable());
        assert!(NodeCapability::VolumeMountGroup.is_servable());
    }

    #[test]
    fn test_error_messages() {
        let err = NodeError::Unimplemented(NodeOperation::StageVolume);
        assert_eq!(err.to_string(), "NodeStageVolume is not implemented by this node plugin");

        let err = NodeError::internal(
            "Could not unmount \"/target\"",
            MountError::Unknown("device busy".to_string()),
        );
        assert_eq!(err.to_string(), "Could not unmount \"/target\": device busy");
    }
}
