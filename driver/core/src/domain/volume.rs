// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// ============================================================================
// Value Objects
// ============================================================================

/// Volume context key naming the export endpoint (required on publish)
pub const VOLUME_CONTEXT_DNS_NAME: &str = "dnsname";

/// Volume context key naming the export path segment (optional)
pub const VOLUME_CONTEXT_MOUNT_NAME: &str = "mountname";

/// Caller-supplied volume identifier
///
/// Opaque: the format is never validated. It only namespaces the
/// intermediate mount path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VolumeId(pub String);

impl VolumeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for VolumeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// String attributes attached to a volume at provisioning time
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VolumeContext(pub HashMap<String, String>);

impl VolumeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Export endpoint, `None` when absent or empty
    pub fn dns_name(&self) -> Option<&str> {
        self.non_empty(VOLUME_CONTEXT_DNS_NAME)
    }

    /// Export path segment, `None` when absent or empty
    pub fn mount_name(&self) -> Option<&str> {
        self.non_empty(VOLUME_CONTEXT_MOUNT_NAME)
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

impl From<HashMap<String, String>> for VolumeContext {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

/// How many nodes may attach the volume, and with what access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    Unknown,
    SingleNodeWriter,
    SingleNodeReaderOnly,
    MultiNodeReaderOnly,
    MultiNodeSingleWriter,
    MultiNodeMultiWriter,
    SingleNodeSingleWriter,
    SingleNodeMultiWriter,
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::SingleNodeWriter => "single-node-writer",
            Self::SingleNodeReaderOnly => "single-node-reader-only",
            Self::MultiNodeReaderOnly => "multi-node-reader-only",
            Self::MultiNodeSingleWriter => "multi-node-single-writer",
            Self::MultiNodeMultiWriter => "multi-node-multi-writer",
            Self::SingleNodeSingleWriter => "single-node-single-writer",
            Self::SingleNodeMultiWriter => "single-node-multi-writer",
        };
        f.write_str(name)
    }
}

/// Whether the volume is consumed as a filesystem or a raw block device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessType {
    Block,
    Mount {
        fs_type: String,
        /// Ordered as supplied by the caller, duplicates included
        mount_flags: Vec<String>,
    },
}

/// Access requested by the caller for a single publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeCapability {
    pub access_mode: AccessMode,
    pub access_type: Option<AccessType>,
}

impl VolumeCapability {
    /// Filesystem capability with the given mount flags
    pub fn mount(access_mode: AccessMode, mount_flags: Vec<String>) -> Self {
        Self {
            access_mode,
            access_type: Some(AccessType::Mount {
                fs_type: String::new(),
                mount_flags,
            }),
        }
    }

    /// Mount flags of a filesystem capability; empty for any other kind
    pub fn mount_flags(&self) -> &[String] {
        match &self.access_type {
            Some(AccessType::Mount { mount_flags, .. }) => mount_flags,
            _ => &[],
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PublishVolumeRequest {
    pub volume_id: VolumeId,
    pub volume_context: VolumeContext,
    pub target_path: String,
    pub volume_capability: Option<VolumeCapability>,
    pub readonly: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UnpublishVolumeRequest {
    pub volume_id: VolumeId,
    pub target_path: String,
}

// ============================================================================
// Plans
// ============================================================================

/// Everything needed to perform a publish, derived fresh on every call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPlan {
    /// `<dnsname>@tcp:/<mountname>`
    pub source: String,
    pub intermediate_path: PathBuf,
    pub target_path: PathBuf,
    /// Applied to the remote mount only
    pub options: Vec<String>,
}

/// Paths to tear down on unpublish, target first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmountPlan {
    pub target_path: PathBuf,
    pub intermediate_path: PathBuf,
}
