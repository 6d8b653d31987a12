// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Node Configuration Types
//
// Defines the configuration schema for the FSx CSI node plugin, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Node identity reported through NodeGetInfo
// - Mount layout (intermediate root, default export segment, fs kinds)
// - Advertised node capabilities and accepted access modes
// - gRPC endpoint

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::node::NodeCapability;
use crate::domain::volume::AccessMode;

pub const API_VERSION: &str = "fsx.csi.aws.com/v1";
pub const KIND: &str = "NodeConfig";

/// Top-level Kubernetes-style node configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfigManifest {
    /// API version (must be "fsx.csi.aws.com/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "NodeConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: NodeConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Node configuration specification (content under spec:)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfigSpec {
    pub node: NodeIdentity,

    #[serde(default)]
    pub mount: MountConfig,

    #[serde(default)]
    pub capabilities: CapabilityConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeIdentity {
    /// Opaque identifier returned verbatim by NodeGetInfo.
    /// Usually the Kubernetes node name.
    pub id: String,
}

impl Default for NodeIdentity {
    fn default() -> Self {
        Self { id: hostname_or_default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    /// Directory under which each volume gets `<root>/<volume_id>`
    #[serde(default = "default_intermediate_root")]
    pub intermediate_root: PathBuf,

    /// Export path segment used when the volume context has no `mountname`
    #[serde(default = "default_mount_name")]
    pub default_mount_name: String,

    /// Filesystem kind of the remote mount
    #[serde(default = "default_fs_type")]
    pub fs_type: String,

    /// Filesystem kind passed for the bind mount onto the target
    #[serde(default = "default_bind_fs_type")]
    pub bind_fs_type: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            intermediate_root: default_intermediate_root(),
            default_mount_name: default_mount_name(),
            fs_type: default_fs_type(),
            bind_fs_type: default_bind_fs_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityConfig {
    /// Optional node RPCs advertised through NodeGetCapabilities
    #[serde(default)]
    pub node: Vec<NodeCapability>,

    /// Access modes accepted on NodePublishVolume
    #[serde(default = "default_access_modes")]
    pub access_modes: Vec<AccessMode>,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            node: vec![],
            access_modes: default_access_modes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// gRPC endpoint, `unix://<path>` or `tcp://<host>:<port>`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

// Default value functions
fn default_intermediate_root() -> PathBuf {
    PathBuf::from("/tmp/mnt/fsx")
}

fn default_mount_name() -> String {
    "fsx".to_string()
}

fn default_fs_type() -> String {
    "lustre".to_string()
}

fn default_bind_fs_type() -> String {
    "bind".to_string()
}

fn default_access_modes() -> Vec<AccessMode> {
    vec![AccessMode::MultiNodeMultiWriter]
}

fn default_endpoint() -> String {
    "unix:///csi/csi.sock".to_string()
}

fn hostname_or_default() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "fsx-csi-node".to_string())
}

impl Default for NodeConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname_or_default(),
                labels: None,
            },
            spec: NodeConfigSpec::default(),
        }
    }
}

impl NodeConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Paths checked by discovery, in precedence order
    /// 1. FSX_CSI_CONFIG_PATH environment variable
    /// 2. ./fsx-csi-config.yaml (working directory)
    /// 3. ~/.fsx-csi/config.yaml (user home)
    /// 4. /etc/fsx-csi/config.yaml (system)
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(path) = std::env::var("FSX_CSI_CONFIG_PATH") {
            paths.push(PathBuf::from(path));
        }

        paths.push(PathBuf::from("./fsx-csi-config.yaml"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".fsx-csi").join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/fsx-csi/config.yaml"));
        paths
    }

    /// First existing configuration file from [`Self::candidate_paths`]
    pub fn discover_config() -> Option<PathBuf> {
        Self::candidate_paths().into_iter().find(|p| p.exists())
    }

    /// Load configuration with discovery, fallback to default
    ///
    /// Returns the manifest and the file it came from, if any. Environment
    /// overrides are applied in every case.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        // Explicit CLI path: fail if missing/invalid
        if let Some(path) = cli_path {
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok((config, Some(path)));
        }

        let (mut config, source) = match Self::discover_config() {
            Some(path) => (Self::from_yaml_file(&path)?, Some(path)),
            None => (Self::default(), None),
        };
        config.apply_env_overrides();
        Ok((config, source))
    }

    /// Apply environment variable overrides to configuration
    ///
    /// Daemonset manifests inject the node name through the downward API,
    /// so the node id is the override that matters most.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FSX_CSI_NODE_ID") {
            if !val.is_empty() {
                self.spec.node.id = val;
            }
        }

        if let Ok(val) = std::env::var("FSX_CSI_ENDPOINT") {
            if !val.is_empty() {
                self.spec.network.endpoint = val;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.node.id.is_empty() {
            anyhow::bail!("spec.node.id cannot be empty");
        }

        let mount = &self.spec.mount;
        if mount.intermediate_root.as_os_str().is_empty() {
            anyhow::bail!("spec.mount.intermediate_root cannot be empty");
        }

        if !mount.intermediate_root.is_absolute() {
            anyhow::bail!(
                "spec.mount.intermediate_root must be absolute: {:?}",
                mount.intermediate_root
            );
        }

        if mount.fs_type.is_empty() {
            anyhow::bail!("spec.mount.fs_type cannot be empty");
        }

        if mount.bind_fs_type.is_empty() {
            anyhow::bail!("spec.mount.bind_fs_type cannot be empty");
        }

        if let Some(capability) = self
            .spec
            .capabilities
            .node
            .iter()
            .find(|c| !c.is_servable())
        {
            anyhow::bail!(
                "spec.capabilities.node cannot advertise {:?}: {} is not implemented by this node plugin",
                capability,
                capability.operation()
            );
        }

        if self.spec.capabilities.access_modes.is_empty() {
            anyhow::bail!("spec.capabilities.access_modes must list at least one mode");
        }

        Ok(())
    }
}
