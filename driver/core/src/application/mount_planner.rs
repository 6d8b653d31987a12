// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mount Planner
//!
//! Pure derivation of the export address, the per-volume intermediate mount
//! point and the remote mount options. Nothing here is cached; the same
//! request always produces the same plan.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Deterministic path and option derivation for publish and
//!   unpublish

use std::path::PathBuf;

use crate::application::request_validator::{PublishTarget, UnpublishTarget};
use crate::domain::node_config::MountConfig;
use crate::domain::volume::{MountPlan, UnmountPlan, VolumeId};

/// Lustre network type used in the export address
const LNET_TRANSPORT: &str = "tcp";

#[derive(Debug, Clone)]
pub struct MountPlanner {
    intermediate_root: String,
    default_mount_name: String,
}

impl MountPlanner {
    pub fn new(intermediate_root: impl Into<PathBuf>, default_mount_name: impl Into<String>) -> Self {
        let root = intermediate_root.into().to_string_lossy().into_owned();
        // Keep "/" itself intact; strip any other trailing separators so the
        // template never produces "//"
        let trimmed = root.trim_end_matches('/');
        Self {
            intermediate_root: if trimmed.is_empty() { root.clone() } else { trimmed.to_string() },
            default_mount_name: default_mount_name.into(),
        }
    }

    pub fn from_config(config: &MountConfig) -> Self {
        Self::new(&config.intermediate_root, &config.default_mount_name)
    }

    /// `<dnsname>@tcp:/<mountname>`, falling back to the default export
    /// segment when `mount_name` is absent or empty
    pub fn compute_source(&self, dns_name: &str, mount_name: Option<&str>) -> String {
        let mount_name = match mount_name {
            Some(name) if !name.is_empty() => name,
            _ => &self.default_mount_name,
        };
        format!("{}@{}:/{}", dns_name, LNET_TRANSPORT, mount_name)
    }

    /// `<root>/<volume_id>`
    ///
    /// The volume id is appended textually, never joined as a path, so an
    /// id that happens to look absolute still lands under the root.
    pub fn compute_intermediate_path(&self, volume_id: &VolumeId) -> PathBuf {
        if self.intermediate_root == "/" {
            return PathBuf::from(format!("/{}", volume_id));
        }
        PathBuf::from(format!("{}/{}", self.intermediate_root, volume_id))
    }

    /// Options for the remote mount: `ro` first when read-only, then each
    /// mount flag in first-seen order with duplicates dropped.
    pub fn compute_options(&self, readonly: bool, mount_flags: &[String]) -> Vec<String> {
        let mut options: Vec<String> = Vec::with_capacity(mount_flags.len() + 1);
        if readonly {
            options.push("ro".to_string());
        }
        for flag in mount_flags {
            if !options.contains(flag) {
                options.push(flag.clone());
            }
        }
        options
    }

    pub fn plan_publish(&self, target: &PublishTarget<'_>) -> MountPlan {
        MountPlan {
            source: self.compute_source(target.dns_name, target.mount_name),
            intermediate_path: self.compute_intermediate_path(target.volume_id),
            target_path: PathBuf::from(target.target_path),
            options: self.compute_options(target.readonly, target.mount_flags),
        }
    }

    pub fn plan_unpublish(&self, target: &UnpublishTarget<'_>) -> UnmountPlan {
        UnmountPlan {
            target_path: PathBuf::from(target.target_path),
            intermediate_path: self.compute_intermediate_path(target.volume_id),
        }
    }
}

impl Default for MountPlanner {
    fn default() -> Self {
        Self::from_config(&MountConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_compute_source() {
        let planner = MountPlanner::default();

        assert_eq!(
            planner.compute_source("fs-1.example.com", Some("fsx")),
            "fs-1.example.com@tcp:/fsx"
        );
        assert_eq!(
            planner.compute_source("fs-1.example.com", Some("random")),
            "fs-1.example.com@tcp:/random"
        );
        assert_eq!(planner.compute_source("fs-1.example.com", None), "fs-1.example.com@tcp:/fsx");
        assert_eq!(planner.compute_source("fs-1.example.com", Some("")), "fs-1.example.com@tcp:/fsx");
    }

    #[test]
    fn test_configured_default_mount_name() {
        let planner = MountPlanner::new("/tmp/mnt/fsx", "scratch");
        assert_eq!(planner.compute_source("fs-2", None), "fs-2@tcp:/scratch");
    }

    #[test]
    fn test_compute_intermediate_path() {
        let planner = MountPlanner::default();
        assert_eq!(
            planner.compute_intermediate_path(&VolumeId::new("vol1")),
            PathBuf::from("/tmp/mnt/fsx/vol1")
        );

        let planner = MountPlanner::new("/var/lib/fsx/", "fsx");
        assert_eq!(
            planner.compute_intermediate_path(&VolumeId::new("vol1")),
            PathBuf::from("/var/lib/fsx/vol1")
        );

        let planner = MountPlanner::new("/", "fsx");
        assert_eq!(
            planner.compute_intermediate_path(&VolumeId::new("vol1")),
            PathBuf::from("/vol1")
        );
    }

    #[test]
    fn test_intermediate_path_uses_template_not_join() {
        let planner = MountPlanner::default();
        assert_eq!(
            planner.compute_intermediate_path(&VolumeId::new("/etc")),
            PathBuf::from("/tmp/mnt/fsx//etc")
        );
    }

    #[test]
    fn test_compute_options() {
        let planner = MountPlanner::default();

        assert!(planner.compute_options(false, &[]).is_empty());
        assert_eq!(planner.compute_options(true, &[]), flags(&["ro"]));
        assert_eq!(planner.compute_options(true, &flags(&["ro", "flock"])), flags(&["ro", "flock"]));
        assert_eq!(
            planner.compute_options(false, &flags(&["flock", "noatime", "flock"])),
            flags(&["flock", "noatime"])
        );
        // first-seen order, not sorted
        assert_eq!(
            planner.compute_options(false, &flags(&["noatime", "flock"])),
            flags(&["noatime", "flock"])
        );
    }

    #[test]
    fn test_plans_share_intermediate_path() {
        let planner = MountPlanner::default();
        let volume_id = VolumeId::new("vol1");
        let mount_flags = flags(&["flock"]);

        let publish = planner.plan_publish(&PublishTarget {
            volume_id: &volume_id,
            dns_name: "fs-1.example.com",
            mount_name: None,
            target_path: "/target",
            readonly: false,
            mount_flags: &mount_flags,
        });
        let unpublish = planner.plan_unpublish(&UnpublishTarget {
            volume_id: &volume_id,
            target_path: "/target",
        });

        assert_eq!(publish.source, "fs-1.example.com@tcp:/fsx");
        assert_eq!(publish.options, flags(&["flock"]));
        assert_eq!(publish.target_path, PathBuf::from("/target"));
        assert_eq!(publish.intermediate_path, unpublish.intermediate_path);
        assert_eq!(publish.target_path, unpublish.target_path);
    }
}
