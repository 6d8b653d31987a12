// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Mounter Trait - Anti-Corruption Layer for host mount operations
//!
//! Isolates the publish/unpublish orchestration from the mechanics of
//! creating directories and calling mount(8)/umount(8) on the host.
//!
//! The node service keeps no record of what it has mounted. Retried
//! publish and unpublish calls stay safe only because every implementation
//! of this trait honours the repeatability contract below against the real
//! mount table.
//!
//! # Repeatability contract
//!
//! | Operation | Precondition already satisfied | Result |
//! |-----------|--------------------------------|--------|
//! | `make_dir` | directory exists | `Ok(())` |
//! | `mount` | target is already a mount point | `Ok(())`, nothing mounted |
//! | `unmount` | path is not a mount point | `Ok(())` |
//! | `remove_dir` | directory does not exist | `Ok(())` |

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Host mount operations consumed by the node service
#[async_trait]
pub trait Mounter: Send + Sync {
    /// Create a directory and any missing parents
    ///
    /// # Arguments
    /// * `path` - Directory to create
    ///
    /// # Returns
    /// * `Ok(())` if the directory exists afterwards, whether or not it was
    ///   created by this call
    /// * `Err(MountError)` if creation failed for any other reason
    async fn make_dir(&self, path: &Path) -> Result<(), MountError>;

    /// Mount `source` at `target`
    ///
    /// # Arguments
    /// * `source` - Device, export address or (for bind mounts) directory
    /// * `target` - Existing directory to mount onto
    /// * `fs_type` - Filesystem kind, e.g. "lustre" or "bind"
    /// * `options` - Mount options, passed through in order
    ///
    /// # Returns
    /// * `Ok(())` if `target` is mounted afterwards
    /// * `Err(MountError)` if the mount failed
    async fn mount(
        &self,
        source: &str,
        target: &Path,
        fs_type: &str,
        options: &[String],
    ) -> Result<(), MountError>;

    /// Unmount whatever is mounted at `path`
    ///
    /// # Returns
    /// * `Ok(())` if `path` is not a mount point afterwards
    /// * `Err(MountError)` if the unmount failed
    async fn unmount(&self, path: &Path) -> Result<(), MountError>;

    /// Remove an empty directory
    ///
    /// Only used to clean up a target directory after a failed bind mount.
    async fn remove_dir(&self, path: &Path) -> Result<(), MountError>;
}

/// Mounter errors
#[derive(Debug, Error)]
pub enum MountError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove directory {path}: {source}")]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("failed to read mount table {path}: {source}")]
    MountTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mount point does not exist: {0}")]
    MissingMountPoint(PathBuf),

    #[error("{0}")]
    Unknown(String),
}
