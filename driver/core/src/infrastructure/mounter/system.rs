// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Host Mounter
//!
//! [`Mounter`] implementation that shells out to `mount(8)` and `umount(8)`
//! and consults `/proc/mounts` to keep repeated calls harmless.
//!
//! **Requirements:**
//! - Runs privileged, in the host mount namespace (bidirectional mount
//!   propagation on the kubelet directory)
//! - `mount.lustre` helper installed for the remote mount
//!
//! **Limitations:**
//! - Mount point detection compares paths as written; a target reached
//!   through a symlink is not recognised as already mounted

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::mounter::{MountError, Mounter};
use crate::infrastructure::mounter::mount_table::{self, PROC_MOUNTS};

pub struct SystemMounter {
    /// Mount table consulted for idempotency checks
    mount_table: PathBuf,
    mount_bin: String,
    umount_bin: String,
    /// Filesystem kind that is translated into `mount --bind`
    bind_fs_type: String,
}

impl SystemMounter {
    pub fn new(bind_fs_type: impl Into<String>) -> Self {
        Self {
            mount_table: PathBuf::from(PROC_MOUNTS),
            mount_bin: "mount".to_string(),
            umount_bin: "umount".to_string(),
            bind_fs_type: bind_fs_type.into(),
        }
    }

    /// Read a different mount table, e.g. `/proc/1/mounts` from inside a
    /// container that shares the host's mount namespace through `/host`
    pub fn with_mount_table(mut self, mount_table: impl Into<PathBuf>) -> Self {
        self.mount_table = mount_table.into();
        self
    }

    /// Use different `mount`/`umount` binaries
    pub fn with_binaries(mut self, mount_bin: impl Into<String>, umount_bin: impl Into<String>) -> Self {
        self.mount_bin = mount_bin.into();
        self.umount_bin = umount_bin.into();
        self
    }

    async fn is_mount_point(&self, path: &Path) -> Result<bool, MountError> {
        let entries = mount_table::read_mounts(&self.mount_table).await?;
        Ok(mount_table::is_mount_point(&entries, path))
    }

    /// Arguments for `mount(8)`, without the binary itself
    pub fn mount_args(&self, source: &str, target: &Path, fs_type: &str, options: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(6);
        if fs_type == self.bind_fs_type {
            args.push("--bind".to_string());
        } else {
            args.push("-t".to_string());
            args.push(fs_type.to_string());
        }
        if !options.is_empty() {
            args.push("-o".to_string());
            args.push(options.join(","));
        }
        args.push(source.to_string());
        args.push(target.to_string_lossy().into_owned());
        args
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<(), MountError> {
        let command = format!("{} {}", program, args.join(" "));
        debug!("Running {}", command);

        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|source| MountError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let mut text = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if text.is_empty() {
            text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
        Err(MountError::CommandFailed {
            command,
            status: output.status.to_string(),
            output: text,
        })
    }
}

impl Default for SystemMounter {
    fn default() -> Self {
        Self::new("bind")
    }
}

#[async_trait]
impl Mounter for SystemMounter {
    async fn make_dir(&self, path: &Path) -> Result<(), MountError> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);

        builder.create(path).await.map_err(|source| MountError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn mount(
        &self,
        source: &str,
        target: &Path,
        fs_type: &str,
        options: &[String],
    ) -> Result<(), MountError> {
        if self.is_mount_point(target).await? {
            debug!("{} is already mounted, skipping", target.display());
            return Ok(());
        }

        let args = self.mount_args(source, target, fs_type, options);
        self.run(&self.mount_bin, &args).await
    }

    async fn unmount(&self, path: &Path) -> Result<(), MountError> {
        if !self.is_mount_point(path).await? {
            debug!("{} is not mounted, skipping", path.display());
            return Ok(());
        }

        let args = [path.to_string_lossy().into_owned()];
        self.run(&self.umount_bin, &args).await
    }

    async fn remove_dir(&self, path: &Path) -> Result<(), MountError> {
        match tokio::fs::remove_dir(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(MountError::RemoveDir {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
