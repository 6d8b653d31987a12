// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory Mounter for tests
//!
//! Records every call in order and keeps a model of directories and mount
//! points, honouring the same repeatability contract as the host mounter.
//! Failures can be injected per operation and path; an injected failure
//! keeps firing until it is cleared.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::domain::mounter::{MountError, Mounter};

/// One call observed by [`RecordingMounter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountCall {
    MakeDir(PathBuf),
    Mount {
        source: String,
        target: PathBuf,
        fs_type: String,
        options: Vec<String>,
    },
    Unmount(PathBuf),
    RemoveDir(PathBuf),
}

impl MountCall {
    pub fn make_dir(path: &str) -> Self {
        Self::MakeDir(PathBuf::from(path))
    }

    pub fn mount(source: &str, target: &str, fs_type: &str, options: &[&str]) -> Self {
        Self::Mount {
            source: source.to_string(),
            target: PathBuf::from(target),
            fs_type: fs_type.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn unmount(path: &str) -> Self {
        Self::Unmount(PathBuf::from(path))
    }

    pub fn remove_dir(path: &str) -> Self {
        Self::RemoveDir(PathBuf::from(path))
    }
}

/// Operation selector for failure injection. `Mount` is matched on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MounterOp {
    MakeDir,
    Mount,
    Unmount,
    RemoveDir,
}

#[derive(Default)]
struct State {
    calls: Vec<MountCall>,
    dirs: BTreeSet<PathBuf>,
    /// mount point -> source
    mounts: BTreeMap<PathBuf, String>,
    failures: HashMap<(MounterOp, PathBuf), String>,
}

impl State {
    fn injected(&self, op: MounterOp, path: &Path) -> Result<(), MountError> {
        match self.failures.get(&(op, path.to_path_buf())) {
            Some(message) => Err(MountError::Unknown(message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct RecordingMounter {
    state: Mutex<State>,
}

impl RecordingMounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far, failed ones included
    pub fn calls(&self) -> Vec<MountCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Make `op` on `path` fail with `message` until cleared
    pub fn fail_on(&self, op: MounterOp, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.state
            .lock()
            .failures
            .insert((op, path.into()), message.into());
    }

    pub fn clear_failure(&self, op: MounterOp, path: impl Into<PathBuf>) {
        self.state.lock().failures.remove(&(op, path.into()));
    }

    pub fn dir_exists(&self, path: impl AsRef<Path>) -> bool {
        self.state.lock().dirs.contains(path.as_ref())
    }

    pub fn is_mounted(&self, path: impl AsRef<Path>) -> bool {
        self.state.lock().mounts.contains_key(path.as_ref())
    }

    /// Source mounted at `path`, if any
    pub fn mounted_source(&self, path: impl AsRef<Path>) -> Option<String> {
        self.state.lock().mounts.get(path.as_ref()).cloned()
    }
}

#[async_trait]
impl Mounter for RecordingMounter {
    async fn make_dir(&self, path: &Path) -> Result<(), MountError> {
        let mut state = self.state.lock();
        state.calls.push(MountCall::MakeDir(path.to_path_buf()));
        state.injected(MounterOp::MakeDir, path)?;

        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            state.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    async fn mount(
        &self,
        source: &str,
        target: &Path,
        fs_type: &str,
        options: &[String],
    ) -> Result<(), MountError> {
        let mut state = self.state.lock();
        state.calls.push(MountCall::Mount {
            source: source.to_string(),
            target: target.to_path_buf(),
            fs_type: fs_type.to_string(),
            options: options.to_vec(),
        });
        state.injected(MounterOp::Mount, target)?;

        if state.mounts.contains_key(target) {
            return Ok(());
        }
        if !state.dirs.contains(target) {
            return Err(MountError::MissingMountPoint(target.to_path_buf()));
        }
        state.mounts.insert(target.to_path_buf(), source.to_string());
        Ok(())
    }

    async fn unmount(&self, path: &Path) -> Result<(), MountError> {
        let mut state = self.state.lock();
        state.calls.push(MountCall::Unmount(path.to_path_buf()));
        state.injected(MounterOp::Unmount, path)?;

        state.mounts.remove(path);
        Ok(())
    }

    async fn remove_dir(&self, path: &Path) -> Result<(), MountError> {
        let mut state = self.state.lock();
        state.calls.push(MountCall::RemoveDir(path.to_path_buf()));
        state.injected(MounterOp::RemoveDir, path)?;

        if state.mounts.contains_key(path) {
            return Err(MountError::RemoveDir {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::ResourceBusy, "mount point is busy"),
            });
        }
        let has_children = state
            .dirs
            .iter()
            .any(|d| d != path && d.starts_with(path));
        if has_children {
            return Err(MountError::RemoveDir {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::DirectoryNotEmpty, "directory not empty"),
            });
        }
        state.dirs.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_make_dir_creates_ancestors() {
        let mounter = RecordingMounter::new();
        mounter.make_dir(Path::new("/tmp/mnt/fsx/vol1")).await.unwrap();
        mounter.make_dir(Path::new("/tmp/mnt/fsx/vol1")).await.unwrap();

        assert!(mounter.dir_exists("/tmp/mnt/fsx"));
        assert!(mounter.dir_exists("/tmp/mnt/fsx/vol1"));
        assert_eq!(mounter.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_mount_requires_directory() {
        let mounter = RecordingMounter::new();
        let result = mounter.mount("src", Path::new("/missing"), "lustre", &[]).await;

        assert!(matches!(result, Err(MountError::MissingMountPoint(_))));
        assert!(!mounter.is_mounted("/missing"));
    }

    #[tokio::test]
    async fn test_mount_over_existing_mount_keeps_first_source() {
        let mounter = RecordingMounter::new();
        mounter.make_dir(Path::new("/mnt")).await.unwrap();
        mounter.mount("first", Path::new("/mnt"), "lustre", &[]).await.unwrap();
        mounter.mount("second", Path::new("/mnt"), "lustre", &[]).await.unwrap();

        assert_eq!(mounter.mounted_source("/mnt").as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_unmount_of_unmounted_path_succeeds() {
        let mounter = RecordingMounter::new();
        mounter.unmount(Path::new("/nothing")).await.unwrap();
        assert_eq!(mounter.calls(), vec![MountCall::unmount("/nothing")]);
    }

    #[tokio::test]
    async fn test_remove_dir_refuses_mount_point() {
        let mounter = RecordingMounter::new();
        mounter.make_dir(Path::new("/mnt")).await.unwrap();
        mounter.mount("src", Path::new("/mnt"), "lustre", &[]).await.unwrap();

        let result = mounter.remove_dir(Path::new("/mnt")).await;
        assert!(matches!(result, Err(MountError::RemoveDir { .. })));
        assert!(mounter.dir_exists("/mnt"));

        mounter.remove_dir(Path::new("/never-created")).await.unwrap();
    }

    #[tokio::test]
    async fn test_injected_failure_persists_until_cleared() {
        let mounter = RecordingMounter::new();
        mounter.fail_on(MounterOp::MakeDir, "/target", "permission denied");

        for _ in 0..2 {
            let err = mounter.make_dir(Path::new("/target")).await.unwrap_err();
            assert_eq!(err.to_string(), "permission denied");
        }
        assert!(!mounter.dir_exists("/target"));

        mounter.clear_failure(MounterOp::MakeDir, "/target");
        mounter.make_dir(Path::new("/target")).await.unwrap();
        assert!(mounter.dir_exists("/target"));
        assert_eq!(mounter.calls().len(), 3);
    }
}
