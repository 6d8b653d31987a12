// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Mount Executor
//!
//! Drives the [`Mounter`] through the two-stage publish and unpublish
//! sequences. This is the only place in the node service with side effects.
//!
//! Per volume, the host moves through three observable states:
//!
//! ```text
//! UNMOUNTED --publish 1-3--> REMOTE_MOUNTED --publish 4--> BOUND
//! BOUND --unpublish 1--> REMOTE_MOUNTED --unpublish 2--> UNMOUNTED
//! ```
//!
//! A failed step leaves the volume in the state reached by the last
//! successful step. Nothing is rolled back beyond removing the target
//! directory after a failed bind; an identical retried call picks up where
//! the previous one stopped because the mounter treats already-satisfied
//! steps as successes.

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::mounter::Mounter;
use crate::domain::node::NodeError;
use crate::domain::node_config::MountConfig;
use crate::domain::volume::{MountPlan, UnmountPlan};

pub struct MountExecutor {
    mounter: Arc<dyn Mounter>,
    fs_type: String,
    bind_fs_type: String,
}

impl MountExecutor {
    pub fn new(
        mounter: Arc<dyn Mounter>,
        fs_type: impl Into<String>,
        bind_fs_type: impl Into<String>,
    ) -> Self {
        Self {
            mounter,
            fs_type: fs_type.into(),
            bind_fs_type: bind_fs_type.into(),
        }
    }

    pub fn from_config(mounter: Arc<dyn Mounter>, config: &MountConfig) -> Self {
        Self::new(mounter, &config.fs_type, &config.bind_fs_type)
    }

    /// Create both directories, mount the export at the intermediate path,
    /// then bind it onto the target.
    pub async fn publish(&self, plan: &MountPlan) -> Result<(), NodeError> {
        let target = &plan.target_path;
        let intermediate = &plan.intermediate_path;

        debug!("Creating target dir {}", target.display());
        self.mounter.make_dir(target).await.map_err(|e| {
            error!("Could not create dir {}: {}", target.display(), e);
            NodeError::internal(format!("Could not create dir {:?}", target), e)
        })?;

        debug!("Creating intermediate dir {}", intermediate.display());
        self.mounter.make_dir(intermediate).await.map_err(|e| {
            error!("Could not create intermediate dir {}: {}", intermediate.display(), e);
            NodeError::internal(format!("Could not create intermediate dir {:?}", intermediate), e)
        })?;

        // Both directories stay behind on failure so a retry can go
        // straight to the mount.
        debug!(
            source = %plan.source,
            options = ?plan.options,
            "Mounting {} at {}",
            self.fs_type,
            intermediate.display()
        );
        self.mounter
            .mount(&plan.source, intermediate, &self.fs_type, &plan.options)
            .await
            .map_err(|e| {
                error!("Could not mount {} at {}: {}", plan.source, intermediate.display(), e);
                NodeError::internal(
                    format!("Could not mount {:?} at {:?}", plan.source, intermediate),
                    e,
                )
            })?;

        // The bind mount always gets an empty option list, even when the
        // remote mount is read-only.
        // TODO: confirm with product whether "ro" should also apply to the bind.
        let bind_source = intermediate.to_string_lossy();
        debug!("Bind mounting {} at {}", intermediate.display(), target.display());
        if let Err(e) = self
            .mounter
            .mount(&bind_source, target, &self.bind_fs_type, &[])
            .await
        {
            // The remote mount is left in place for the retry.
            if let Err(cleanup) = self.mounter.remove_dir(target).await {
                warn!("Failed to remove target dir {} after bind failure: {}", target.display(), cleanup);
            }
            error!("Could not bind mount {} at {}: {}", intermediate.display(), target.display(), e);
            return Err(NodeError::internal(
                format!("Could not bind mount {:?} at {:?}", intermediate, target),
                e,
            ));
        }

        Ok(())
    }

    /// Unmount the target, then the intermediate path. Stops at the first
    /// failure; the intermediate mount is never touched while the target is
    /// still bound.
    pub async fn unpublish(&self, plan: &UnmountPlan) -> Result<(), NodeError> {
        let target = &plan.target_path;
        let intermediate = &plan.intermediate_path;

        debug!("Unmounting target {}", target.display());
        self.mounter.unmount(target).await.map_err(|e| {
            error!("Could not unmount {}: {}", target.display(), e);
            NodeError::internal(format!("Could not unmount {:?}", target), e)
        })?;

        debug!("Unmounting intermediate {}", intermediate.display());
        self.mounter.unmount(intermediate).await.map_err(|e| {
            error!("Could not unmount {}: {}", intermediate.display(), e);
            NodeError::internal(format!("Could not unmount {:?}", intermediate), e)
        })?;

        Ok(())
    }
}
