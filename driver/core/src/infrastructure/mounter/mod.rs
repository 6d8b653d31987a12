// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Mounter implementations
//!
//! - [`SystemMounter`]: mount(8)/umount(8) on the host
//! - [`RecordingMounter`]: in-memory model for tests

pub mod mount_table;
pub mod recording;
pub mod system;

pub use recording::{MountCall, MounterOp, RecordingMounter};
pub use system::SystemMounter;
