// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! FSx for Lustre CSI node core
//!
//! Publishes a remote Lustre export into a container's target path through
//! an intermediate per-volume mount, and tears it down again.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Request validation, mount planning and two-stage mount
//!   orchestration behind the CSI Node service

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
