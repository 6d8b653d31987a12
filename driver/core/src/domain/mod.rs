// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Value objects, collaborator traits and errors shared by the node service.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements mod

pub mod volume;
pub mod mounter;
pub mod node;
pub mod node_config;
