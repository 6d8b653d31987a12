// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod request_validator;
pub mod mount_planner;
pub mod mount_executor;
pub mod node_service;

pub use mount_executor::MountExecutor;
pub use mount_planner::MountPlanner;
pub use node_service::NodeService;
pub use request_validator::{PublishTarget, RequestValidator, UnpublishTarget};
