// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

/// Generated CSI v1 protobuf code
pub mod csi {
    tonic::include_proto!("csi.v1");
}

pub mod identity;
pub mod node;
pub mod server;

pub use identity::CsiIdentityService;
pub use node::CsiNodeService;
pub use server::{start_grpc_server, Endpoint};
