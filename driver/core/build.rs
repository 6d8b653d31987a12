// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Build Script for fsx-csi-core
//!
//! Compiles the vendored Container Storage Interface definitions into tonic
//! server stubs. Only the Identity and Node services are generated; this
//! crate ships no controller.
//!
//! Generated code is placed in `OUT_DIR` and included via
//! `tonic::include_proto!("csi.v1")` in `src/presentation/grpc/mod.rs`.
//!
//! # Dependencies
//!
//! - **protoc**: Protocol buffer compiler (vendored via `protoc-bin-vendored`)
//! - **tonic-prost-build**: Code generator for Rust gRPC stubs

use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set PROTOC environment variable to point to the vendored protoc binary
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);

    // wrappers.proto ships with the vendored protoc
    let well_known = protoc_bin_vendored::include_path()?;

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(false)
        .compile_protos(&[PathBuf::from("proto/csi.proto")], &[PathBuf::from("proto"), well_known])?;

    println!("cargo:rerun-if-changed=proto/csi.proto");

    Ok(())
}
