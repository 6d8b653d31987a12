// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`fsx-csi-core`)
//!
//! CSI v1 gRPC surface. Translates wire messages into application service
//! calls and domain errors back into gRPC statuses. **No mount logic lives
//! here.**
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`grpc`] | gRPC (Tonic) | CSI Identity and Node services, served on a unix socket |

pub mod grpc;
