// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! RPC-surface DTOs and `async_trait` service interfaces (`spec.md` §6).
//!
//! This crate defines the boundary a real gRPC/protobuf transport would sit
//! behind; generating that transport code is explicitly out of scope
//! (`spec.md` §1). `mc-runner` implements [`RunnerService`] directly;
//! `mc-api` implements the rest and consumes `RunnerService` through the
//! Dispatch Cache.

#![deny(missing_docs)]

/// `AuthService` and its DTOs.
pub mod auth_service;
/// `DistributionService`.
pub mod distribution_service;
/// Shared RPC error type.
pub mod error;
/// `InstanceService` (API-facing).
pub mod instance_service;
/// `NodeService` / `UserService` (admin CRUD).
pub mod node_service;
/// `RunnerService` (node-local).
pub mod runner_service;

pub use auth_service::{AuthService, Claims, TokenPair, User};
pub use distribution_service::DistributionService;
pub use error::{Result, RpcError};
pub use instance_service::{CreateInstanceRequest, InstanceRecord, InstanceService};
pub use node_service::{Node, NodeService, UserService};
pub use runner_service::{EventStream, InstanceStatus, RunnerService};
