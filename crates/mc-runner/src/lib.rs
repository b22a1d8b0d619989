// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-node runner: the Instance Manager, the Container Runtime Adapter and
//! the node-local `RunnerService` surface (`spec.md` §1, §4).
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                      mc-api (control plane)                       │
//! └───────────────────────────────────────────────────────────────────┘
//!                              │ RunnerService (per spec.md §4.6)
//!                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                       mc-runner (this crate)                      │
//! │  ┌───────────┐     ┌────────────┐     ┌─────────────────────┐    │
//! │  │  Manager  │────▶│  Instance  │     │  RuntimeAdapter      │    │
//! │  │ (registry)│     │ (live obj) │◀────│  (Docker/bollard)    │    │
//! │  └───────────┘     └────────────┘     └─────────────────────┘    │
//! └───────────────────────────────────────────────────────────────────┘
//!                              │ create/launch/stop
//!                              ▼
//!                     ┌─────────────────────┐
//!                     │   Docker Engine      │
//!                     │ (container per       │
//!                     │  instance, bridged    │
//!                     │  to a managed network)│
//!                     └─────────────────────┘
//! ```
//!
//! # Instance Lifecycle
//!
//! ```text
//!    ┌─────────┐  create+launch   ┌──────────┐  container ready  ┌─────────┐
//!    │ OFFLINE │ ───────────────▶ │ STARTING │ ────────────────▶ │ RUNNING │
//!    └─────────┘                  └──────────┘                   └────┬────┘
//!         ▲                                                           │ stop
//!         │                      ┌────────────────┐                  │
//!         └──────────────────────│  SHUTTING_DOWN │◀─────────────────┘
//!                                 └────────────────┘
//! ```
//!
//! # Configuration
//!
//! Loaded from a YAML or JSON file selected by extension (`-config <path>`,
//! default `/etc/mc/config.yaml`, override via `CONFIG_FILE`); see
//! [`config`].
//!
//! # Modules
//!
//! - [`config`]: runner configuration, loaded from file + environment
//! - [`error`]: [`error::RunnerError`], this crate's error type
//! - [`instance`]: [`instance::Instance`], the per-server live object
//! - [`manager`]: [`manager::Manager`], the in-memory instance registry
//! - [`runtime`]: the [`runtime::RuntimeAdapter`] trait and its Docker/mock
//!   implementations
//! - [`service`]: the [`mc_rpc::RunnerService`] implementation bridging
//!   [`manager::Manager`] to the RPC surface

#![deny(missing_docs)]

/// Runner configuration, loaded from file + environment.
pub mod config;

/// This crate's error type.
pub mod error;

/// The per-server live object.
pub mod instance;

/// The node-local `DistributionService` implementation.
pub mod distribution_service;

/// The in-memory instance registry.
pub mod manager;

/// The Container Runtime Adapter trait and implementations.
pub mod runtime;

/// The node-local `RunnerService` implementation.
pub mod service;

pub use config::Config;
pub use distribution_service::LocalDistributionService;
pub use error::{Result, RunnerError};
pub use instance::Instance;
pub use manager::Manager;
pub use service::LocalRunnerService;
