// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The control-plane API: node/user persistence, auth and the Dispatch
//! Cache (`spec.md` §1, §3, §6).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   Bearer JWT / Server token   ┌────────────────────────┐
//! │  Client  │───────────────────────────────▶│     mc-api (this)      │
//! └──────────┘                                 │  ┌──────────────────┐ │
//!                                               │  │ Auth/Node/User/  │ │
//!                                               │  │ InstanceService  │ │
//!                                               │  └────────┬─────────┘ │
//!                                               │           │ node_id   │
//!                                               │  ┌────────▼─────────┐ │
//!                                               │  │  Dispatch Cache   │ │
//!                                               │  └────────┬─────────┘ │
//!                                               └───────────┼──────────┘
//!                                                            │ RunnerService
//!                                               ┌────────────▼──────────┐
//!                                               │  mc-runner (per node)  │
//!                                               └────────────────────────┘
//! ```
//!
//! Persistence is Postgres (users, nodes, the instance catalog); refresh
//! tokens live in a Redis-backed [`kv::KvStore`] (`spec.md` §3/§6).
//!
//! # Configuration
//!
//! Loaded from a YAML or JSON file selected by extension (`-config <path>`,
//! default `/etc/mc/config.yaml`, override via `CONFIG_FILE`); see
//! [`config`].
//!
//! # Modules
//!
//! - [`config`]: API configuration, loaded from file + environment
//! - [`error`]: [`error::ApiError`], this crate's error type
//! - [`db`]: Postgres persistence for users, nodes and instances
//! - [`kv`]: the [`kv::KvStore`] trait and its `redis` implementation
//! - [`auth`]: JWT issuance/validation and the refresh-token exchange
//! - [`dispatch`]: the Dispatch Cache, lazily dialing node `RunnerService`s
//! - [`auth_service`], [`node_service`], [`user_service`],
//!   [`instance_service`]: the RPC-surface implementations bridging the
//!   above to [`mc_rpc`]'s traits

#![deny(missing_docs)]

/// JWT issuance/validation and the refresh-token exchange.
pub mod auth;

/// The API's `AuthService` implementation.
pub mod auth_service;

/// API configuration, loaded from file + environment.
pub mod config;

/// Postgres persistence for users, nodes and instances.
pub mod db;

/// The Dispatch Cache: lazy `node_id -> RunnerService` client map.
pub mod dispatch;

/// This crate's error type.
pub mod error;

/// The API's `InstanceService` implementation.
pub mod instance_service;

/// The key-value store backing refresh tokens.
pub mod kv;

/// The API's `NodeService` implementation.
pub mod node_service;

/// The API's `UserService` implementation.
pub mod user_service;

pub use auth::JwtAuther;
pub use auth_service::ApiAuthService;
pub use config::Config;
pub use dispatch::{DispatchCache, RunnerConnector, UnimplementedConnector};
pub use error::{ApiError, Result};
pub use instance_service::ApiInstanceService;
pub use kv::{KvStore, RedisKvStore};
pub use node_service::ApiNodeService;
pub use user_service::ApiUserService;
