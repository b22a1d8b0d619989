// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `InstanceService` (API-facing): `spec.md` §6.
//!
//! The API server validates the caller via metadata and forwards to the
//! appropriate node through the Dispatch Cache; this trait is the surface
//! its handlers implement.

use async_trait::async_trait;
use mc_core::{InstanceConfig, InstanceLimits, InstanceState, Snowflake};

use crate::error::Result;
use crate::runner_service::EventStream;

/// Request payload for `Create`.
#[derive(Debug, Clone)]
pub struct CreateInstanceRequest {
    /// Display name.
    pub name: String,
    /// Node this instance is bound to at creation time (never migrated).
    pub node_id: Snowflake,
    /// Distribution tag, e.g. "paper".
    pub distribution: mc_core::Distribution,
    /// Version id within the distribution, or `None` for latest.
    pub version_id: Option<String>,
    /// Resource limits.
    pub limits: InstanceLimits,
    /// Server configuration.
    pub config: InstanceConfig,
}

/// A row in the API's persistent instance catalog.
#[derive(Debug, Clone)]
pub struct InstanceRecord {
    /// Instance id.
    pub id: Snowflake,
    /// Display name.
    pub name: String,
    /// The node this instance is bound to.
    pub node_id: Snowflake,
    /// Owning user.
    pub owner: Snowflake,
    /// Last known state, as reported by the node.
    pub state: InstanceState,
    /// Distribution tag, carried so `Launch` can re-resolve the version.
    pub distribution: mc_core::Distribution,
    /// Version id pinned at creation time, or `None` for "latest".
    pub version_id: Option<String>,
    /// Resource limits, persisted at creation time.
    pub limits: InstanceLimits,
    /// Server configuration, persisted at creation time.
    pub config: InstanceConfig,
}

/// API-facing instance catalog and lifecycle dispatch.
#[async_trait]
pub trait InstanceService: Send + Sync {
    /// Persist a new instance row bound to a node; does not launch it.
    async fn create(&self, caller: Snowflake, req: CreateInstanceRequest) -> Result<InstanceRecord>;

    /// Fetch a single instance row, enforcing ownership.
    async fn get_by_id(&self, caller: Snowflake, id: Snowflake) -> Result<InstanceRecord>;

    /// Dispatch `Launch` to the bound node via the Dispatch Cache.
    async fn launch(&self, caller: Snowflake, id: Snowflake) -> Result<()>;

    /// Dispatch `Stop` to the bound node via the Dispatch Cache.
    async fn stop(&self, caller: Snowflake, id: Snowflake) -> Result<()>;

    /// Remove the row; best-effort fires an asynchronous `Stop` on the node
    /// whose failure is logged, not reported to the caller.
    async fn delete(&self, caller: Snowflake, id: Snowflake) -> Result<()>;

    /// Dispatch `SendCommand` to the bound node.
    async fn send_command(&self, caller: Snowflake, id: Snowflake, command: &str) -> Result<()>;

    /// Dispatch `Listen`/`ListenMany` to the bound node and forward the
    /// resulting stream to the caller.
    async fn get_events(&self, caller: Snowflake, id: Snowflake, include_logs: bool) -> Result<EventStream>;
}
