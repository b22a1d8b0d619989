// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `RunnerService` (node-local): `spec.md` §4.6/§6.

use std::pin::Pin;

use async_trait::async_trait;
use mc_core::{Event, InstanceCreateData, InstanceState, Snowflake};
use tokio_stream::Stream;

use crate::error::Result;

/// Instance state plus the informational player count, returned by
/// `GetStateById`.
#[derive(Debug, Clone, Copy)]
pub struct InstanceStatus {
    /// Current lifecycle state.
    pub state: InstanceState,
    /// Informational player count.
    pub players: i32,
}

/// A boxed stream of events, as returned by `Listen`/`ListenMany`.
pub type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;

/// The node-local runner RPC surface: translates requests into
/// [`crate::Manager`]-equivalent operations (the Manager itself lives in
/// `mc-runner`; this trait is the boundary a gRPC service impl would sit
/// behind).
#[async_trait]
pub trait RunnerService: Send + Sync {
    /// `Launch(id, name, version, version_distro, limits, config)`.
    async fn launch(&self, create_data: InstanceCreateData) -> Result<()>;

    /// `Stop(id)`.
    async fn stop(&self, id: Snowflake) -> Result<()>;

    /// `GetStateById(id) -> {state, players}`.
    async fn get_state_by_id(&self, id: Snowflake) -> Result<InstanceStatus>;

    /// `SendCommand(instance_id, command)`.
    async fn send_command(&self, id: Snowflake, command: &str) -> Result<()>;

    /// `Listen(instance_id, include_logs) -> stream Event`.
    async fn listen(&self, id: Snowflake, include_logs: bool) -> Result<EventStream>;

    /// `ListenMany(instance_ids, include_logs) -> stream Event`, multiplexed
    /// from one subscriber per instance onto a single stream.
    async fn listen_many(&self, ids: Vec<Snowflake>, include_logs: bool) -> Result<EventStream>;
}
