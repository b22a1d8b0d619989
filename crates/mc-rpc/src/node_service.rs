// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `NodeService` and `UserService`: admin CRUD, `spec.md` §6.

use async_trait::async_trait;
use mc_core::Snowflake;

use crate::auth_service::User;
use crate::error::Result;

/// An API-side persistent node record (`spec.md` §3 "Node").
#[derive(Debug, Clone)]
pub struct Node {
    /// Node id.
    pub id: Snowflake,
    /// Reachable hostname/IP.
    pub endpoint: String,
    /// gRPC port on the node.
    pub grpc_port: u16,
    /// Shared secret used as a bearer token when dialing the node.
    pub token: String,
    /// Human-readable label.
    pub name: String,
}

/// Admin CRUD over node registration. Rows are created/deleted by the API
/// only; runners never mutate them.
#[async_trait]
pub trait NodeService: Send + Sync {
    /// Register a new node.
    async fn create(&self, endpoint: &str, grpc_port: u16, name: &str) -> Result<Node>;

    /// Fetch a node by id.
    async fn get_by_id(&self, id: Snowflake) -> Result<Node>;

    /// List all registered nodes.
    async fn list(&self) -> Result<Vec<Node>>;

    /// Remove a node. Deleting the special "local node" is
    /// `PermissionDenied`.
    async fn delete(&self, id: Snowflake) -> Result<()>;
}

/// Admin CRUD over user accounts.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Fetch a user by id.
    async fn get_by_id(&self, id: Snowflake) -> Result<User>;

    /// List all users.
    async fn list(&self) -> Result<Vec<User>>;

    /// Grant or revoke admin rights.
    async fn set_admin(&self, id: Snowflake, admin: bool) -> Result<()>;

    /// Delete a user account.
    async fn delete(&self, id: Snowflake) -> Result<()>;
}
