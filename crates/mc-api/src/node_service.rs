// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridges [`db`] to [`mc_rpc::NodeService`] (`spec.md` §6): admin CRUD
//! over node registration.

use async_trait::async_trait;
use mc_core::Snowflake;
use mc_rpc::error::Result as RpcResult;
use mc_rpc::node_service::{Node, NodeService};
use sqlx::PgPool;

use crate::db;
use crate::error::ApiError;

/// The API's [`NodeService`], backed by Postgres.
pub struct ApiNodeService {
    pool: PgPool,
    /// The special local-node id, whose deletion is rejected
    /// (`spec.md` §6: "Deleting the special 'local node' is
    /// `PermissionDenied`").
    local_node_id: Snowflake,
}

impl ApiNodeService {
    /// Build the service. `local_node_id` is `Snowflake::NULL` when no
    /// local node is embedded.
    pub fn new(pool: PgPool, local_node_id: Snowflake) -> Self {
        ApiNodeService { pool, local_node_id }
    }
}

#[async_trait]
impl NodeService for ApiNodeService {
    async fn create(&self, endpoint: &str, grpc_port: u16, name: &str) -> RpcResult<Node> {
        let id = Snowflake::generate();
        let token = generate_node_token();
        Ok(db::node_create(&self.pool, id, endpoint, grpc_port, &token, name).await?)
    }

    async fn get_by_id(&self, id: Snowflake) -> RpcResult<Node> {
        Ok(db::node_get_by_id(&self.pool, id).await?)
    }

    async fn list(&self) -> RpcResult<Vec<Node>> {
        Ok(db::node_list(&self.pool).await?)
    }

    async fn delete(&self, id: Snowflake) -> RpcResult<()> {
        if !self.local_node_id.is_null() && id == self.local_node_id {
            return Err(ApiError::PermissionDenied("the local node cannot be deleted".into()).into());
        }
        Ok(db::node_delete(&self.pool, id).await?)
    }
}

/// Mint a random shared secret a node presents as its bearer credential
/// when dialed through the Dispatch Cache.
fn generate_node_token() -> String {
    use base64::Engine;
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
