// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridges [`db`] to [`mc_rpc::UserService`] (`spec.md` §6): admin CRUD
//! over user accounts.

use async_trait::async_trait;
use mc_core::Snowflake;
use mc_rpc::auth_service::User;
use mc_rpc::error::Result as RpcResult;
use mc_rpc::node_service::UserService;
use sqlx::PgPool;

use crate::db;

/// The API's [`UserService`], backed by Postgres.
pub struct ApiUserService {
    pool: PgPool,
}

impl ApiUserService {
    /// Build the service.
    pub fn new(pool: PgPool) -> Self {
        ApiUserService { pool }
    }
}

#[async_trait]
impl UserService for ApiUserService {
    async fn get_by_id(&self, id: Snowflake) -> RpcResult<User> {
        Ok(db::user_get_by_id(&self.pool, id).await?)
    }

    async fn list(&self) -> RpcResult<Vec<User>> {
        Ok(db::user_list(&self.pool).await?)
    }

    async fn set_admin(&self, id: Snowflake, admin: bool) -> RpcResult<()> {
        Ok(db::user_set_admin(&self.pool, id, admin).await?)
    }

    async fn delete(&self, id: Snowflake) -> RpcResult<()> {
        Ok(db::user_delete(&self.pool, id).await?)
    }
}
