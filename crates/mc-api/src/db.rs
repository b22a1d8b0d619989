// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Postgres persistence for users, nodes and the instance catalog
//! (`spec.md` §3, §6), grounded on
//! `examples/runtarahq-runtara/crates/runtara-environment/src/db.rs`'s
//! `sqlx::query_as::<_, T>` + `#[derive(sqlx::FromRow)]` style.

use mc_core::{Distribution, InstanceConfig, InstanceLimits, InstanceState, Snowflake};
use mc_rpc::auth_service::User;
use mc_rpc::instance_service::InstanceRecord;
use mc_rpc::node_service::Node;
use sqlx::PgPool;

use crate::error::{ApiError, Result};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    admin: bool,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: Snowflake::from(self.id),
            username: self.username,
            email: self.email,
            admin: self.admin,
        }
    }
}

/// Fetch a user by email, including the password hash (login path).
pub async fn user_get_by_email_with_hash(pool: &PgPool, email: &str) -> Result<(User, String)> {
    let row: UserRow = sqlx::query_as(
        "SELECT id, username, email, password_hash, admin FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("user with email {email}")))?;

    let hash = row.password_hash.clone();
    Ok((row.into_user(), hash))
}

/// Fetch a user by id.
pub async fn user_get_by_id(pool: &PgPool, id: Snowflake) -> Result<User> {
    let row: UserRow =
        sqlx::query_as("SELECT id, username, email, password_hash, admin FROM users WHERE id = $1")
            .bind::<i64>(id.into())
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("user {id}")))?;
    Ok(row.into_user())
}

/// Insert a new user row.
pub async fn user_create(
    pool: &PgPool,
    id: Snowflake,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1 OR email = $2")
        .bind(username)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    if exists.is_some() {
        return Err(ApiError::AlreadyExists(format!("user {username}")));
    }

    sqlx::query("INSERT INTO users (id, username, email, password_hash, admin) VALUES ($1, $2, $3, $4, FALSE)")
        .bind::<i64>(id.into())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(User {
        id,
        username: username.to_string(),
        email: email.to_string(),
        admin: false,
    })
}

/// List all users.
pub async fn user_list(pool: &PgPool) -> Result<Vec<User>> {
    let rows: Vec<UserRow> =
        sqlx::query_as("SELECT id, username, email, password_hash, admin FROM users ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(UserRow::into_user).collect())
}

/// Grant or revoke admin rights.
pub async fn user_set_admin(pool: &PgPool, id: Snowflake, admin: bool) -> Result<()> {
    let result = sqlx::query("UPDATE users SET admin = $2 WHERE id = $1")
        .bind::<i64>(id.into())
        .bind(admin)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("user {id}")));
    }
    Ok(())
}

/// Delete a user account.
pub async fn user_delete(pool: &PgPool, id: Snowflake) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind::<i64>(id.into())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("user {id}")));
    }
    Ok(())
}

#[derive(sqlx::FromRow)]
struct NodeRow {
    id: i64,
    endpoint: String,
    grpc_port: i32,
    token: String,
    name: String,
}

impl NodeRow {
    fn into_node(self) -> Node {
        Node {
            id: Snowflake::from(self.id),
            endpoint: self.endpoint,
            grpc_port: self.grpc_port as u16,
            token: self.token,
            name: self.name,
        }
    }
}

/// Insert a new node row.
pub async fn node_create(
    pool: &PgPool,
    id: Snowflake,
    endpoint: &str,
    grpc_port: u16,
    token: &str,
    name: &str,
) -> Result<Node> {
    sqlx::query("INSERT INTO nodes (id, endpoint, grpc_port, token, name) VALUES ($1, $2, $3, $4, $5)")
        .bind::<i64>(id.into())
        .bind(endpoint)
        .bind(grpc_port as i32)
        .bind(token)
        .bind(name)
        .execute(pool)
        .await?;

    Ok(Node {
        id,
        endpoint: endpoint.to_string(),
        grpc_port,
        token: token.to_string(),
        name: name.to_string(),
    })
}

/// Fetch a node by id.
pub async fn node_get_by_id(pool: &PgPool, id: Snowflake) -> Result<Node> {
    let row: NodeRow = sqlx::query_as("SELECT id, endpoint, grpc_port, token, name FROM nodes WHERE id = $1")
        .bind::<i64>(id.into())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("node {id}")))?;
    Ok(row.into_node())
}

/// List all registered nodes.
pub async fn node_list(pool: &PgPool) -> Result<Vec<Node>> {
    let rows: Vec<NodeRow> = sqlx::query_as("SELECT id, endpoint, grpc_port, token, name FROM nodes ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(NodeRow::into_node).collect())
}

/// Remove a node row.
pub async fn node_delete(pool: &PgPool, id: Snowflake) -> Result<()> {
    let result = sqlx::query("DELETE FROM nodes WHERE id = $1")
        .bind::<i64>(id.into())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("node {id}")));
    }
    Ok(())
}

#[derive(sqlx::FromRow)]
struct InstanceRow {
    id: i64,
    name: String,
    node_id: i64,
    owner: i64,
    distribution: String,
    version_id: Option<String>,
    limits: serde_json::Value,
    config: serde_json::Value,
    state: i16,
}

impl InstanceRow {
    fn into_record(self) -> Result<InstanceRecord> {
        let distribution = self
            .distribution
            .parse()
            .map_err(|e| ApiError::InvalidArgument(format!("stored instance has invalid distribution: {e}")))?;
        let limits: InstanceLimits = serde_json::from_value(self.limits)
            .map_err(|e| ApiError::InvalidArgument(format!("stored instance has invalid limits: {e}")))?;
        let config: InstanceConfig = serde_json::from_value(self.config)
            .map_err(|e| ApiError::InvalidArgument(format!("stored instance has invalid config: {e}")))?;

        Ok(InstanceRecord {
            id: Snowflake::from(self.id),
            name: self.name,
            node_id: Snowflake::from(self.node_id),
            owner: Snowflake::from(self.owner),
            state: state_from_i16(self.state),
            distribution,
            version_id: self.version_id,
            limits,
            config,
        })
    }
}

fn state_from_i16(v: i16) -> InstanceState {
    match v {
        1 => InstanceState::Starting,
        2 => InstanceState::Running,
        3 => InstanceState::ShuttingDown,
        _ => InstanceState::Offline,
    }
}

/// Insert a new instance catalog row (does not launch it).
#[allow(clippy::too_many_arguments)]
pub async fn instance_create(
    pool: &PgPool,
    id: Snowflake,
    name: &str,
    node_id: Snowflake,
    owner: Snowflake,
    distribution: Distribution,
    version_id: Option<&str>,
    limits: &InstanceLimits,
    config: &InstanceConfig,
) -> Result<InstanceRecord> {
    sqlx::query(
        "INSERT INTO instances (id, name, node_id, owner, distribution, version_id, limits, config, state) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0)",
    )
    .bind::<i64>(id.into())
    .bind(name)
    .bind::<i64>(node_id.into())
    .bind::<i64>(owner.into())
    .bind(distribution.to_string())
    .bind(version_id)
    .bind(serde_json::to_value(limits).map_err(|e| ApiError::InvalidArgument(e.to_string()))?)
    .bind(serde_json::to_value(config).map_err(|e| ApiError::InvalidArgument(e.to_string()))?)
    .execute(pool)
    .await?;

    Ok(InstanceRecord {
        id,
        name: name.to_string(),
        node_id,
        owner,
        state: InstanceState::Offline,
        distribution,
        version_id: version_id.map(str::to_string),
        limits: limits.clone(),
        config: config.clone(),
    })
}

/// Fetch an instance row, enforcing ownership.
pub async fn instance_get_owned(pool: &PgPool, caller: Snowflake, id: Snowflake) -> Result<InstanceRecord> {
    let row: InstanceRow = sqlx::query_as(
        "SELECT id, name, node_id, owner, distribution, version_id, limits, config, state \
         FROM instances WHERE id = $1",
    )
    .bind::<i64>(id.into())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("instance {id}")))?;

    if row.owner != i64::from(caller) {
        return Err(ApiError::PermissionDenied(format!("instance {id} not owned by caller")));
    }
    row.into_record()
}

/// Persist a state update reported by a node (best-effort, fire-and-forget
/// from the caller's perspective).
pub async fn instance_set_state(pool: &PgPool, id: Snowflake, state: InstanceState) -> Result<()> {
    sqlx::query("UPDATE instances SET state = $2 WHERE id = $1")
        .bind::<i64>(id.into())
        .bind(state as i16)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove an instance catalog row.
pub async fn instance_delete(pool: &PgPool, id: Snowflake) -> Result<()> {
    let result = sqlx::query("DELETE FROM instances WHERE id = $1")
        .bind::<i64>(id.into())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("instance {id}")));
    }
    Ok(())
}
