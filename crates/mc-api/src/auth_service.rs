// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridges [`db`] + [`auth::JwtAuther`] to [`mc_rpc::AuthService`]
//! (`spec.md` §6).

use async_trait::async_trait;
use mc_core::Snowflake;
use mc_rpc::auth_service::{AuthService, Claims, TokenPair, User};
use mc_rpc::error::Result as RpcResult;
use sqlx::PgPool;

use crate::auth::{self, JwtAuther};
use crate::db;
use crate::error::ApiError;

/// The API's [`AuthService`], backed by Postgres (users) and
/// [`JwtAuther`] (tokens).
pub struct ApiAuthService {
    pool: PgPool,
    auther: JwtAuther,
    allow_signup: bool,
}

impl ApiAuthService {
    /// Build the service around a pool and auther.
    pub fn new(pool: PgPool, auther: JwtAuther, allow_signup: bool) -> Self {
        ApiAuthService { pool, auther, allow_signup }
    }
}

#[async_trait]
impl AuthService for ApiAuthService {
    async fn login(&self, email: &str, password: &str) -> RpcResult<TokenPair> {
        let (user, hash) = db::user_get_by_email_with_hash(&self.pool, email)
            .await
            .map_err(|_| ApiError::Unauthenticated("invalid email or password".into()))?;

        let matches = auth::verify_password(password, &hash)?;
        if !matches {
            return Err(ApiError::Unauthenticated("invalid email or password".into()).into());
        }

        let token = self.auther.encode_token(&user)?;
        let refresh_token = self.auther.gen_refresh_token(user.id).await?;
        Ok(TokenPair { token, refresh_token })
    }

    async fn signup(&self, username: &str, email: &str, password: &str) -> RpcResult<TokenPair> {
        if !self.allow_signup {
            return Err(ApiError::PermissionDenied("signups are disabled".into()).into());
        }

        let hash = auth::hash_password(password)?;
        let id = Snowflake::generate();
        let user = db::user_create(&self.pool, id, username, email, &hash).await?;

        let token = self.auther.encode_token(&user)?;
        let refresh_token = self.auther.gen_refresh_token(user.id).await?;
        Ok(TokenPair { token, refresh_token })
    }

    async fn get_self(&self, claims: &Claims) -> RpcResult<User> {
        Ok(db::user_get_by_id(&self.pool, claims.sub).await?)
    }

    async fn refresh(&self, refresh_token: &str) -> RpcResult<TokenPair> {
        let user_id = self.auther.validate_refresh_token(refresh_token).await?;
        let user = db::user_get_by_id(&self.pool, user_id).await?;
        let token = self.auther.encode_token(&user)?;
        Ok(TokenPair { token, refresh_token: refresh_token.to_string() })
    }
}
