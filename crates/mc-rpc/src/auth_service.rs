// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `AuthService`: `spec.md` §6.

use async_trait::async_trait;
use mc_core::Snowflake;

use crate::error::Result;

/// A JWT's decoded claims (`sub`, `iat`, `exp`, `iss`, `username`, `email`,
/// `admin`).
#[derive(Debug, Clone)]
pub struct Claims {
    /// Subject: the user's snowflake.
    pub sub: Snowflake,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiration, Unix seconds.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Username at time of issuance.
    pub username: String,
    /// Email at time of issuance.
    pub email: String,
    /// Whether the user held admin rights at time of issuance.
    pub admin: bool,
}

/// Bearer token pair returned on login/signup/refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived JWT.
    pub token: String,
    /// Long-lived opaque refresh token.
    pub refresh_token: String,
}

/// A user-facing profile.
#[derive(Debug, Clone)]
pub struct User {
    /// User id.
    pub id: Snowflake,
    /// Login username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Admin flag.
    pub admin: bool,
}

/// `Login`/`Signup`/`GetSelf`, plus the refresh-token exchange described in
/// `SPEC_FULL.md` §6.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// `Login(email, password) -> {token, refresh_token}`.
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair>;

    /// `Signup(...)`. Fails with `PermissionDenied` if signups are disabled
    /// by configuration.
    async fn signup(&self, username: &str, email: &str, password: &str) -> Result<TokenPair>;

    /// `GetSelf() -> User`, given already-validated claims.
    async fn get_self(&self, claims: &Claims) -> Result<User>;

    /// Exchange a valid refresh token (and the user id it claims to belong
    /// to) for a freshly issued JWT. Used when a bearer JWT has expired and
    /// the caller supplied `auth-refresh-token` metadata.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;
}
