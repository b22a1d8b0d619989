// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types produced by the API's auth, dispatch and persistence layers
//! (`spec.md` §7).

use mc_core::ErrorKind;
use mc_rpc::RpcError;
use thiserror::Error;

/// Errors from node/user/instance persistence, auth and dispatch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// No row with this id.
    #[error("not found: {0}")]
    NotFound(String),

    /// A unique constraint (username, email, node endpoint) was violated.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Caller-supplied data failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller is authenticated but not permitted to perform this operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Missing, malformed, or expired credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// A registered node could not be dialed through the Dispatch Cache.
    #[error("node unreachable: {0}")]
    NodeUnreachable(String),

    /// The underlying SQL database returned an error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Map to the shared coarse error classification (`spec.md` §7).
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ApiError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ApiError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ApiError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            ApiError::NodeUnreachable(_) => ErrorKind::InternalNodeUnreachable,
            ApiError::Database(_) => ErrorKind::InternalFilesystem,
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for RpcError {
    fn from(err: ApiError) -> Self {
        let kind = err.kind();
        RpcError::new(kind, err.to_string())
    }
}
