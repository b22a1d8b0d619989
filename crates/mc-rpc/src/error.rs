// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The error type surfaced across the RPC-surface traits.
//!
//! A real gRPC transport (out of scope here) would map this to a status
//! code via [`mc_core::ErrorKind`]; nothing in this crate knows about gRPC.

use mc_core::ErrorKind;
use thiserror::Error;

/// An error crossing an RPC-surface boundary.
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct RpcError {
    /// Coarse classification for transport-layer status mapping.
    pub kind: ErrorKind,
    /// Human-readable message, already ": "-joined from any causes.
    pub message: String,
}

impl RpcError {
    /// Build an error of the given kind with a message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`ErrorKind::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Shorthand for [`ErrorKind::AlreadyExists`].
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// Shorthand for [`ErrorKind::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Shorthand for [`ErrorKind::Unauthenticated`].
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Shorthand for [`ErrorKind::PermissionDenied`].
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }
}

/// Result alias for RPC-surface operations.
pub type Result<T> = std::result::Result<T, RpcError>;
