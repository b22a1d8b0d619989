// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared error-kind vocabulary.
//!
//! Crate-local `thiserror` enums in `mc-distribution`, `mc-runner` and
//! `mc-api` each expose a `kind() -> ErrorKind` method so that a transport
//! boundary (out of scope here) can map to gRPC status codes uniformly,
//! without the core crates knowing about gRPC themselves.

use serde::{Deserialize, Serialize};

/// Coarse classification of a core-layer failure, matching the gRPC-code
/// groupings the core is expected to surface through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Instance, node, user or version not found.
    NotFound,
    /// Duplicate instance launch.
    AlreadyExists,
    /// Create-data validation failure.
    InvalidArgument,
    /// Caller lacks permission for the requested operation.
    PermissionDenied,
    /// Missing/invalid/expired credential.
    Unauthenticated,
    /// Filesystem failure while materializing instance data.
    InternalFilesystem,
    /// Runtime adapter `create` failed.
    InternalInstanceCreate,
    /// Runtime adapter `launch` failed.
    InternalInstanceLaunch,
    /// Runtime adapter `stop` failed.
    InternalInstanceStop,
    /// Writing to an instance's stdin failed.
    InternalSendCommand,
    /// Java image resolution failed.
    InternalJavaVersion,
    /// Dispatch-cache dial to a node failed.
    InternalNodeUnreachable,
    /// Network or decode failure fetching distribution metadata.
    Transport,
    /// Downloaded artifact's digest did not match the expected hash.
    HashFailed,
}

impl ErrorKind {
    /// A short machine-stable code, suitable for logging/metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::InternalFilesystem => "internal.filesystem",
            ErrorKind::InternalInstanceCreate => "internal.instance_create",
            ErrorKind::InternalInstanceLaunch => "internal.instance_launch",
            ErrorKind::InternalInstanceStop => "internal.instance_stop",
            ErrorKind::InternalSendCommand => "internal.send_command",
            ErrorKind::InternalJavaVersion => "internal.java_version",
            ErrorKind::InternalNodeUnreachable => "internal.node_unreachable",
            ErrorKind::Transport => "transport",
            ErrorKind::HashFailed => "hash_failed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
