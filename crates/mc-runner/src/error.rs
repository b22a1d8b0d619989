// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types produced by the runner: the Instance Manager, the Container
//! Runtime Adapter and the Runner RPC surface (`spec.md` §4.3-4.6, §7).

use mc_core::ErrorKind;
use thiserror::Error;

/// Errors from the instance manager / container runtime adapter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunnerError {
    /// An instance with this id is already registered.
    #[error("instance {0} already launched")]
    AlreadyExists(String),

    /// No instance with this id is registered.
    #[error("instance {0} not found")]
    InstanceNotFound(String),

    /// `InstanceCreateData` failed validation.
    #[error("invalid instance create data: {0}")]
    InvalidCreateData(String),

    /// The configured Java image could not be resolved.
    #[error("the instance java version is invalid: {0}")]
    JavaVersion(String),

    /// Materializing the instance data directory failed.
    #[error("filesystem error: {0}")]
    Filesystem(String),

    /// The runtime adapter's `create` step failed.
    #[error("failed to create instance: {0}")]
    InstanceCreate(String),

    /// The runtime adapter's `launch` step failed.
    #[error("failed to launch instance: {0}")]
    InstanceLaunch(String),

    /// The runtime adapter's `stop` step failed.
    #[error("failed to stop instance: {0}")]
    InstanceStop(String),

    /// Writing a command to the instance's stdin failed.
    #[error("failed to send command to instance: {0}")]
    SendCommand(String),
}

impl RunnerError {
    /// Map to the shared coarse error classification (`spec.md` §7).
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunnerError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            RunnerError::InstanceNotFound(_) => ErrorKind::NotFound,
            RunnerError::InvalidCreateData(_) => ErrorKind::InvalidArgument,
            RunnerError::JavaVersion(_) => ErrorKind::InternalJavaVersion,
            RunnerError::Filesystem(_) => ErrorKind::InternalFilesystem,
            RunnerError::InstanceCreate(_) => ErrorKind::InternalInstanceCreate,
            RunnerError::InstanceLaunch(_) => ErrorKind::InternalInstanceLaunch,
            RunnerError::InstanceStop(_) => ErrorKind::InternalInstanceStop,
            RunnerError::SendCommand(_) => ErrorKind::InternalSendCommand,
        }
    }
}

impl From<std::io::Error> for RunnerError {
    fn from(e: std::io::Error) -> Self {
        RunnerError::Filesystem(e.to_string())
    }
}

impl From<bollard::errors::Error> for RunnerError {
    fn from(e: bollard::errors::Error) -> Self {
        RunnerError::InstanceCreate(e.to_string())
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, RunnerError>;
