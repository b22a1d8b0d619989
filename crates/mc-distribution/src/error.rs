// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Errors produced by the resolver and downloader.

use mc_core::ErrorKind;
use thiserror::Error;

/// Errors from distribution resolution and artifact download.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DistributionError {
    /// The requested version (or distribution) does not exist.
    #[error("version not found: {0}")]
    NotFound(String),

    /// A network call or payload decode failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The downloaded artifact's digest did not match the expected hash.
    #[error("hash verification failed for {path}: expected {expected}, got {actual}")]
    HashFailed {
        /// Destination path the artifact was written to.
        path: String,
        /// Expected digest, hex-encoded.
        expected: String,
        /// Actual digest, hex-encoded.
        actual: String,
    },

    /// Filesystem I/O failure while writing the artifact.
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    /// A decoded manifest/version payload failed structural validation
    /// (empty id, malformed URL, non-hex checksum) before being accepted
    /// (`spec.md` §4.1).
    #[error("invalid distribution payload: {0}")]
    Validation(String),
}

impl DistributionError {
    /// Map to the shared coarse error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DistributionError::NotFound(_) => ErrorKind::NotFound,
            DistributionError::Transport(_) => ErrorKind::Transport,
            DistributionError::HashFailed { .. } => ErrorKind::HashFailed,
            DistributionError::Io(_) => ErrorKind::InternalFilesystem,
            DistributionError::Validation(_) => ErrorKind::InvalidArgument,
        }
    }
}

impl From<reqwest::Error> for DistributionError {
    fn from(e: reqwest::Error) -> Self {
        DistributionError::Transport(e.to_string())
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, DistributionError>;
