// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Errors from wire codec and proxy operations.

use thiserror::Error;

/// Errors decoding or encoding the Minecraft wire protocol.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtoError {
    /// The buffer or stream ended before a value could be fully read.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// A varint used more bytes than the protocol allows.
    #[error("varint too long")]
    VarintTooLong,

    /// A packet declared a length exceeding the configured maximum.
    #[error("packet too large: {0} bytes")]
    PacketTooLarge(usize),

    /// A handshake declared an intent outside {1, 2, 3}.
    #[error("invalid handshake intent: {0}")]
    InvalidIntent(i32),

    /// A string or byte array was not valid UTF-8.
    #[error("invalid utf-8 string")]
    InvalidUtf8,

    /// A varint-length-prefixed field declared a negative length.
    #[error("negative length prefix: {0}")]
    NegativeLength(i32),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure, e.g. building the status payload.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ProtoError>;
