// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Minecraft wire protocol codec and offline-mode status proxy
//! (`spec.md` §4.8).

#![deny(missing_docs)]

/// Buffer-oriented primitive encoder/decoder.
pub mod codec;
/// Errors from codec and proxy operations.
pub mod error;
/// The handshake packet.
pub mod handshake;
/// Packet framing.
pub mod packet;
/// The offline-mode status proxy.
pub mod proxy;
/// Status-ping and login-disconnect packets.
pub mod status;
/// Varint primitives.
pub mod varint;

pub use codec::{Decoder, Encoder};
pub use error::{ProtoError, Result};
pub use handshake::{HandshakingIntent, ServerBoundHandshaking};
pub use packet::{MAX_PACKET_SIZE, Packet, read_packet, write_packet};
pub use proxy::{Proxy, ProxyMetadata, bind};
pub use status::{
    Chat, ClientBoundLoginDisconnect, ClientBoundStatusPongRes, ClientBoundStatusRes,
    ServerBoundStatusPingReq, ServerBoundStatusReq,
};
