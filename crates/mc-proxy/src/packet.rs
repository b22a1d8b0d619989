// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Packet framing: `spec.md` §4.8.
//!
//! `[varint total_length][varint packet_id][payload]`, where
//! `total_length` counts the packet-id varint plus the payload bytes. Both
//! varints are zig-zag signed, per `spec.md` §4.8 ("varint uses zig-zag
//! signed encoding"), matching `examples/original_source/internal/proxy/
//! packet.go`'s use of `binary.AppendVarint` for both fields.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtoError, Result};
use crate::varint::{read_varint_async, write_varint_async};

/// Safety ceiling on a single packet's declared length.
pub const MAX_PACKET_SIZE: usize = 2 * 1024 * 1024;

/// A single Minecraft protocol packet: an id plus its raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Packet id.
    pub id: i32,
    /// Raw payload bytes, to be interpreted by a [`crate::codec::Decoder`].
    pub data: Vec<u8>,
}

impl Packet {
    /// Build a packet from an id and a pre-encoded payload.
    pub fn new(id: i32, data: Vec<u8>) -> Self {
        Self { id, data }
    }

    /// Encode this packet's `[length][id][payload]` framing into a buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut id_buf = Vec::new();
        crate::varint::write_varint(self.id, &mut id_buf);

        let total_len = id_buf.len() + self.data.len();
        let mut out = Vec::with_capacity(total_len + 5);
        crate::varint::write_varint(total_len as i32, &mut out);
        out.extend_from_slice(&id_buf);
        out.extend_from_slice(&self.data);
        out
    }
}

/// Write a packet to an async writer.
pub async fn write_packet<W: AsyncWrite + Unpin>(writer: &mut W, packet: &Packet) -> Result<()> {
    let encoded = packet.encode();
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a single framed packet from an async reader.
pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Packet> {
    let total_len = read_varint_async(reader).await?;
    if total_len < 0 || total_len as usize > MAX_PACKET_SIZE {
        return Err(ProtoError::PacketTooLarge(total_len.max(0) as usize));
    }
    let total_len = total_len as usize;

    let mut body = vec![0u8; total_len];
    tokio::io::AsyncReadExt::read_exact(reader, &mut body).await?;

    let mut pos = 0usize;
    let id = crate::varint::read_varint(&body, &mut pos)?;
    let data = body[pos..].to_vec();

    Ok(Packet { id, data })
}

/// Encode a packet and immediately re-decode it from an in-memory cursor,
/// exercising the exact wire format without a socket.
pub async fn round_trip_in_memory(packet: &Packet) -> Result<Packet> {
    let encoded = packet.encode();
    let mut cursor = std::io::Cursor::new(encoded);
    read_packet(&mut cursor).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn packet_round_trips() {
        let p = Packet::new(0, b"hello world".to_vec());
        let got = round_trip_in_memory(&p).await.unwrap();
        assert_eq!(p, got);
    }

    #[tokio::test]
    async fn packet_round_trips_large_id() {
        let p = Packet::new(300, vec![0xAB; 4096]);
        let got = round_trip_in_memory(&p).await.unwrap();
        assert_eq!(p, got);
    }

    #[tokio::test]
    async fn oversized_packet_is_rejected() {
        let mut buf = Vec::new();
        crate::varint::write_varint((MAX_PACKET_SIZE + 1) as i32, &mut buf);
        let mut cursor = std::io::Cursor::new(buf);
        assert!(matches!(
            read_packet(&mut cursor).await,
            Err(ProtoError::PacketTooLarge(_))
        ));
    }
}
