// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The handshake packet that begins every Minecraft connection.

use crate::codec::{Decoder, Encoder};
use crate::error::{ProtoError, Result};
use crate::packet::Packet;

const HANDSHAKE_PACKET_ID: i32 = 0x00;

/// The client's declared purpose for this connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakingIntent {
    /// The client wants a status response (the server-list ping).
    Status,
    /// The client wants to log in and play.
    Login,
    /// The client is transferring from another server.
    Transfer,
}

impl HandshakingIntent {
    /// Parse the wire value; any value outside `{1, 2, 3}` is an error.
    pub fn from_i32(v: i32) -> Result<Self> {
        match v {
            1 => Ok(HandshakingIntent::Status),
            2 => Ok(HandshakingIntent::Login),
            3 => Ok(HandshakingIntent::Transfer),
            other => Err(ProtoError::InvalidIntent(other)),
        }
    }

    /// The wire value for this intent.
    pub fn to_i32(self) -> i32 {
        match self {
            HandshakingIntent::Status => 1,
            HandshakingIntent::Login => 2,
            HandshakingIntent::Transfer => 3,
        }
    }
}

/// The first packet sent on any connection.
#[derive(Debug, Clone)]
pub struct ServerBoundHandshaking {
    /// The protocol version the client speaks.
    pub protocol_version: i32,
    /// The hostname/IP the client connected to.
    pub server_address: String,
    /// The port the client connected to.
    pub server_port: u16,
    /// What the client wants to do next.
    pub intent: HandshakingIntent,
}

impl ServerBoundHandshaking {
    /// Decode from a packet payload.
    pub fn decode(packet: &Packet) -> Result<Self> {
        let mut dec = Decoder::new(&packet.data);
        let protocol_version = dec.read_var_int()?;
        let server_address = dec.read_string()?;
        let server_port = dec.read_u16()?;
        let intent = HandshakingIntent::from_i32(dec.read_var_int()?)?;
        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            intent,
        })
    }

    /// Encode as a handshake packet.
    pub fn encode(&self) -> Packet {
        let mut enc = Encoder::new();
        enc.write_var_int(self.protocol_version)
            .write_string(&self.server_address)
            .write_u16(self.server_port)
            .write_var_int(self.intent.to_i32());
        Packet::new(HANDSHAKE_PACKET_ID, enc.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_round_trips() {
        let h = ServerBoundHandshaking {
            protocol_version: 767,
            server_address: "play.example.com".to_string(),
            server_port: 25565,
            intent: HandshakingIntent::Status,
        };
        let packet = h.encode();
        let got = ServerBoundHandshaking::decode(&packet).unwrap();
        assert_eq!(got.protocol_version, h.protocol_version);
        assert_eq!(got.server_address, h.server_address);
        assert_eq!(got.server_port, h.server_port);
        assert_eq!(got.intent, h.intent);
    }

    #[test]
    fn invalid_intent_is_rejected() {
        assert!(matches!(
            HandshakingIntent::from_i32(0),
            Err(ProtoError::InvalidIntent(0))
        ));
        assert!(matches!(
            HandshakingIntent::from_i32(4),
            Err(ProtoError::InvalidIntent(4))
        ));
    }
}
