// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Status-ping and login-disconnect packets.

use serde::{Deserialize, Serialize};

use crate::codec::{Decoder, Encoder};
use crate::error::Result;
use crate::packet::Packet;

const STATUS_REQUEST_PACKET_ID: i32 = 0x00;
const STATUS_RESPONSE_PACKET_ID: i32 = 0x00;
const STATUS_PING_PACKET_ID: i32 = 0x01;
const STATUS_PONG_PACKET_ID: i32 = 0x01;
const LOGIN_DISCONNECT_PACKET_ID: i32 = 0x00;

/// Nothing to decode: the status request packet has an empty payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerBoundStatusReq;

impl ServerBoundStatusReq {
    /// Encode as a packet.
    pub fn encode(self) -> Packet {
        Packet::new(STATUS_REQUEST_PACKET_ID, Vec::new())
    }
}

/// The status ping, carrying an opaque payload the client expects echoed
/// back in the pong.
#[derive(Debug, Clone, Copy)]
pub struct ServerBoundStatusPingReq {
    /// Opaque value echoed in the pong response.
    pub payload: i64,
}

impl ServerBoundStatusPingReq {
    /// Decode from a packet payload.
    pub fn decode(packet: &Packet) -> Result<Self> {
        let mut dec = Decoder::new(&packet.data);
        Ok(Self {
            payload: dec.read_u64()? as i64,
        })
    }

    /// Encode as a packet.
    pub fn encode(self) -> Packet {
        let mut enc = Encoder::new();
        enc.write_u64(self.payload as u64);
        Packet::new(STATUS_PING_PACKET_ID, enc.into_bytes())
    }
}

/// JSON body for [`ClientBoundStatusRes`]'s `description` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Plain-text chat component.
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatusVersion {
    name: String,
    protocol: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatusPlayerSample {
    name: String,
    id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatusPlayers {
    max: i32,
    online: i32,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    sample: Vec<StatusPlayerSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatusResJson {
    version: StatusVersion,
    players: StatusPlayers,
    description: Chat,
    #[serde(skip_serializing_if = "Option::is_none")]
    favicon: Option<String>,
    #[serde(rename = "enforcesSecureChat")]
    enforces_secure_chat: bool,
}

/// The status-ping response: cached server metadata, sent when the backend
/// is offline or forwarded live when online (`spec.md` §4.8).
#[derive(Debug, Clone)]
pub struct ClientBoundStatusRes {
    /// The version name shown in the server list (e.g. "1.21.1").
    pub version_name: String,
    /// The protocol number the cached backend spoke.
    pub protocol: i32,
    /// Maximum advertised player count.
    pub max_players: i32,
    /// Currently online player count.
    pub online_players: i32,
    /// MOTD, as a chat component.
    pub description: Chat,
    /// Base64 `data:image/png` favicon, if any.
    pub favicon: Option<String>,
    /// Whether the server enforces secure chat signing.
    pub enforces_secure_chat: bool,
}

impl ClientBoundStatusRes {
    /// Decode from a packet payload.
    pub fn decode(packet: &Packet) -> Result<Self> {
        let mut dec = Decoder::new(&packet.data);
        let json_bytes = dec.read_bytes()?;
        let json: StatusResJson = serde_json::from_slice(&json_bytes)?;
        Ok(Self {
            version_name: json.version.name,
            protocol: json.version.protocol,
            max_players: json.players.max,
            online_players: json.players.online,
            description: json.description,
            favicon: json.favicon,
            enforces_secure_chat: json.enforces_secure_chat,
        })
    }

    /// Encode as a packet.
    pub fn encode(&self) -> Result<Packet> {
        let json = StatusResJson {
            version: StatusVersion {
                name: self.version_name.clone(),
                protocol: self.protocol,
            },
            players: StatusPlayers {
                max: self.max_players,
                online: self.online_players,
                sample: Vec::new(),
            },
            description: self.description.clone(),
            favicon: self.favicon.clone(),
            enforces_secure_chat: self.enforces_secure_chat,
        };
        let json_bytes = serde_json::to_vec(&json)?;
        let mut enc = Encoder::new();
        enc.write_bytes(&json_bytes);
        Ok(Packet::new(STATUS_RESPONSE_PACKET_ID, enc.into_bytes()))
    }
}

/// Echoes the ping payload back to the client.
#[derive(Debug, Clone, Copy)]
pub struct ClientBoundStatusPongRes {
    /// The payload from the matching [`ServerBoundStatusPingReq`].
    pub payload: i64,
}

impl ClientBoundStatusPongRes {
    /// Encode as a packet.
    pub fn encode(self) -> Packet {
        let mut enc = Encoder::new();
        enc.write_u64(self.payload as u64);
        Packet::new(STATUS_PONG_PACKET_ID, enc.into_bytes())
    }
}

/// Sent in place of a login success when the backend is offline, so the
/// client sees an informative message instead of a connection refusal.
#[derive(Debug, Clone)]
pub struct ClientBoundLoginDisconnect {
    /// The reason shown to the client.
    pub reason: Chat,
}

impl ClientBoundLoginDisconnect {
    /// Build the standard "server is starting" disconnect.
    pub fn starting() -> Self {
        Self {
            reason: Chat {
                text: "Starting server ...".to_string(),
            },
        }
    }

    /// Encode as a packet.
    pub fn encode(&self) -> Result<Packet> {
        let json = serde_json::to_vec(&self.reason)?;
        let mut enc = Encoder::new();
        enc.write_bytes(&json);
        Ok(Packet::new(LOGIN_DISCONNECT_PACKET_ID, enc.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_round_trips() {
        let res = ClientBoundStatusRes {
            version_name: "1.21.1".to_string(),
            protocol: 767,
            max_players: 20,
            online_players: 0,
            description: Chat {
                text: "A Minecraft Server".to_string(),
            },
            favicon: None,
            enforces_secure_chat: false,
        };
        let packet = res.encode().unwrap();
        let got = ClientBoundStatusRes::decode(&packet).unwrap();
        assert_eq!(got.version_name, res.version_name);
        assert_eq!(got.protocol, res.protocol);
        assert_eq!(got.max_players, res.max_players);
        assert_eq!(got.online_players, res.online_players);
    }

    #[test]
    fn status_ping_pong_echo() {
        let ping = ServerBoundStatusPingReq { payload: 123456789 };
        let packet = ping.encode();
        let decoded = ServerBoundStatusPingReq::decode(&packet).unwrap();
        assert_eq!(decoded.payload, ping.payload);

        let pong = ClientBoundStatusPongRes { payload: decoded.payload };
        let pong_packet = pong.encode();
        assert_eq!(pong_packet.id, STATUS_PONG_PACKET_ID);
    }

    #[test]
    fn login_disconnect_has_starting_text() {
        let disconnect = ClientBoundLoginDisconnect::starting();
        let packet = disconnect.encode().unwrap();
        let mut dec = Decoder::new(&packet.data);
        let json_bytes = dec.read_bytes().unwrap();
        let chat: Chat = serde_json::from_slice(&json_bytes).unwrap();
        assert_eq!(chat.text, "Starting server ...");
    }
}
