// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The offline-mode status proxy: `spec.md` §4.8.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::handshake::{HandshakingIntent, ServerBoundHandshaking};
use crate::packet::{Packet, read_packet, write_packet};
use crate::status::{
    Chat, ClientBoundLoginDisconnect, ClientBoundStatusPongRes, ClientBoundStatusRes,
    ServerBoundStatusPingReq,
};

/// Cached server metadata used to answer status pings while the backend is
/// offline.
#[derive(Debug, Clone)]
pub struct ProxyMetadata {
    /// Version name, e.g. "1.21.1".
    pub version_name: String,
    /// Protocol number.
    pub protocol: i32,
    /// Maximum advertised player count.
    pub max_players: i32,
    /// MOTD.
    pub description: Chat,
    /// Base64 favicon, if any.
    pub favicon: Option<String>,
    /// Whether secure chat is enforced.
    pub enforces_secure_chat: bool,
}

/// A TCP front that answers Minecraft status pings / login attempts for a
/// backend that may or may not currently be running.
pub struct Proxy {
    backend_addr: SocketAddr,
    active: Arc<AtomicBool>,
    players: Arc<AtomicI32>,
    metadata: Arc<RwLock<Option<ProxyMetadata>>>,
}

impl Proxy {
    /// Build a proxy fronting `backend_addr`. Starts `Inactive` until
    /// [`Proxy::set_active`] is called.
    pub fn new(backend_addr: SocketAddr) -> Self {
        Self {
            backend_addr,
            active: Arc::new(AtomicBool::new(false)),
            players: Arc::new(AtomicI32::new(0)),
            metadata: Arc::new(RwLock::new(None)),
        }
    }

    /// Mark the backend as up (`true`) or down (`false`).
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// Whether the backend is currently considered up.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Informational online-player counter, updated by the owning runner.
    pub fn set_online_players(&self, count: i32) {
        self.players.store(count, Ordering::SeqCst);
    }

    /// Current informational online-player count.
    pub fn online_players(&self) -> i32 {
        self.players.load(Ordering::SeqCst)
    }

    /// Install cached metadata directly (used in tests and when metadata is
    /// known up-front, per scenario S5).
    pub async fn set_metadata(&self, metadata: ProxyMetadata) {
        *self.metadata.write().await = Some(metadata);
    }

    /// Perform a one-shot status handshake against the live backend and
    /// cache the result for use while the backend is later offline.
    pub async fn load_server_data(&self) -> Result<()> {
        let mut stream = TcpStream::connect(self.backend_addr).await?;

        let handshake = ServerBoundHandshaking {
            protocol_version: 0,
            server_address: self.backend_addr.ip().to_string(),
            server_port: self.backend_addr.port(),
            intent: HandshakingIntent::Status,
        };
        write_packet(&mut stream, &handshake.encode()).await?;
        write_packet(&mut stream, &Packet::new(0x00, Vec::new())).await?;

        let response = read_packet(&mut stream).await?;
        let status = ClientBoundStatusRes::decode(&response)?;

        *self.metadata.write().await = Some(ProxyMetadata {
            version_name: status.version_name,
            protocol: status.protocol,
            max_players: status.max_players,
            description: status.description,
            favicon: status.favicon,
            enforces_secure_chat: status.enforces_secure_chat,
        });
        Ok(())
    }

    /// Accept loop. Runs until the listener errors or the caller drops the
    /// future.
    pub async fn run(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        loop {
            let (client, peer) = listener.accept().await?;
            let this = Arc::clone(&self);
            tokio::spawn(async move {
                debug!(%peer, "proxy: accepted connection");
                if let Err(e) = this.handle_connection(client).await {
                    debug!(%peer, error = %e, "proxy: connection ended with error");
                }
            });
        }
    }

    async fn handle_connection(&self, client: TcpStream) -> Result<()> {
        if self.is_active() {
            self.handle_online(client).await
        } else {
            self.handle_offline(client).await
        }
    }

    /// Raw byte pipe in both directions; no packet inspection, safe across
    /// protocol versions.
    async fn handle_online(&self, mut client: TcpStream) -> Result<()> {
        let mut backend = TcpStream::connect(self.backend_addr).await?;
        tokio::io::copy_bidirectional(&mut client, &mut backend).await?;
        Ok(())
    }

    async fn handle_offline(&self, mut client: TcpStream) -> Result<()> {
        let handshake_packet = read_packet(&mut client).await?;
        let handshake = ServerBoundHandshaking::decode(&handshake_packet)?;

        match handshake.intent {
            HandshakingIntent::Status => {
                let _status_req = read_packet(&mut client).await?;
                let metadata = self.metadata.read().await.clone();
                let Some(metadata) = metadata else {
                    warn!("proxy: status request received before metadata was cached");
                    return Ok(());
                };
                let response = ClientBoundStatusRes {
                    version_name: metadata.version_name,
                    protocol: metadata.protocol,
                    max_players: metadata.max_players,
                    online_players: 0,
                    description: metadata.description,
                    favicon: metadata.favicon,
                    enforces_secure_chat: metadata.enforces_secure_chat,
                };
                write_packet(&mut client, &response.encode()?).await?;

                if let Ok(ping_packet) = read_packet(&mut client).await {
                    if let Ok(ping) = ServerBoundStatusPingReq::decode(&ping_packet) {
                        let pong = ClientBoundStatusPongRes { payload: ping.payload };
                        write_packet(&mut client, &pong.encode()).await?;
                    }
                }
            }
            HandshakingIntent::Login | HandshakingIntent::Transfer => {
                let disconnect = ClientBoundLoginDisconnect::starting();
                write_packet(&mut client, &disconnect.encode()?).await?;
            }
        }

        Ok(())
    }
}

/// Bind a proxy's listener on the given address.
pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "proxy: listening");
    Ok(listener)
}
