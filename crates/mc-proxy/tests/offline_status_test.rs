// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! S5 - Status proxy offline status.

use std::net::SocketAddr;
use std::sync::Arc;

use mc_proxy::status::{ClientBoundStatusRes, ServerBoundStatusReq};
use mc_proxy::{Chat, HandshakingIntent, Proxy, ProxyMetadata, ServerBoundHandshaking, bind, read_packet, write_packet};
use tokio::net::TcpStream;

#[tokio::test]
async fn offline_status_returns_cached_metadata() {
    let listener = bind("127.0.0.1:0".parse::<SocketAddr>().unwrap()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    // backend_addr is irrelevant here since the proxy stays Inactive.
    let proxy = Arc::new(Proxy::new("127.0.0.1:1".parse().unwrap()));
    proxy
        .set_metadata(ProxyMetadata {
            version_name: "1.21".to_string(),
            protocol: 767,
            max_players: 20,
            description: Chat {
                text: "test server".to_string(),
            },
            favicon: None,
            enforces_secure_chat: false,
        })
        .await;

    let server_task = tokio::spawn(Arc::clone(&proxy).run(listener));

    let mut client = TcpStream::connect(addr).await.unwrap();
    let handshake = ServerBoundHandshaking {
        protocol_version: 767,
        server_address: "localhost".to_string(),
        server_port: addr.port(),
        intent: HandshakingIntent::Status,
    };
    write_packet(&mut client, &handshake.encode()).await.unwrap();
    write_packet(&mut client, &ServerBoundStatusReq.encode()).await.unwrap();

    let response_packet = read_packet(&mut client).await.unwrap();
    let response = ClientBoundStatusRes::decode(&response_packet).unwrap();

    assert_eq!(response.version_name, "1.21");
    assert_eq!(response.protocol, 767);
    assert_eq!(response.max_players, 20);
    assert_eq!(response.online_players, 0);

    server_task.abort();
}
