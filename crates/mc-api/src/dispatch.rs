// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The Dispatch Cache (`spec.md` §4.7), grounded on
//! `examples/original_source/internal/server/runner.go`'s `runners` type:
//! a lazy `node id -> RunnerService client` map so the API remains
//! stateless with respect to physical node topology.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mc_core::Snowflake;
use mc_rpc::error::Result as RpcResult;
use mc_rpc::node_service::{Node, NodeService};
use mc_rpc::runner_service::RunnerService;
use mc_rpc::RpcError;
use tokio::sync::Mutex;
use tracing::info;

/// Dials a fresh [`RunnerService`] client to a node.
///
/// Generating the actual gRPC transport is explicitly out of scope
/// (`spec.md` §1, mirrored in `mc_rpc`'s crate-level docs); this trait is
/// the boundary such a connector sits behind, consistent with the other
/// "one implementation, abstracted for testing" capability interfaces
/// named in `spec.md` §9.
#[async_trait]
pub trait RunnerConnector: Send + Sync {
    /// Dial `node`, attaching interceptors that log call timing and present
    /// `node.token` as the bearer credential on every outbound call
    /// (`spec.md` §4.7).
    async fn connect(&self, node: &Node) -> RpcResult<Arc<dyn RunnerService>>;
}

/// A connector that always reports the node unreachable. Installed for
/// deployments that have not wired a real transport; the Dispatch Cache's
/// own contract (lookup, caching, single-mutex dial serialization) is fully
/// exercised regardless, since wiring a transport only changes what
/// `connect` returns.
pub struct UnimplementedConnector;

#[async_trait]
impl RunnerConnector for UnimplementedConnector {
    async fn connect(&self, node: &Node) -> RpcResult<Arc<dyn RunnerService>> {
        Err(RpcError::new(
            mc_core::ErrorKind::InternalNodeUnreachable,
            format!(
                "no RunnerConnector wired for node {} ({}:{}); the gRPC transport is out of scope here",
                node.id, node.endpoint, node.grpc_port
            ),
        ))
    }
}

/// Lazy `node id -> RunnerService` client map (`spec.md` §4.7). No
/// eviction: a node whose endpoint changes requires a process restart
/// (documented limitation, matching the original).
pub struct DispatchCache {
    nodes: Arc<dyn NodeService>,
    connector: Arc<dyn RunnerConnector>,
    /// The special "local node" id, servable in-process without a row
    /// (`spec.md` §3).
    local_node_id: Snowflake,
    local: Option<Arc<dyn RunnerService>>,
    /// A single mutex guards both the map and the dial path (`spec.md`
    /// §4.7): concurrent first-dials to the same node block on each other
    /// rather than race, since the original's `runners.Get` holds its lock
    /// across the whole call including the dial. Dials are idempotent, so
    /// this is a correctness simplification, not just a performance one.
    clients: Mutex<HashMap<Snowflake, Arc<dyn RunnerService>>>,
}

impl DispatchCache {
    /// Build a cache with no local node registered.
    pub fn new(nodes: Arc<dyn NodeService>, connector: Arc<dyn RunnerConnector>) -> Self {
        DispatchCache {
            nodes,
            connector,
            local_node_id: Snowflake::NULL,
            local: None,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Register an in-process runner as the local node, bypassing both the
    /// node-row lookup and the connector for that id (`spec.md` §3: "A
    /// special 'local node' ID may be registered in-process without a
    /// row").
    pub fn with_local_node(mut self, id: Snowflake, service: Arc<dyn RunnerService>) -> Self {
        self.local_node_id = id;
        self.local = Some(service);
        self
    }

    /// `get(node_id) -> Client | NotFound | Unreachable` (`spec.md` §4.7).
    pub async fn get(&self, node_id: Snowflake) -> RpcResult<Arc<dyn RunnerService>> {
        if !self.local_node_id.is_null() && node_id == self.local_node_id {
            return Ok(self.local.clone().expect("local set alongside local_node_id"));
        }

        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(&node_id) {
            return Ok(client.clone());
        }

        let node = self
            .nodes
            .get_by_id(node_id)
            .await
            .map_err(|e| RpcError::new(e.kind, e.message))?;

        let started = std::time::Instant::now();
        let client = self.connector.connect(&node).await?;
        info!(
            node_id = %node_id,
            endpoint = %node.endpoint,
            port = node.grpc_port,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dispatch cache: dialed node"
        );

        clients.insert(node_id, client.clone());
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::{InstanceCreateData, InstanceState};
    use mc_rpc::runner_service::{EventStream, InstanceStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubNodeService {
        node: Node,
    }

    #[async_trait]
    impl NodeService for StubNodeService {
        async fn create(&self, _endpoint: &str, _grpc_port: u16, _name: &str) -> RpcResult<Node> {
            unimplemented!()
        }
        async fn get_by_id(&self, id: Snowflake) -> RpcResult<Node> {
            if id == self.node.id {
                Ok(self.node.clone())
            } else {
                Err(RpcError::not_found("no such node"))
            }
        }
        async fn list(&self) -> RpcResult<Vec<Node>> {
            Ok(vec![self.node.clone()])
        }
        async fn delete(&self, _id: Snowflake) -> RpcResult<()> {
            Ok(())
        }
    }

    struct NullRunnerService;

    #[async_trait]
    impl RunnerService for NullRunnerService {
        async fn launch(&self, _create_data: InstanceCreateData) -> RpcResult<()> {
            Ok(())
        }
        async fn stop(&self, _id: Snowflake) -> RpcResult<()> {
            Ok(())
        }
        async fn get_state_by_id(&self, _id: Snowflake) -> RpcResult<InstanceStatus> {
            Ok(InstanceStatus { state: InstanceState::Offline, players: 0 })
        }
        async fn send_command(&self, _id: Snowflake, _command: &str) -> RpcResult<()> {
            Ok(())
        }
        async fn listen(&self, _id: Snowflake, _include_logs: bool) -> RpcResult<EventStream> {
            unimplemented!()
        }
        async fn listen_many(&self, _ids: Vec<Snowflake>, _include_logs: bool) -> RpcResult<EventStream> {
            unimplemented!()
        }
    }

    struct CountingConnector {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RunnerConnector for CountingConnector {
        async fn connect(&self, _node: &Node) -> RpcResult<Arc<dyn RunnerService>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NullRunnerService))
        }
    }

    fn node(id: u64) -> Node {
        Node {
            id: Snowflake::from(id),
            endpoint: "10.0.0.1".into(),
            grpc_port: 8443,
            token: "shared-secret".into(),
            name: "node-a".into(),
        }
    }

    #[tokio::test]
    async fn get_dials_once_and_caches_the_client() {
        let n = node(1);
        let nodes = Arc::new(StubNodeService { node: n.clone() });
        let connector = Arc::new(CountingConnector { calls: AtomicUsize::new(0) });
        let cache = DispatchCache::new(nodes, connector.clone());

        cache.get(n.id).await.unwrap();
        cache.get(n.id).await.unwrap();
        cache.get(n.id).await.unwrap();

        assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_unknown_node_is_not_found() {
        let nodes = Arc::new(StubNodeService { node: node(1) });
        let connector = Arc::new(CountingConnector { calls: AtomicUsize::new(0) });
        let cache = DispatchCache::new(nodes, connector);

        let err = cache.get(Snowflake::from(404u64)).await.unwrap_err();
        assert_eq!(err.kind, mc_core::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn local_node_bypasses_the_connector_and_node_lookup() {
        let nodes = Arc::new(StubNodeService { node: node(1) });
        let connector = Arc::new(CountingConnector { calls: AtomicUsize::new(0) });
        let local_id = Snowflake::from(999u64);
        let cache = DispatchCache::new(nodes, connector.clone())
            .with_local_node(local_id, Arc::new(NullRunnerService));

        cache.get(local_id).await.unwrap();
        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unimplemented_connector_reports_node_unreachable() {
        let n = node(1);
        let nodes = Arc::new(StubNodeService { node: n.clone() });
        let cache = DispatchCache::new(nodes, Arc::new(UnimplementedConnector));

        let err = cache.get(n.id).await.unwrap_err();
        assert_eq!(err.kind, mc_core::ErrorKind::InternalNodeUnreachable);
    }
}
