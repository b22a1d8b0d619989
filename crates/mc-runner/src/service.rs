// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridges [`Manager`] to [`mc_rpc::RunnerService`] (`spec.md` §4.6, §6).

use std::sync::Arc;

use async_trait::async_trait;
use mc_core::{Event, EventType, InstanceCreateData, Snowflake};
use mc_rpc::runner_service::{EventStream, InstanceStatus, RunnerService};
use mc_rpc::{Result as RpcResult, RpcError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::RunnerError;
use crate::instance::Instance;
use crate::manager::Manager;

/// Per-listener channel capacity; one subscriber's buffered-but-unread
/// events before the instance starts dropping them for it
/// ([`Instance::send_event`]'s per-subscriber timeout still applies).
const LISTENER_CAPACITY: usize = 32;

fn to_rpc(err: RunnerError) -> RpcError {
    RpcError::new(err.kind(), err.to_string())
}

/// The node-local [`RunnerService`], backed by a [`Manager`].
pub struct LocalRunnerService {
    manager: Arc<Manager>,
}

impl LocalRunnerService {
    /// Wrap a manager.
    pub fn new(manager: Arc<Manager>) -> Self {
        LocalRunnerService { manager }
    }
}

#[async_trait]
impl RunnerService for LocalRunnerService {
    async fn launch(&self, create_data: InstanceCreateData) -> RpcResult<()> {
        self.manager.launch(create_data).await.map_err(to_rpc)?;
        Ok(())
    }

    async fn stop(&self, id: Snowflake) -> RpcResult<()> {
        self.manager.stop(id).await.map_err(to_rpc)
    }

    async fn get_state_by_id(&self, id: Snowflake) -> RpcResult<InstanceStatus> {
        let instance = self.manager.get_by_id(id).await.map_err(to_rpc)?;
        Ok(InstanceStatus {
            state: instance.get_state(),
            players: instance.players(),
        })
    }

    async fn send_command(&self, id: Snowflake, command: &str) -> RpcResult<()> {
        let instance = self.manager.get_by_id(id).await.map_err(to_rpc)?;
        instance.send_command(command).await.map_err(to_rpc)
    }

    async fn listen(&self, id: Snowflake, include_logs: bool) -> RpcResult<EventStream> {
        let instance = self.manager.get_by_id(id).await.map_err(to_rpc)?;
        Ok(spawn_forwarder(vec![instance], include_logs))
    }

    async fn listen_many(&self, ids: Vec<Snowflake>, include_logs: bool) -> RpcResult<EventStream> {
        let instances = self.manager.get_many(&ids).await.map_err(to_rpc)?;
        Ok(spawn_forwarder(instances, include_logs))
    }
}

/// Spawn one forwarder task per instance, each reading its own subscriber
/// and writing into a shared channel; the returned stream ends once every
/// forwarder has exited, i.e. once every named instance has closed (or the
/// caller has dropped the stream, which is detected by the forwarder's
/// `send` failing).
fn spawn_forwarder(instances: Vec<Arc<Instance>>, include_logs: bool) -> EventStream {
    let (tx, rx) = mpsc::channel(LISTENER_CAPACITY);

    for instance in instances {
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut subscriber = instance.attach_listener(LISTENER_CAPACITY).await;
            while let Some(event) = subscriber.recv().await {
                if !include_logs && event.event_type == EventType::Log {
                    continue;
                }
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            instance.detach_listener(&subscriber).await;
        });
    }
    drop(tx);

    Box::pin(ReceiverStream::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::mock::MockRuntimeAdapter;
    use mc_core::{Distribution, DistributionVersion, HashType, InstanceConfig, InstanceLimits};
    use tokio_stream::StreamExt;

    fn version() -> DistributionVersion {
        DistributionVersion {
            id: "1.21.1".into(),
            url: "http://example.invalid/server.jar".into(),
            hash: vec![],
            hash_type: HashType::None,
            distribution: Distribution::Paper,
            java_version: 21,
            jvm_args: vec![],
        }
    }

    fn create_data(id: u64) -> InstanceCreateData {
        InstanceCreateData {
            id: Snowflake::from(id),
            name: "s".into(),
            version: version(),
            limits: InstanceLimits {
                shutdown_after_idle_secs: 0,
                auto_shutdown: false,
                max_players: 20,
                cpu: 100,
                ram_bytes: InstanceLimits::MIN_RAM_BYTES,
            },
            config: InstanceConfig {
                difficulty: String::new(),
                admin: Snowflake::from(9u64),
                port: 25565,
                view_distance: 0,
                simulation_distance: 0,
                allow_pirate: false,
                pvp: true,
            },
        }
    }

    #[tokio::test]
    async fn launch_then_get_state_reports_starting() {
        let manager = Arc::new(Manager::new(Arc::new(MockRuntimeAdapter::new())));
        let service = LocalRunnerService::new(manager);

        service.launch(create_data(1)).await.unwrap();
        let status = service.get_state_by_id(Snowflake::from(1u64)).await.unwrap();
        assert_eq!(status.state, mc_core::InstanceState::Starting);
    }

    #[tokio::test]
    async fn stop_unknown_instance_is_not_found() {
        let manager = Arc::new(Manager::new(Arc::new(MockRuntimeAdapter::new())));
        let service = LocalRunnerService::new(manager);

        let err = service.stop(Snowflake::from(404u64)).await.unwrap_err();
        assert_eq!(err.kind, mc_core::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn listen_receives_shutdown_and_stopped_events() {
        let manager = Arc::new(Manager::new(Arc::new(MockRuntimeAdapter::new())));
        let service = LocalRunnerService::new(manager.clone());

        service.launch(create_data(2)).await.unwrap();
        let mut stream = service.listen(Snowflake::from(2u64), true).await.unwrap();

        manager.stop(Snowflake::from(2u64)).await.unwrap();

        let first = stream.next().await.unwrap();
        assert_eq!(first.event_type, EventType::ShuttingDown);
        let second = stream.next().await.unwrap();
        assert_eq!(second.event_type, EventType::Stopped);
        assert!(stream.next().await.is_none());
    }
}
