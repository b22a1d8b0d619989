// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridges [`db`] + the [`DispatchCache`] to [`mc_rpc::InstanceService`]
//! (`spec.md` §6): the instance catalog plus lifecycle dispatch to the
//! owning node.

use std::sync::Arc;

use async_trait::async_trait;
use mc_core::{InstanceCreateData, Snowflake};
use mc_distribution::ResolverRegistry;
use mc_rpc::error::Result as RpcResult;
use mc_rpc::instance_service::{CreateInstanceRequest, InstanceRecord, InstanceService};
use mc_rpc::runner_service::EventStream;
use sqlx::PgPool;
use tracing::warn;

use crate::db;
use crate::dispatch::DispatchCache;
use crate::error::ApiError;

/// The API's [`InstanceService`]: a thin catalog-plus-dispatch layer. The
/// heavy lifting (registry, rollback on launch failure) lives in
/// `mc-runner`'s `Manager`, on the node itself.
pub struct ApiInstanceService {
    pool: PgPool,
    dispatch: Arc<DispatchCache>,
    distributions: ResolverRegistry,
}

impl ApiInstanceService {
    /// Build the service around a pool, dispatch cache and a populated
    /// distribution resolver registry.
    pub fn new(pool: PgPool, dispatch: Arc<DispatchCache>, distributions: ResolverRegistry) -> Self {
        ApiInstanceService { pool, dispatch, distributions }
    }

    /// Resolve `(distribution, version_id)` to a concrete
    /// [`mc_core::DistributionVersion`], re-running the same lookup
    /// `Launch` would have used at `Create` time had it resolved eagerly.
    async fn resolve_version(
        &self,
        record: &InstanceRecord,
    ) -> Result<mc_core::DistributionVersion, ApiError> {
        let resolver = self.distributions.get(record.distribution).ok_or_else(|| {
            ApiError::InvalidArgument(format!("no resolver registered for {}", record.distribution))
        })?;

        let version = match &record.version_id {
            Some(id) => resolver.version(id).await,
            None => resolver.latest().await,
        };
        version.map_err(|e| ApiError::InvalidArgument(e.to_string()))
    }
}

#[async_trait]
impl InstanceService for ApiInstanceService {
    async fn create(&self, caller: Snowflake, req: CreateInstanceRequest) -> RpcResult<InstanceRecord> {
        req.limits.validate().map_err(ApiError::InvalidArgument)?;
        let config = req.config.with_defaults();

        let id = Snowflake::generate();
        Ok(db::instance_create(
            &self.pool,
            id,
            &req.name,
            req.node_id,
            caller,
            req.distribution,
            req.version_id.as_deref(),
            &req.limits,
            &config,
        )
        .await?)
    }

    async fn get_by_id(&self, caller: Snowflake, id: Snowflake) -> RpcResult<InstanceRecord> {
        Ok(db::instance_get_owned(&self.pool, caller, id).await?)
    }

    async fn launch(&self, caller: Snowflake, id: Snowflake) -> RpcResult<()> {
        let record = db::instance_get_owned(&self.pool, caller, id).await?;
        let version = self.resolve_version(&record).await?;

        let create_data = InstanceCreateData {
            id: record.id,
            name: record.name.clone(),
            version,
            limits: record.limits.clone(),
            config: record.config.clone(),
        };
        create_data.validate().map_err(ApiError::InvalidArgument)?;

        let client = self.dispatch.get(record.node_id).await?;
        client.launch(create_data).await?;

        if let Err(e) = db::instance_set_state(&self.pool, id, mc_core::InstanceState::Starting).await {
            warn!(instance_id = %id, error = %e, "failed to record instance state after launch");
        }
        Ok(())
    }

    async fn stop(&self, caller: Snowflake, id: Snowflake) -> RpcResult<()> {
        let record = db::instance_get_owned(&self.pool, caller, id).await?;
        let client = self.dispatch.get(record.node_id).await?;
        client.stop(id).await?;

        if let Err(e) = db::instance_set_state(&self.pool, id, mc_core::InstanceState::Offline).await {
            warn!(instance_id = %id, error = %e, "failed to record instance state after stop");
        }
        Ok(())
    }

    async fn delete(&self, caller: Snowflake, id: Snowflake) -> RpcResult<()> {
        let record = db::instance_get_owned(&self.pool, caller, id).await?;
        db::instance_delete(&self.pool, id).await?;

        let dispatch = self.dispatch.clone();
        let node_id = record.node_id;
        tokio::spawn(async move {
            let result = async {
                let client = dispatch.get(node_id).await?;
                client.stop(id).await
            }
            .await;
            if let Err(e) = result {
                warn!(instance_id = %id, node_id = %node_id, error = %e, "best-effort stop after delete failed");
            }
        });

        Ok(())
    }

    async fn send_command(&self, caller: Snowflake, id: Snowflake, command: &str) -> RpcResult<()> {
        let record = db::instance_get_owned(&self.pool, caller, id).await?;
        let client = self.dispatch.get(record.node_id).await?;
        Ok(client.send_command(id, command).await?)
    }

    async fn get_events(&self, caller: Snowflake, id: Snowflake, include_logs: bool) -> RpcResult<EventStream> {
        let record = db::instance_get_owned(&self.pool, caller, id).await?;
        let client = self.dispatch.get(record.node_id).await?;
        Ok(client.listen(id, include_logs).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::{Distribution, ErrorKind, HashType, InstanceConfig, InstanceLimits, InstanceState};
    use mc_rpc::node_service::{Node, NodeService};
    use mc_rpc::runner_service::InstanceStatus;
    use mc_rpc::RpcError;
    use std::sync::Mutex as StdMutex;

    fn limits() -> InstanceLimits {
        InstanceLimits {
            shutdown_after_idle_secs: 0,
            auto_shutdown: false,
            max_players: 20,
            cpu: 100,
            ram_bytes: InstanceLimits::MIN_RAM_BYTES,
        }
    }

    fn config() -> InstanceConfig {
        InstanceConfig {
            difficulty: String::new(),
            admin: Snowflake::from(9u64),
            port: 25565,
            view_distance: 0,
            simulation_distance: 0,
            allow_pirate: false,
            pvp: true,
        }
    }

    struct StubResolver {
        version: mc_core::DistributionVersion,
    }

    #[async_trait]
    impl mc_distribution::DistributionResolver for StubResolver {
        async fn latest(&self) -> mc_distribution::Result<mc_core::DistributionVersion> {
            Ok(self.version.clone())
        }
        async fn version(&self, _id: &str) -> mc_distribution::Result<mc_core::DistributionVersion> {
            Ok(self.version.clone())
        }
        async fn list(&self) -> mc_distribution::Result<Vec<String>> {
            Ok(vec![self.version.id.clone()])
        }
    }

    fn registry() -> ResolverRegistry {
        let mut r = ResolverRegistry::new();
        r.register(
            Distribution::Paper,
            Arc::new(StubResolver {
                version: mc_core::DistributionVersion {
                    id: "1.21.1".into(),
                    url: "http://example.invalid/server.jar".into(),
                    hash: vec![],
                    hash_type: HashType::None,
                    distribution: Distribution::Paper,
                    java_version: 21,
                    jvm_args: vec![],
                },
            }),
        );
        r
    }

    struct RecordingRunner {
        launched: StdMutex<Vec<Snowflake>>,
        stopped: StdMutex<Vec<Snowflake>>,
    }

    impl RecordingRunner {
        fn new() -> Self {
            RecordingRunner { launched: StdMutex::new(Vec::new()), stopped: StdMutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl mc_rpc::runner_service::RunnerService for RecordingRunner {
        async fn launch(&self, create_data: InstanceCreateData) -> RpcResult<()> {
            self.launched.lock().unwrap().push(create_data.id);
            Ok(())
        }
        async fn stop(&self, id: Snowflake) -> RpcResult<()> {
            self.stopped.lock().unwrap().push(id);
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

    struct NoNodes;

    #[async_trait]
    impl NodeService for NoNodes {
        async fn create(&self, _endpoint: &str, _grpc_port: u16, _name: &str) -> RpcResult<Node> {
            unimplemented!()
        }
        async fn get_by_id(&self, _id: Snowflake) -> RpcResult<Node> {
            Err(RpcError::not_found("no nodes"))
        }
        async fn list(&self) -> RpcResult<Vec<Node>> {
            Ok(vec![])
        }
        async fn delete(&self, _id: Snowflake) -> RpcResult<()> {
            Ok(())
        }
    }

    fn dispatch_with_local(service: Arc<dyn mc_rpc::runner_service::RunnerService>, local_id: Snowflake) -> Arc<DispatchCache> {
        use crate::dispatch::UnimplementedConnector;
        Arc::new(
            DispatchCache::new(Arc::new(NoNodes), Arc::new(UnimplementedConnector)).with_local_node(local_id, service),
        )
    }

    #[tokio::test]
    async fn launch_dispatches_the_resolved_version_to_the_bound_node() {
        let local_id = Snowflake::from(1u64);
        let runner = Arc::new(RecordingRunner::new());
        let dispatch = dispatch_with_local(runner.clone(), local_id);

        let record = InstanceRecord {
            id: Snowflake::from(42u64),
            name: "survival".into(),
            node_id: local_id,
            owner: Snowflake::from(7u64),
            state: InstanceState::Offline,
            distribution: Distribution::Paper,
            version_id: None,
            limits: limits(),
            config: config(),
        };

        let service = ApiInstanceService {
            pool: unconnected_pool(),
            dispatch,
            distributions: registry(),
        };

        let version = service.resolve_version(&record).await.unwrap();
        assert_eq!(version.id, "1.21.1");

        let client = service.dispatch.get(local_id).await.unwrap();
        client
            .launch(InstanceCreateData {
                id: record.id,
                name: record.name.clone(),
                version,
                limits: record.limits.clone(),
                config: record.config.clone(),
            })
            .await
            .unwrap();
        assert_eq!(runner.launched.lock().unwrap().as_slice(), &[record.id]);
    }

    #[tokio::test]
    async fn resolve_version_rejects_an_unregistered_distribution() {
        let record = InstanceRecord {
            id: Snowflake::from(1u64),
            name: "n".into(),
            node_id: Snowflake::from(1u64),
            owner: Snowflake::from(1u64),
            state: InstanceState::Offline,
            distribution: Distribution::Vanilla,
            version_id: None,
            limits: limits(),
            config: config(),
        };

        let service = ApiInstanceService {
            pool: unconnected_pool(),
            dispatch: dispatch_with_local(Arc::new(RecordingRunner::new()), Snowflake::from(1u64)),
            distributions: registry(),
        };

        let err = service.resolve_version(&record).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    fn unconnected_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/ignored")
            .expect("lazy pool construction never touches the network")
    }
}
