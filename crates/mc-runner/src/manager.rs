// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The Instance Manager: an in-memory registry keyed by instance id,
//! enforcing single-flight launch semantics (`spec.md` §4.5).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use mc_core::{InstanceCreateData, Snowflake};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::error::{Result, RunnerError};
use crate::instance::Instance;
use crate::runtime::RuntimeAdapter;

/// Registry of live instances on this node, backed by a single read-write
/// lock guarding the map only. `launch`/`stop` release that lock before
/// invoking the Runtime Adapter, so multiple instances may be
/// creating/starting in parallel (`spec.md` §4.5, §5 — deliberately
/// stronger than the original Go source, which holds its lock across the
/// adapter calls; see DESIGN.md).
pub struct Manager {
    instances: RwLock<HashMap<Snowflake, Arc<Instance>>>,
    runtime: Arc<dyn RuntimeAdapter>,
}

impl Manager {
    /// Build a manager around a concrete [`RuntimeAdapter`].
    pub fn new(runtime: Arc<dyn RuntimeAdapter>) -> Self {
        Manager {
            instances: RwLock::new(HashMap::new()),
            runtime,
        }
    }

    /// Validate, register, then `create` and `launch` via the runtime
    /// adapter. On any failure in either step the registry entry is
    /// removed before the error is returned, so `get_by_id` never observes
    /// a ghost instance (`spec.md` §4.5, §8 property 2, scenario S3).
    pub async fn launch(&self, data: InstanceCreateData) -> Result<Arc<Instance>> {
        let start = Instant::now();
        let id = data.id;

        let instance = Arc::new(Instance::new(data)?);

        {
            let mut instances = self.instances.write().await;
            if instances.contains_key(&id) {
                return Err(RunnerError::AlreadyExists(id.to_string()));
            }
            instances.insert(id, instance.clone());
        }

        if let Err(e) = self.runtime.create(&instance).await {
            error!(instance_id = %id, took = ?start.elapsed(), error = %e, "manager: failed to create instance");
            self.instances.write().await.remove(&id);
            return Err(e);
        }

        if let Err(e) = self.runtime.launch(&instance).await {
            error!(instance_id = %id, took = ?start.elapsed(), error = %e, "manager: failed to launch instance");
            self.instances.write().await.remove(&id);
            return Err(e);
        }

        info!(instance_id = %id, took = ?start.elapsed(), "manager: launched instance");
        Ok(instance)
    }

    /// Read-lock lookup; `NotFound` if absent.
    pub async fn get_by_id(&self, id: Snowflake) -> Result<Arc<Instance>> {
        self.instances
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RunnerError::InstanceNotFound(id.to_string()))
    }

    /// Read-lock lookup of several ids, in request order. `NotFound` on the
    /// first missing id (all-or-nothing).
    pub async fn get_many(&self, ids: &[Snowflake]) -> Result<Vec<Arc<Instance>>> {
        let instances = self.instances.read().await;
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            let instance = instances
                .get(&id)
                .cloned()
                .ok_or_else(|| RunnerError::InstanceNotFound(id.to_string()))?;
            out.push(instance);
        }
        Ok(out)
    }

    /// Invoke `stop` via the runtime adapter, then remove the registry
    /// entry regardless of outcome. The adapter's `stop` is responsible for
    /// calling [`Instance::close`] (`spec.md` §4.3, §4.5, §9 Open Question:
    /// this matches the literal source behavior rather than the "retain on
    /// failure" production recommendation; see DESIGN.md).
    pub async fn stop(&self, id: Snowflake) -> Result<()> {
        let start = Instant::now();

        let instance = self
            .instances
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RunnerError::InstanceNotFound(id.to_string()))?;

        let result = self.runtime.stop(&instance).await;
        self.instances.write().await.remove(&id);

        match &result {
            Ok(()) => info!(instance_id = %id, took = ?start.elapsed(), "manager: stopped instance"),
            Err(e) => error!(instance_id = %id, took = ?start.elapsed(), error = %e, "manager: failed to stop instance"),
        }

        result
    }

    /// Number of instances currently registered (test/diagnostic helper).
    pub async fn len(&self) -> usize {
        self.instances.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::mock::MockRuntimeAdapter;
    use mc_core::{Distribution, DistributionVersion, HashType, InstanceConfig, InstanceLimits};

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
    async fn s1_happy_launch() {
        let runtime = Arc::new(MockRuntimeAdapter::new());
        let manager = Manager::new(runtime);

        let instance = manager.launch(create_data(42)).await.unwrap();
        assert_eq!(instance.id, Snowflake::from(42u64));

        let fetched = manager.get_by_id(Snowflake::from(42u64)).await.unwrap();
        assert_eq!(fetched.get_state(), mc_core::InstanceState::Starting);
    }

    #[tokio::test]
    async fn s2_duplicate_launch() {
        let runtime = Arc::new(MockRuntimeAdapter::new());
        let manager = Manager::new(runtime);

        manager.launch(create_data(42)).await.unwrap();
        let err = manager.launch(create_data(42)).await.unwrap_err();
        assert!(matches!(err, RunnerError::AlreadyExists(_)));
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn s3_launch_failure_rolls_back() {
        let runtime = Arc::new(MockRuntimeAdapter::new().failing_launch());
        let manager = Manager::new(runtime);

        let err = manager.launch(create_data(7)).await.unwrap_err();
        assert!(matches!(err, RunnerError::InstanceLaunch(_)));

        let not_found = manager.get_by_id(Snowflake::from(7u64)).await.unwrap_err();
        assert!(matches!(not_found, RunnerError::InstanceNotFound(_)));
        assert_eq!(manager.len().await, 0);
    }

    #[tokio::test]
    async fn create_failure_also_rolls_back() {
        let runtime = Arc::new(MockRuntimeAdapter::new().failing_create());
        let manager = Manager::new(runtime);

        let err = manager.launch(create_data(8)).await.unwrap_err();
        assert!(matches!(err, RunnerError::InstanceCreate(_)));
        assert_eq!(manager.len().await, 0);
    }

    #[tokio::test]
    async fn get_many_is_all_or_nothing() {
        let runtime = Arc::new(MockRuntimeAdapter::new());
        let manager = Manager::new(runtime);
        manager.launch(create_data(1)).await.unwrap();
        manager.launch(create_data(2)).await.unwrap();

        let ok = manager
            .get_many(&[Snowflake::from(1u64), Snowflake::from(2u64)])
            .await
            .unwrap();
        assert_eq!(ok.len(), 2);

        let err = manager
            .get_many(&[Snowflake::from(1u64), Snowflake::from(999u64)])
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::InstanceNotFound(_)));
    }

    #[tokio::test]
    async fn stop_removes_entry_even_on_error() {
        let runtime = Arc::new(MockRuntimeAdapter::new().failing_stop());
        let manager = Manager::new(runtime);
        manager.launch(create_data(5)).await.unwrap();

        let err = manager.stop(Snowflake::from(5u64)).await.unwrap_err();
        assert!(matches!(err, RunnerError::InstanceStop(_)));
        assert_eq!(manager.len().await, 0);
    }
}
