// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridges a [`ResolverRegistry`] to [`mc_rpc::DistributionService`].
//!
//! Registered alongside `RunnerService` on the same node-local server, as
//! in `examples/original_source/cmd/runner/run.go`'s `Serve`, which binds
//! both a `DistributionServiceServer` and a `RunnerServiceServer`.

use async_trait::async_trait;
use mc_core::{Distribution, DistributionVersion};
use mc_distribution::ResolverRegistry;
use mc_rpc::distribution_service::DistributionService;
use mc_rpc::{Result as RpcResult, RpcError};

/// The node-local [`DistributionService`], backed by a [`ResolverRegistry`].
pub struct LocalDistributionService {
    registry: ResolverRegistry,
}

impl LocalDistributionService {
    /// Wrap a populated registry.
    pub fn new(registry: ResolverRegistry) -> Self {
        LocalDistributionService { registry }
    }

    fn resolver(&self, distribution: Distribution) -> RpcResult<std::sync::Arc<dyn mc_distribution::DistributionResolver>> {
        self.registry
            .get(distribution)
            .ok_or_else(|| RpcError::not_found(format!("no resolver registered for {distribution:?}")))
    }
}

#[async_trait]
impl DistributionService for LocalDistributionService {
    async fn get_latest(&self, distro: Distribution) -> RpcResult<DistributionVersion> {
        self.resolver(distro)?
            .latest()
            .await
            .map_err(|e| RpcError::new(e.kind(), e.to_string()))
    }

    async fn get_version(&self, distro: Distribution, id: &str) -> RpcResult<DistributionVersion> {
        self.resolver(distro)?
            .version(id)
            .await
            .map_err(|e| RpcError::new(e.kind(), e.to_string()))
    }

    async fn get_all(&self, distro: Distribution) -> RpcResult<Vec<String>> {
        self.resolver(distro)?
            .list()
            .await
            .map_err(|e| RpcError::new(e.kind(), e.to_string()))
    }
}
