// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The Distribution Resolver contract and its registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mc_core::{Distribution, DistributionVersion};

use crate::error::Result;

/// Resolves `(distribution, version)` pairs to downloadable artifacts.
///
/// One implementation per [`Distribution`] tag, registered in a
/// [`ResolverRegistry`].
#[async_trait]
pub trait DistributionResolver: Send + Sync {
    /// Resolve the latest released version.
    async fn latest(&self) -> Result<DistributionVersion>;

    /// Resolve a specific version id.
    async fn version(&self, id: &str) -> Result<DistributionVersion>;

    /// List all known version ids, oldest-to-newest as published.
    async fn list(&self) -> Result<Vec<String>>;
}

/// A registry of [`DistributionResolver`]s keyed by [`Distribution`] tag.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<Distribution, Arc<dyn DistributionResolver>>,
}

impl ResolverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Register a resolver for a distribution tag, replacing any previous
    /// registration.
    pub fn register(&mut self, distribution: Distribution, resolver: Arc<dyn DistributionResolver>) {
        self.resolvers.insert(distribution, resolver);
    }

    /// Look up the resolver for a distribution tag.
    pub fn get(&self, distribution: Distribution) -> Option<Arc<dyn DistributionResolver>> {
        self.resolvers.get(&distribution).cloned()
    }
}
