// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `DistributionService`: `spec.md` §6.

use async_trait::async_trait;
use mc_core::{Distribution, DistributionVersion};

use crate::error::Result;

/// Resolve distribution metadata to clients (CLI, API).
#[async_trait]
pub trait DistributionService: Send + Sync {
    /// `GetLatest(distro)`.
    async fn get_latest(&self, distro: Distribution) -> Result<DistributionVersion>;

    /// `GetVersion(distro, id)`.
    async fn get_version(&self, distro: Distribution, id: &str) -> Result<DistributionVersion>;

    /// `GetAll(distro)`.
    async fn get_all(&self, distro: Distribution) -> Result<Vec<String>>;
}
