// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The Container Runtime Adapter trait and its implementations
//! (`spec.md` §4.3).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::instance::Instance;

/// Image resolution, data-directory materialization and container
/// lifecycle, bridging the Manager's abstract `create`/`launch`/`stop` to
/// a concrete container engine.
///
/// Operations take `&Arc<Instance>` rather than `&Instance`: `launch` must
/// hand an owned, independently-lived reference to the background log
/// reader task it spawns, and the Manager is the entry that already holds
/// the instance behind an `Arc`.
#[async_trait]
pub trait RuntimeAdapter: Send + Sync {
    /// Pull the image, materialize the data directory and jar, and create
    /// (but do not start) the container.
    async fn create(&self, instance: &Arc<Instance>) -> Result<()>;

    /// Start the container and attach a hijacked bidirectional stream,
    /// transitioning the instance to `STARTING` and starting its
    /// background log reader.
    async fn launch(&self, instance: &Arc<Instance>) -> Result<()>;

    /// Request a graceful stop with escalation, then transition to
    /// `OFFLINE` and close the instance.
    async fn stop(&self, instance: &Arc<Instance>) -> Result<()>;
}

/// Resolves a normalized Java LTS major version to a pullable container
/// image reference. One implementation currently: Eclipse Temurin JRE
/// images (`spec.md` §4.3 step 1, §9).
pub trait JavaVariant: Send + Sync {
    /// `"eclipse-temurin:<N>-jre-<distro>"`.
    fn image_for(&self, java_version: u32) -> String;
}

/// The Temurin-JRE image resolver; `distro` is the Debian/Alpine base tag
/// (`noble`, `alpine`, ...) read from configuration.
pub struct TemurinJre {
    distro: String,
}

impl TemurinJre {
    /// Build a resolver for the given base distro tag.
    pub fn new(distro: impl Into<String>) -> Self {
        TemurinJre { distro: distro.into() }
    }
}

impl JavaVariant for TemurinJre {
    fn image_for(&self, java_version: u32) -> String {
        format!("eclipse-temurin:{}-jre-{}", java_version, self.distro)
    }
}

/// The `bollard`-backed Docker Engine adapter.
pub mod docker;
/// `server.properties`/`eula.txt` materialization (`spec.md` §4.3 steps 4-6).
pub mod properties;
/// The Java command line builder (`spec.md` §4.3 step 7).
pub mod command;
/// A test double for [`RuntimeAdapter`].
pub mod mock;

pub use docker::DockerRuntimeAdapter;
pub use mock::MockRuntimeAdapter;
