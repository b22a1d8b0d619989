// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Mojang's "Vanilla" distribution resolver.

use async_trait::async_trait;
use mc_core::{Distribution, DistributionVersion, HashType};
use serde::Deserialize;

use crate::error::{DistributionError, Result};
use crate::resolver::DistributionResolver;
use crate::validate::{require_id, require_url};

const MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest.json";

#[derive(Debug, Deserialize)]
struct VanillaManifest {
    latest: VanillaLatest,
    versions: Vec<VanillaManifestVersion>,
}

#[derive(Debug, Deserialize)]
struct VanillaLatest {
    release: String,
}

#[derive(Debug, Deserialize)]
struct VanillaManifestVersion {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct VanillaVersion {
    downloads: VanillaDownloads,
    #[serde(rename = "javaVersion")]
    java_version: VanillaJavaVersion,
}

#[derive(Debug, Deserialize)]
struct VanillaDownloads {
    server: VanillaServerDownload,
}

#[derive(Debug, Deserialize)]
struct VanillaServerDownload {
    sha1: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct VanillaJavaVersion {
    #[serde(rename = "majorVersion")]
    major_version: u32,
}

/// Resolves Vanilla releases against Mojang's public version manifest.
pub struct VanillaResolver {
    client: reqwest::Client,
}

impl VanillaResolver {
    /// Build a resolver using the given HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_manifest(&self) -> Result<VanillaManifest> {
        let resp = self.client.get(MANIFEST_URL).send().await?;
        if !resp.status().is_success() {
            return Err(DistributionError::Transport(format!(
                "vanilla manifest returned {}",
                resp.status()
            )));
        }
        Ok(resp.json::<VanillaManifest>().await?)
    }

    async fn fetch_version(&self, entry: &VanillaManifestVersion) -> Result<DistributionVersion> {
        let resp = self.client.get(&entry.url).send().await?;
        if !resp.status().is_success() {
            return Err(DistributionError::Transport(format!(
                "vanilla version {} returned {}",
                entry.id,
                resp.status()
            )));
        }
        let version: VanillaVersion = resp.json().await?;

        require_id(&entry.id)?;
        require_url(&version.downloads.server.url)?;
        let hash = hex::decode(&version.downloads.server.sha1)
            .map_err(|e| DistributionError::Validation(format!("invalid sha1 hex: {e}")))?;

        Ok(DistributionVersion {
            id: entry.id.clone(),
            url: version.downloads.server.url,
            hash,
            hash_type: HashType::Sha1,
            distribution: Distribution::Vanilla,
            java_version: mc_core::normalize_java_lts(version.java_version.major_version),
            jvm_args: Vec::new(),
        })
    }
}

#[async_trait]
impl DistributionResolver for VanillaResolver {
    async fn latest(&self) -> Result<DistributionVersion> {
        let manifest = self.fetch_manifest().await?;
        let entry = manifest
            .versions
            .iter()
            .find(|v| v.id == manifest.latest.release)
            .ok_or_else(|| DistributionError::NotFound(manifest.latest.release.clone()))?;
        self.fetch_version(entry).await
    }

    async fn version(&self, id: &str) -> Result<DistributionVersion> {
        let manifest = self.fetch_manifest().await?;
        let entry = manifest
            .versions
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| DistributionError::NotFound(id.to_string()))?;
        self.fetch_version(entry).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        let manifest = self.fetch_manifest().await?;
        if manifest.versions.is_empty() {
            return Err(DistributionError::NotFound("vanilla".to_string()));
        }
        Ok(manifest.versions.into_iter().map(|v| v.id).collect())
    }
}
