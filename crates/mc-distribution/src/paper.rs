// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PaperMC distribution resolver.

use async_trait::async_trait;
use mc_core::{Distribution, DistributionVersion, HashType};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{DistributionError, Result};
use crate::resolver::DistributionResolver;
use crate::validate::{require_id, require_url};

const VERSIONS_URL: &str = "https://fill.papermc.io/v3/projects/paper/versions";

#[derive(Debug, Deserialize)]
struct PaperVersionsResponse {
    versions: PaperVersionGroups,
}

#[derive(Debug, Deserialize)]
struct PaperVersionGroups {
    #[serde(flatten)]
    by_major: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PaperVersion {
    builds: Vec<u64>,
    java: PaperJavaInfo,
}

#[derive(Debug, Deserialize)]
struct PaperJavaInfo {
    version: PaperJavaVersionRange,
    flags: Option<PaperJavaFlags>,
}

#[derive(Debug, Deserialize)]
struct PaperJavaVersionRange {
    minimum: u32,
}

#[derive(Debug, Deserialize)]
struct PaperJavaFlags {
    recommended: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PaperBuild {
    downloads: HashMap<String, PaperBuildDownload>,
}

#[derive(Debug, Deserialize)]
struct PaperBuildDownload {
    #[allow(dead_code)]
    name: String,
    checksums: PaperChecksums,
    url: String,
}

#[derive(Debug, Deserialize)]
struct PaperChecksums {
    sha256: String,
}

/// Preferred key for the primary server jar in a build's download map.
/// PaperMC publishes the main artifact under one of these names; fall back
/// to the last-iterated entry only when neither is present, per the Open
/// Question resolved in DESIGN.md.
const PREFERRED_DOWNLOAD_KEYS: &[&str] = &["server:default", "application"];

/// Resolves Paper releases against PaperMC's public fill API.
pub struct PaperResolver {
    client: reqwest::Client,
}

impl PaperResolver {
    /// Build a resolver using the given HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_versions(&self) -> Result<Vec<String>> {
        let resp = self.client.get(VERSIONS_URL).send().await?;
        if !resp.status().is_success() {
            return Err(DistributionError::Transport(format!(
                "paper versions returned {}",
                resp.status()
            )));
        }
        let body: PaperVersionsResponse = resp.json().await?;
        let mut ids: Vec<String> = body.versions.by_major.into_values().flatten().collect();
        ids.sort();
        Ok(ids)
    }

    async fn fetch_version(&self, id: &str) -> Result<PaperVersion> {
        let url = format!("{VERSIONS_URL}/{id}");
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(DistributionError::NotFound(id.to_string()));
        }
        Ok(resp.json().await?)
    }

    async fn fetch_build(&self, id: &str, build: u64) -> Result<PaperBuild> {
        let url = format!("{VERSIONS_URL}/{id}/builds/{build}");
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(DistributionError::Transport(format!(
                "paper build {id}#{build} returned {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    fn select_download(build: &PaperBuild) -> Option<&PaperBuildDownload> {
        for key in PREFERRED_DOWNLOAD_KEYS {
            if let Some(d) = build.downloads.get(*key) {
                return Some(d);
            }
        }
        build.downloads.values().last()
    }

    async fn resolve(&self, id: &str) -> Result<DistributionVersion> {
        let version = self.fetch_version(id).await?;
        let latest_build = *version
            .builds
            .last()
            .ok_or_else(|| DistributionError::NotFound(id.to_string()))?;
        let build = self.fetch_build(id, latest_build).await?;

        let download = Self::select_download(&build)
            .ok_or_else(|| DistributionError::NotFound(format!("{id} has no downloads")))?;

        require_id(id)?;
        require_url(&download.url)?;
        let hash = hex::decode(&download.checksums.sha256)
            .map_err(|e| DistributionError::Validation(format!("invalid sha256 hex: {e}")))?;

        let jvm_args = version
            .java
            .flags
            .and_then(|f| f.recommended)
            .unwrap_or_default();

        Ok(DistributionVersion {
            id: id.to_string(),
            url: download.url.clone(),
            hash,
            hash_type: HashType::Sha256,
            distribution: Distribution::Paper,
            java_version: mc_core::normalize_java_lts(version.java.version.minimum),
            jvm_args,
        })
    }
}

#[async_trait]
impl DistributionResolver for PaperResolver {
    async fn latest(&self) -> Result<DistributionVersion> {
        let ids = self.fetch_versions().await?;
        let id = ids.last().ok_or_else(|| DistributionError::NotFound("paper".to_string()))?;
        self.resolve(id).await
    }

    async fn version(&self, id: &str) -> Result<DistributionVersion> {
        self.resolve(id).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        let ids = self.fetch_versions().await?;
        if ids.is_empty() {
            return Err(DistributionError::NotFound("paper".to_string()));
        }
        Ok(ids)
    }
}
