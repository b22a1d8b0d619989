// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Streams a [`DistributionVersion`]'s artifact to disk while verifying its
//! hash, with a content-addressed skip-if-exists shortcut and single-flight
//! per destination path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use mc_core::{DistributionVersion, HashType};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{DistributionError, Result};

/// Streams artifacts for a [`crate::resolver::DistributionResolver`] and
/// verifies their digest on completion.
#[derive(Clone)]
pub struct ArtifactDownloader {
    client: reqwest::Client,
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
}

impl Default for ArtifactDownloader {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl ArtifactDownloader {
    /// Build a downloader using the given HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Content-addressed jar filename: `<distribution>-<version_id>-<hex(hash[0:4])>.jar`.
    pub fn jar_filename(version: &DistributionVersion) -> String {
        let prefix: &[u8] = if version.hash.len() > 4 {
            &version.hash[0..4]
        } else {
            &version.hash
        };
        format!(
            "{}-{}-{}.jar",
            version.distribution.tag(),
            version.id,
            hex::encode(prefix)
        )
    }

    /// Download `version`'s artifact to `destination`, verifying its hash.
    ///
    /// If `destination` already exists, the download is skipped entirely
    /// (content-addressed shortcut - the filename already encodes the hash
    /// prefix). Concurrent calls for the same `destination` are
    /// single-flighted: only one performs the actual transfer.
    pub async fn download_to(&self, version: &DistributionVersion, destination: &Path) -> Result<()> {
        if fs::try_exists(destination).await? {
            return Ok(());
        }

        {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.insert(destination.to_path_buf()) {
                // Another task is already downloading this exact path; wait
                // for it to finish by polling existence (the happy path
                // above will short-circuit once it lands).
                drop(in_flight);
                while !fs::try_exists(destination).await? {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                }
                return Ok(());
            }
        }

        let result = self.download_to_inner(version, destination).await;

        self.in_flight.lock().await.remove(destination);
        result
    }

    async fn download_to_inner(&self, version: &DistributionVersion, destination: &Path) -> Result<()> {
        let resp = self.client.get(&version.url).send().await?;
        if !resp.status().is_success() {
            return Err(DistributionError::Transport(format!(
                "artifact download returned {}",
                resp.status()
            )));
        }

        let mut hasher = Hasher::new(version.hash_type);
        let mut file = fs::File::create(destination).await?;
        let mut stream = resp.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        if version.requires_hash_check() {
            let digest = hasher.finalize();
            if digest != version.hash {
                let _ = fs::remove_file(destination).await;
                return Err(DistributionError::HashFailed {
                    path: destination.display().to_string(),
                    expected: hex::encode(&version.hash),
                    actual: hex::encode(&digest),
                });
            }
        }

        Ok(())
    }
}

enum Hasher {
    None,
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    fn new(hash_type: HashType) -> Self {
        match hash_type {
            HashType::None => Hasher::None,
            HashType::Sha1 => Hasher::Sha1(Sha1::new()),
            HashType::Sha224 => Hasher::Sha224(Sha224::new()),
            HashType::Sha256 => Hasher::Sha256(Sha256::new()),
            HashType::Sha384 => Hasher::Sha384(Sha384::new()),
            HashType::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::None => {}
            Hasher::Sha1(h) => h.update(data),
            Hasher::Sha224(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha384(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Hasher::None => Vec::new(),
            Hasher::Sha1(h) => h.finalize().to_vec(),
            Hasher::Sha224(h) => h.finalize().to_vec(),
            Hasher::Sha256(h) => h.finalize().to_vec(),
            Hasher::Sha384(h) => h.finalize().to_vec(),
            Hasher::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::Distribution;

    fn version(hash_type: HashType, hash: Vec<u8>) -> DistributionVersion {
        DistributionVersion {
            id: "1.21.1".to_string(),
            url: "http://example.invalid/server.jar".to_string(),
            hash,
            hash_type,
            distribution: Distribution::Paper,
            java_version: 21,
            jvm_args: vec![],
        }
    }

    #[test]
    fn jar_filename_truncates_hash_prefix() {
        let v = version(HashType::Sha256, vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x11]);
        assert_eq!(ArtifactDownloader::jar_filename(&v), "paper-1.21.1-deadbeef.jar");
    }

    #[test]
    fn jar_filename_handles_short_hash() {
        let v = version(HashType::None, vec![0xab]);
        assert_eq!(ArtifactDownloader::jar_filename(&v), "paper-1.21.1-ab.jar");
    }

    #[test]
    fn hasher_covers_every_hash_type_with_known_digests() {
        // NIST test vectors for the empty string, one per HashType variant
        // that carries a digest.
        let cases: &[(HashType, &str)] = &[
            (HashType::Sha1, "da39a3ee5e6b4b0d3255bfef95601890afd80709"),
            (
                HashType::Sha224,
                "d14a028c2a3a2bc9476102bb288234c415a2b01f828ea62ac5b3e42f",
            ),
            (
                HashType::Sha256,
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            ),
            (
                HashType::Sha384,
                "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da274edebfe76f65fbd51ad2f14898b95b",
            ),
            (
                HashType::Sha512,
                "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e",
            ),
        ];

        for (hash_type, expected_hex) in cases {
            let mut hasher = Hasher::new(*hash_type);
            hasher.update(b"");
            let digest = hasher.finalize();
            assert_eq!(hex::encode(&digest), *expected_hex);
        }
    }
}
