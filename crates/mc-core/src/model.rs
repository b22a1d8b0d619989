// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Domain types shared by the resolver, runtime adapter and manager:
//! distribution metadata, instance limits/config, and the Java-LTS
//! normalization policy.

use serde::{Deserialize, Serialize};

use crate::snowflake::Snowflake;

/// The flavor of Minecraft server software.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Mojang's reference server.
    Vanilla,
    /// PaperMC's fork.
    Paper,
}

impl Distribution {
    /// Lowercase tag used as a resolver-registry key and jar-filename
    /// component.
    pub fn tag(self) -> &'static str {
        match self {
            Distribution::Vanilla => "vanilla",
            Distribution::Paper => "paper",
        }
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Distribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vanilla" => Ok(Distribution::Vanilla),
            "paper" => Ok(Distribution::Paper),
            other => Err(format!("unknown distribution: {other}")),
        }
    }
}

/// Digest algorithm used to verify a downloaded artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashType {
    /// Hash verification is skipped.
    None,
    /// SHA-1 (160 bit). Used by the Vanilla manifest.
    Sha1,
    /// SHA-256 (256 bit). Used by the Paper manifest.
    Sha256,
    /// SHA-224 (224 bit).
    Sha224,
    /// SHA-384 (384 bit).
    Sha384,
    /// SHA-512 (512 bit).
    Sha512,
}

/// Immutable record produced by the Distribution Resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionVersion {
    /// Semver-like version id, e.g. `"1.21.1"`.
    pub id: String,
    /// Download endpoint for the server jar.
    pub url: String,
    /// Raw digest bytes, empty when `hash_type == HashType::None`.
    pub hash: Vec<u8>,
    /// Digest algorithm `hash` was computed with.
    pub hash_type: HashType,
    /// The distribution this version belongs to.
    pub distribution: Distribution,
    /// Normalized Java LTS major version (8, 11, 17, 21 or 24).
    pub java_version: u32,
    /// Ordered extra JVM arguments recommended for this version.
    pub jvm_args: Vec<String>,
}

impl DistributionVersion {
    /// Whether this version requires hash verification on download.
    pub fn requires_hash_check(&self) -> bool {
        !matches!(self.hash_type, HashType::None)
    }
}

/// The supported Java LTS releases, smallest first.
pub const JAVA_LTS_BUCKETS: [u32; 5] = [8, 11, 17, 21, 24];

/// Normalize a raw "minimum major version" to the smallest LTS bucket that
/// is greater than or equal to it. Anything above the highest known LTS
/// (24) also buckets to 24 (forward-compatibility policy) rather than
/// falling back to the lowest bucket.
pub fn normalize_java_lts(raw_major: u32) -> u32 {
    JAVA_LTS_BUCKETS
        .iter()
        .copied()
        .find(|&lts| lts >= raw_major)
        .unwrap_or(*JAVA_LTS_BUCKETS.last().unwrap())
}

/// Resource limits for an instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceLimits {
    /// Duration (seconds) of inactivity before auto-shutdown; `<= 0` means
    /// "use the default".
    pub shutdown_after_idle_secs: i64,
    /// Whether idle auto-shutdown is enabled at all.
    pub auto_shutdown: bool,
    /// Maximum player count advertised/enforced.
    pub max_players: i32,
    /// CPU limit in 1/100ths of a core (0-6400).
    pub cpu: u32,
    /// Memory limit in bytes (512 MiB..=512 GiB).
    pub ram_bytes: u64,
}

impl InstanceLimits {
    /// Lower bound for `ram_bytes` (512 MiB).
    pub const MIN_RAM_BYTES: u64 = 512 * 1024 * 1024;
    /// Upper bound for `ram_bytes` (512 GiB).
    pub const MAX_RAM_BYTES: u64 = 512 * 1024 * 1024 * 1024;
    /// Upper bound for `cpu` (64 full cores).
    pub const MAX_CPU: u32 = 6400;

    /// Validate range invariants, returning a human-readable reason on
    /// violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.cpu > Self::MAX_CPU {
            return Err(format!("cpu limit {} exceeds maximum {}", self.cpu, Self::MAX_CPU));
        }
        if !(Self::MIN_RAM_BYTES..=Self::MAX_RAM_BYTES).contains(&self.ram_bytes) {
            return Err(format!(
                "ram_bytes {} out of range [{}, {}]",
                self.ram_bytes,
                Self::MIN_RAM_BYTES,
                Self::MAX_RAM_BYTES
            ));
        }
        Ok(())
    }

    /// RAM limit in whole mebibytes, for `-Xmx<N>M`.
    pub fn ram_mib(&self) -> u64 {
        self.ram_bytes / (1024 * 1024)
    }
}

/// Server-facing configuration for an instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// `server.properties` difficulty; defaults to `"easy"` if empty.
    pub difficulty: String,
    /// The admin user id this instance belongs to.
    pub admin: Snowflake,
    /// The port the server listens on (and the proxy fronts).
    pub port: u16,
    /// View distance in chunks; defaults to 8 if 0.
    pub view_distance: u32,
    /// Simulation distance in chunks; defaults to 7 if 0.
    pub simulation_distance: u32,
    /// When true, `online-mode` is set to `false` (pirated/cracked clients
    /// allowed).
    pub allow_pirate: bool,
    /// Whether PVP is enabled.
    pub pvp: bool,
}

impl InstanceConfig {
    /// Apply the documented defaults for fields left at their zero value.
    pub fn with_defaults(mut self) -> Self {
        if self.difficulty.is_empty() {
            self.difficulty = "easy".to_string();
        }
        if self.view_distance == 0 {
            self.view_distance = 8;
        }
        if self.simulation_distance == 0 {
            self.simulation_distance = 7;
        }
        self
    }
}

/// The live state of an instance, monotonically progressing
/// `Offline -> Starting -> Running -> ShuttingDown -> Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum InstanceState {
    /// No container running.
    Offline = 0,
    /// Container created and started, stdio not yet attached/confirmed.
    Starting = 1,
    /// Fully up.
    Running = 2,
    /// Stop has been requested; grace period in progress.
    ShuttingDown = 3,
}

/// Input to `Manager::launch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceCreateData {
    /// Caller-assigned id; must not already exist in the registry.
    pub id: Snowflake,
    /// Display name; also used as `server.properties` `motd`.
    pub name: String,
    /// Resolved distribution version to run.
    pub version: DistributionVersion,
    /// Resource limits.
    pub limits: InstanceLimits,
    /// Server configuration.
    pub config: InstanceConfig,
}

impl InstanceCreateData {
    /// Validate all nested invariants, returning the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.id.is_null() {
            return Err("id must not be the null snowflake".to_string());
        }
        if self.config.port == 0 {
            return Err("port is required".to_string());
        }
        if self.config.admin.is_null() {
            return Err("admin is required".to_string());
        }
        self.limits.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_lts_buckets_known_values() {
        assert_eq!(normalize_java_lts(1), 8);
        assert_eq!(normalize_java_lts(8), 8);
        assert_eq!(normalize_java_lts(9), 11);
        assert_eq!(normalize_java_lts(16), 17);
        assert_eq!(normalize_java_lts(17), 17);
        assert_eq!(normalize_java_lts(20), 21);
        assert_eq!(normalize_java_lts(21), 21);
        assert_eq!(normalize_java_lts(22), 24);
        assert_eq!(normalize_java_lts(24), 24);
    }

    #[test]
    fn java_lts_forward_compat_buckets_to_24() {
        assert_eq!(normalize_java_lts(25), 24);
        assert_eq!(normalize_java_lts(100), 24);
    }

    #[test]
    fn java_lts_is_monotonic() {
        let mut prev = 0;
        for raw in 1..=50u32 {
            let n = normalize_java_lts(raw);
            assert!(n >= prev);
            prev = n;
        }
    }

    #[test]
    fn java_lts_is_idempotent_over_lts_set() {
        for &lts in &JAVA_LTS_BUCKETS {
            assert_eq!(normalize_java_lts(lts), lts);
            assert_eq!(normalize_java_lts(normalize_java_lts(lts)), lts);
        }
    }

    #[test]
    fn instance_config_defaults() {
        let cfg = InstanceConfig {
            difficulty: String::new(),
            admin: Snowflake::from(1u64),
            port: 25565,
            view_distance: 0,
            simulation_distance: 0,
            allow_pirate: false,
            pvp: true,
        }
        .with_defaults();
        assert_eq!(cfg.difficulty, "easy");
        assert_eq!(cfg.view_distance, 8);
        assert_eq!(cfg.simulation_distance, 7);
    }

    #[test]
    fn limits_validate_ram_bounds() {
        let mut limits = InstanceLimits {
            shutdown_after_idle_secs: 0,
            auto_shutdown: false,
            max_players: 20,
            cpu: 100,
            ram_bytes: InstanceLimits::MIN_RAM_BYTES - 1,
        };
        assert!(limits.validate().is_err());
        limits.ram_bytes = InstanceLimits::MIN_RAM_BYTES;
        assert!(limits.validate().is_ok());
        limits.ram_bytes = InstanceLimits::MAX_RAM_BYTES + 1;
        assert!(limits.validate().is_err());
    }
}
