// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! API configuration, loaded from a YAML or JSON file selected by extension
//! (`spec.md` §6), layered with environment variable overrides via the
//! `config` crate, mirroring `mc_runner::config`.

use std::path::{Path, PathBuf};

use mc_core::Snowflake;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default path the `-config` flag falls back to when unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mc/config.yaml";

/// `server.*` keys, shared with the runner config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind IP for the API's gRPC surface.
    #[serde(default = "default_ip")]
    pub ip: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret accepted under the `Server`/`SRV` bearer scheme.
    #[serde(default)]
    pub password: String,
    /// Whether gRPC server reflection is enabled.
    #[serde(default)]
    pub enable_reflection: bool,
}

fn default_ip() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8444
}

/// `auth.*` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT validity window, in seconds.
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: u64,
    /// Whether unauthenticated `Signup` calls are accepted.
    #[serde(default)]
    pub allow_signup: bool,
    /// bcrypt work factor for password hashing.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// PEM-encoded Ed25519 private key used to sign JWTs.
    pub private_key: String,
    /// PEM-encoded Ed25519 public key used to validate JWTs.
    pub public_key: String,
}

fn default_jwt_expiration() -> u64 {
    3600
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

/// `db.*` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Postgres connection string.
    pub url: String,
    /// Maximum pool size.
    #[serde(default = "default_max_conns")]
    pub max_conns: u32,
    /// Skip server-side statement preparation (for poolers like pgbouncer).
    #[serde(default)]
    pub skip_preparation: bool,
    /// Run pending SQL migrations on startup, in addition to `-migrate`.
    #[serde(default)]
    pub migrate: bool,
}

fn default_max_conns() -> u32 {
    10
}

/// `redis.*` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis/Valkey connection URL backing refresh tokens.
    pub url: String,
}

/// `runner.*` keys (API only): optionally embed a local, in-process runner
/// so a single binary can serve both the control plane and one node
/// without a network hop (`spec.md` §3: "a special 'local node' ID may be
/// registered in-process without a row").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerEmbedConfig {
    /// Whether to embed a local runner at all.
    #[serde(default)]
    pub enable: bool,
    /// The snowflake this embedded runner is addressed as.
    #[serde(default)]
    pub id: Snowflake,
    /// Container engine configuration for the embedded runner.
    #[serde(default)]
    pub docker: mc_runner::config::DockerConfig,
    /// Data directory configuration for the embedded runner.
    #[serde(default)]
    pub data: mc_runner::config::DataConfig,
}

impl Default for RunnerEmbedConfig {
    fn default() -> Self {
        RunnerEmbedConfig {
            enable: false,
            id: Snowflake::NULL,
            docker: mc_runner::config::DockerConfig::default(),
            data: mc_runner::config::DataConfig::default(),
        }
    }
}

/// Top-level API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// gRPC bind configuration.
    pub server: ServerConfig,
    /// Auth (JWT + bcrypt) configuration.
    pub auth: AuthConfig,
    /// Postgres configuration.
    pub db: DbConfig,
    /// Redis configuration (refresh-token KV store).
    pub redis: RedisConfig,
    /// Optional embedded local runner.
    #[serde(default)]
    pub runner: RunnerEmbedConfig,
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file extension is not one of `.yaml`, `.yml`, `.json`, `.jsonc`.
    #[error("failed to locate config file at '{0}': unknown extension")]
    UnknownExtension(String),

    /// The `config` crate failed to load or deserialize the layered
    /// sources.
    #[error("failed to load config: {0}")]
    Load(#[from] config::ConfigError),
}

/// Load configuration from `path`, selecting the file format by extension
/// and layering `MC_API_*` environment variable overrides on top
/// (`server.port` -> `MC_API_SERVER__PORT`).
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let format = format_for_extension(path)?;

    let builder = config::Config::builder()
        .add_source(config::File::from(path).format(format))
        .add_source(
            config::Environment::with_prefix("MC_API")
                .separator("__")
                .try_parsing(true),
        );

    let loaded = builder.build()?;
    Ok(loaded.try_deserialize()?)
}

/// Resolve the config path: `-config <path>` CLI flag, else `CONFIG_FILE`
/// env var, else [`DEFAULT_CONFIG_PATH`].
pub fn resolve_path(cli_flag: Option<&str>) -> PathBuf {
    if let Some(p) = cli_flag {
        return PathBuf::from(p);
    }
    if let Ok(p) = std::env::var("CONFIG_FILE") {
        return PathBuf::from(p);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

fn format_for_extension(path: &Path) -> Result<config::FileFormat, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(config::FileFormat::Yaml),
        Some("json") | Some("jsonc") => Ok(config::FileFormat::Json),
        _ => Err(ConfigError::UnknownExtension(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_yaml_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "server:\n  port: 9001\n\
             auth:\n  private_key: \"pk\"\n  public_key: \"pub\"\n\
             db:\n  url: postgres://localhost/mc\n\
             redis:\n  url: redis://localhost\n",
        )
        .unwrap();

        let cfg = load(&path).unwrap();
        assert_eq!(cfg.server.port, 9001);
        assert_eq!(cfg.auth.jwt_expiration, 3600);
        assert!(!cfg.auth.allow_signup);
        assert!(!cfg.runner.enable);
        assert_eq!(cfg.db.max_conns, 10);
    }

    #[test]
    fn format_for_extension_recognizes_yaml_and_json() {
        assert!(matches!(format_for_extension(Path::new("x.yaml")), Ok(config::FileFormat::Yaml)));
        assert!(matches!(format_for_extension(Path::new("x.json")), Ok(config::FileFormat::Json)));
        assert!(format_for_extension(Path::new("x.toml")).is_err());
    }
}
