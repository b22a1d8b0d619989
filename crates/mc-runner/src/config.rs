// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runner configuration, loaded from a YAML or JSON file selected by
//! extension (`spec.md` §6), layered with environment variable overrides
//! via the `config` crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default path the `-config` flag falls back to when unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mc/config.yaml";

/// `server.*` keys, shared with the API config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind IP for this node's runner gRPC surface and status proxy.
    #[serde(default = "default_ip")]
    pub ip: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret nodes present as the bearer credential.
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
    8443
}

/// `docker.*` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerConfig {
    /// Docker Engine endpoint; empty uses the platform default
    /// (`DOCKER_HOST` or the local socket).
    #[serde(default)]
    pub url: String,
    /// Container name prefix, e.g. `"mc"` -> `"mc-<instance_id>"`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Name of the bridge network instances are attached to.
    #[serde(default = "default_network_name")]
    pub network_name: String,
    /// Base image distro tag for Temurin-JRE images (`noble`, `alpine`, ...).
    #[serde(default = "default_java_distro")]
    pub java_distro: String,
}

fn default_prefix() -> String {
    "mc".to_string()
}

fn default_network_name() -> String {
    "mc-manager".to_string()
}

fn default_java_distro() -> String {
    "noble".to_string()
}

impl Default for DockerConfig {
    fn default() -> Self {
        DockerConfig {
            url: String::new(),
            prefix: default_prefix(),
            network_name: default_network_name(),
            java_distro: default_java_distro(),
        }
    }
}

/// `data.*` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root directory under which `<instance_id>/` data directories live.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/mc-manager")
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: default_data_dir(),
        }
    }
}

/// Top-level runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// gRPC/status-proxy bind configuration.
    pub server: ServerConfig,
    /// Container engine configuration.
    pub docker: DockerConfig,
    /// Data directory configuration.
    pub data: DataConfig,
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
/// and layering `MC_RUNNER_*` environment variable overrides on top
/// (`server.port` -> `MC_RUNNER_SERVER__PORT`).
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let format = format_for_extension(path)?;

    let builder = config::Config::builder()
        .add_source(config::File::from(path).format(format))
        .add_source(
            config::Environment::with_prefix("MC_RUNNER")
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
    fn resolve_path_prefers_cli_flag() {
        let p = resolve_path(Some("/tmp/custom.yaml"));
        assert_eq!(p, PathBuf::from("/tmp/custom.yaml"));
    }

    #[test]
    fn resolve_path_falls_back_to_default() {
        // SAFETY: this test does not run concurrently with others that
        // touch CONFIG_FILE.
        unsafe { std::env::remove_var("CONFIG_FILE") };
        let p = resolve_path(None);
        assert_eq!(p, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn format_for_extension_recognizes_yaml_and_json() {
        assert!(matches!(
            format_for_extension(Path::new("x.yaml")),
            Ok(config::FileFormat::Yaml)
        ));
        assert!(matches!(
            format_for_extension(Path::new("x.yml")),
            Ok(config::FileFormat::Yaml)
        ));
        assert!(matches!(
            format_for_extension(Path::new("x.json")),
            Ok(config::FileFormat::Json)
        ));
        assert!(matches!(
            format_for_extension(Path::new("x.jsonc")),
            Ok(config::FileFormat::Json)
        ));
        assert!(format_for_extension(Path::new("x.toml")).is_err());
    }

    #[test]
    fn loads_yaml_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "server:\n  port: 9000\ndocker:\n  prefix: test\n  network_name: test-net\n  java_distro: alpine\ndata:\n  data_dir: /data\n",
        )
        .unwrap();

        let cfg = load(&path).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.docker.prefix, "test");
        assert_eq!(cfg.docker.network_name, "test-net");
        assert_eq!(cfg.data.data_dir, PathBuf::from("/data"));
    }
}
