// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The `bollard`-backed Docker Engine adapter (`spec.md` §4.3).
//!
//! Grounded on `examples/original_source/internal/runner/runtime.go`
//! (`dockerRuntime`), which talks to `docker/docker/client` directly;
//! `bollard` is its Rust analogue against the same Engine HTTP API.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    AttachContainerOptions, AttachContainerResults, Config, CreateContainerOptions, LogOutput,
    StartContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{EndpointSettings, HostConfig, Mount, MountTypeEnum, PortBinding};
use bollard::network::{CreateNetworkOptions, InspectNetworkOptions};
use futures_util::StreamExt;
use mc_core::{Event, InstanceState};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{Result, RunnerError};
use crate::instance::Instance;
use crate::runtime::{JavaVariant, RuntimeAdapter, command, properties};

/// The grace window `stop` waits before the engine escalates beyond
/// `SIGINT` (`spec.md` §4.3).
const STOP_GRACE_SECONDS: i64 = 20;

/// Container image/network/data-directory driven runner, talking to the
/// local Docker Engine over `bollard`.
pub struct DockerRuntimeAdapter {
    docker: Docker,
    java: Arc<dyn JavaVariant>,
    container_prefix: String,
    network_name: String,
    network_id: Mutex<Option<String>>,
    data_root: PathBuf,
}

impl DockerRuntimeAdapter {
    /// Connect to the local Docker daemon and ensure the managed network
    /// exists, mirroring the original's `NewDockerRuntime`.
    pub async fn connect(
        container_prefix: impl Into<String>,
        network_name: impl Into<String>,
        data_root: PathBuf,
        java: Arc<dyn JavaVariant>,
    ) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        let adapter = DockerRuntimeAdapter {
            docker,
            java,
            container_prefix: container_prefix.into(),
            network_name: network_name.into(),
            network_id: Mutex::new(None),
            data_root,
        };
        adapter.ensure_network().await?;
        Ok(adapter)
    }

    async fn ensure_network(&self) -> Result<()> {
        match self
            .docker
            .inspect_network(&self.network_name, Some(InspectNetworkOptions::<String> {
                ..Default::default()
            }))
            .await
        {
            Ok(network) => {
                let id = network.id.unwrap_or_default();
                info!(network = %self.network_name, id = %id, "docker runtime: network fetched");
                *self.network_id.lock().await = Some(id);
                Ok(())
            }
            Err(_) => {
                let created = self
                    .docker
                    .create_network(CreateNetworkOptions {
                        name: self.network_name.clone(),
                        driver: "bridge".to_string(),
                        ..Default::default()
                    })
                    .await?;
                let id = created.id.unwrap_or_default();
                info!(network = %self.network_name, id = %id, "docker runtime: network created");
                *self.network_id.lock().await = Some(id);
                Ok(())
            }
        }
    }

    async fn pull_image(&self, java_version: u32) -> Result<String> {
        let image_ref = self.java.image_for(java_version);

        let mut stream = self.docker.create_image(
            Some(CreateImageOptions {
                from_image: image_ref.as_str(),
                ..Default::default()
            }),
            None,
            None,
        );

        while let Some(chunk) = stream.next().await {
            if let Err(e) = chunk {
                return Err(RunnerError::JavaVersion(e.to_string()));
            }
        }

        Ok(image_ref)
    }

    /// `<data_root>/<instance_id>/`.
    fn data_dir(&self, instance: &Instance) -> PathBuf {
        self.data_root.join(instance.id.to_string())
    }
}

#[async_trait]
impl RuntimeAdapter for DockerRuntimeAdapter {
    async fn create(&self, instance: &Arc<Instance>) -> Result<()> {
        let image = self.pull_image(instance.version.java_version).await?;

        let data_dir = self.data_dir(instance);
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| RunnerError::Filesystem(e.to_string()))?;

        let jar_name = mc_distribution::ArtifactDownloader::jar_filename(&instance.version);
        let jar_path = data_dir.join(&jar_name);
        if !tokio::fs::try_exists(&jar_path).await.unwrap_or(false) {
            let downloader = mc_distribution::ArtifactDownloader::default();
            downloader
                .download_to(&instance.version, &jar_path)
                .await
                .map_err(|e| RunnerError::InstanceCreate(e.to_string()))?;
        }

        properties::merge_server_properties(
            &data_dir,
            &instance.name,
            &instance.config,
            instance.limits.max_players,
        )
        .await?;
        properties::write_eula(&data_dir).await?;

        let container_name = format!("{}-{}", self.container_prefix, instance.id);
        let port = instance.config.port.to_string();
        let cmd = command::java_command(&instance.version.jvm_args, &jar_name, instance.limits.ram_mib());

        let network_id = self.network_id.lock().await.clone().unwrap_or_default();
        let mut endpoints = HashMap::new();
        endpoints.insert(
            self.network_name.clone(),
            EndpointSettings {
                network_id: Some(network_id),
                ..Default::default()
            },
        );

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            format!("{port}/tcp"),
            Some(vec![PortBinding {
                host_ip: Some("0.0.0.0".to_string()),
                host_port: Some(port.clone()),
            }]),
        );

        let config = Config {
            image: Some(image),
            attach_stdin: Some(true),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            open_stdin: Some(true),
            tty: Some(true),
            working_dir: Some("/game".to_string()),
            cmd: Some(cmd),
            host_config: Some(HostConfig {
                auto_remove: Some(true),
                cpu_percent: Some(instance.limits.cpu as i64),
                memory: Some(instance.limits.ram_bytes as i64),
                port_bindings: Some(port_bindings),
                mounts: Some(vec![Mount {
                    typ: Some(MountTypeEnum::BIND),
                    source: Some(data_dir.to_string_lossy().to_string()),
                    target: Some("/game".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            networking_config: Some(bollard::models::NetworkingConfig {
                endpoints_config: Some(endpoints),
            }),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(
                Some(CreateContainerOptions {
                    name: container_name,
                    platform: None,
                }),
                config,
            )
            .await
            .map_err(|e| RunnerError::InstanceCreate(e.to_string()))?;

        instance.set_container_id(created.id).await;
        Ok(())
    }

    async fn launch(&self, instance: &Arc<Instance>) -> Result<()> {
        let container_id = instance
            .container_id()
            .await
            .ok_or_else(|| RunnerError::InstanceLaunch("instance not created yet".into()))?;

        self.docker
            .start_container(&container_id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| RunnerError::InstanceLaunch(e.to_string()))?;

        let AttachContainerResults { output, input } = self
            .docker
            .attach_container(
                &container_id,
                Some(AttachContainerOptions::<String> {
                    stdin: Some(true),
                    stdout: Some(true),
                    stderr: Some(true),
                    stream: Some(true),
                    logs: Some(false),
                    ..Default::default()
                }),
            )
            .await
            .map_err(|e| RunnerError::InstanceLaunch(e.to_string()))?;

        instance.attach_stdin(input).await;
        instance.set_state(InstanceState::Starting);
        spawn_log_reader(instance.clone(), output);

        Ok(())
    }

    async fn stop(&self, instance: &Arc<Instance>) -> Result<()> {
        let container_id = instance
            .container_id()
            .await
            .ok_or_else(|| RunnerError::InstanceStop("instance not created yet".into()))?;

        if !instance.is_launched() {
            return Err(RunnerError::InstanceStop("instance not launched yet".into()));
        }

        instance.send_event(Event::shutting_down()).await;
        instance.set_state(InstanceState::ShuttingDown);

        let result = self
            .docker
            .stop_container(
                &container_id,
                Some(StopContainerOptions {
                    t: STOP_GRACE_SECONDS,
                    signal: Some("SIGINT".to_string()),
                }),
            )
            .await;

        if let Err(e) = result {
            return Err(RunnerError::InstanceStop(e.to_string()));
        }

        instance.set_state(InstanceState::Offline);
        instance.send_event(Event::stopped()).await;
        instance.close().await;
        Ok(())
    }
}

/// Read the attached stdout/stderr stream line-by-line, publishing each as
/// a `LOG` event, until the stream closes (the container exited) -
/// `spec.md` §4.4's background log reader. Exits silently on read error or
/// stream end; that is the normal termination path.
pub(crate) fn spawn_log_reader(
    instance: Arc<Instance>,
    mut output: std::pin::Pin<Box<dyn futures_util::Stream<Item = std::result::Result<LogOutput, bollard::errors::Error>> + Send>>,
) {
    tokio::spawn(async move {
        let mut buf = Vec::new();
        loop {
            match output.next().await {
                Some(Ok(chunk)) => {
                    let bytes = chunk.into_bytes();
                    buf.extend_from_slice(&bytes);
                    while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = buf.drain(..=pos).collect();
                        let line = &line[..line.len() - 1];
                        instance.send_event(Event::log(line.to_vec())).await;
                    }
                }
                Some(Err(e)) => {
                    warn!(instance_id = %instance.id, error = %e, "instance: logs closed");
                    break;
                }
                None => {
                    info!(instance_id = %instance.id, "instance: logs closed");
                    break;
                }
            }
        }
    });
}
