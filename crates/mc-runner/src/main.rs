// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! mc-runner - Per-node Instance Manager and Container Runtime Adapter
//!
//! Accepts `-config <path>` (default `/etc/mc/config.yaml`, overridden by
//! `CONFIG_FILE`), connects to the local Docker Engine, and serves the
//! node-local `RunnerService` surface. Generating the gRPC transport itself
//! is out of scope; this binary wires the service up and waits for a
//! shutdown signal.

use std::process::ExitCode;
use std::sync::Arc;

use mc_core::Distribution;
use mc_distribution::{PaperResolver, ResolverRegistry, VanillaResolver};
use mc_runner::runtime::{DockerRuntimeAdapter, TemurinJre};
use mc_runner::{LocalDistributionService, LocalRunnerService, Manager};
use tracing::{error, info};

fn config_path_from_args() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "-config" || arg == "--config" {
            return args.next();
        }
        if let Some(value) = arg.strip_prefix("-config=") {
            return Some(value.to_string());
        }
    }
    None
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mc_runner=info".into()),
        )
        .init();

    let config_path = mc_runner::config::resolve_path(config_path_from_args().as_deref());

    let config = match mc_runner::config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(path = %config_path.display(), error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    info!(
        path = %config_path.display(),
        addr = %format!("{}:{}", config.server.ip, config.server.port),
        "mc-runner: config loaded"
    );

    let java = Arc::new(TemurinJre::new(config.docker.java_distro.clone()));
    let runtime = match DockerRuntimeAdapter::connect(
        config.docker.prefix.clone(),
        config.docker.network_name.clone(),
        config.data.data_dir.clone(),
        java,
    )
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "failed to connect to docker");
            return ExitCode::FAILURE;
        }
    };

    let manager = Arc::new(Manager::new(Arc::new(runtime)));
    let _runner_service = LocalRunnerService::new(manager.clone());

    let mut registry = ResolverRegistry::new();
    registry.register(Distribution::Vanilla, Arc::new(VanillaResolver::new(reqwest::Client::new())));
    registry.register(Distribution::Paper, Arc::new(PaperResolver::new(reqwest::Client::new())));
    let _distribution_service = LocalDistributionService::new(registry);

    info!(
        addr = %format!("{}:{}", config.server.ip, config.server.port),
        reflection = config.server.enable_reflection,
        "mc-runner: ready"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        return ExitCode::FAILURE;
    }
    info!("mc-runner: shutdown signal received");

    ExitCode::SUCCESS
}
