// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! mc-api - Control-plane API: node/user persistence, auth and the
//! Dispatch Cache
//!
//! Accepts `-config <path>` (default `/etc/mc/config.yaml`, overridden by
//! `CONFIG_FILE`) and `-migrate` (run pending SQL migrations then exit
//! `0`). Generating the gRPC transport itself is out of scope; this binary
//! wires the services up and waits for a shutdown signal.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use mc_api::dispatch::UnimplementedConnector;
use mc_api::{ApiAuthService, ApiInstanceService, ApiNodeService, ApiUserService, DispatchCache, JwtAuther, RedisKvStore};
use mc_core::Distribution;
use mc_distribution::{PaperResolver, ResolverRegistry, VanillaResolver};
use mc_runner::runtime::{DockerRuntimeAdapter, TemurinJre};
use mc_runner::{LocalRunnerService, Manager};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

struct Args {
    config_path: Option<String>,
    migrate_only: bool,
}

fn parse_args() -> Args {
    let mut config_path = None;
    let mut migrate_only = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "-config" || arg == "--config" {
            config_path = args.next();
        } else if let Some(value) = arg.strip_prefix("-config=") {
            config_path = Some(value.to_string());
        } else if arg == "-migrate" || arg == "--migrate" {
            migrate_only = true;
        }
    }
    Args { config_path, migrate_only }
}

fn build_distribution_registry() -> ResolverRegistry {
    let mut registry = ResolverRegistry::new();
    registry.register(Distribution::Vanilla, Arc::new(VanillaResolver::new(reqwest::Client::new())));
    registry.register(Distribution::Paper, Arc::new(PaperResolver::new(reqwest::Client::new())));
    registry
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "mc_api=info".into()),
        )
        .init();

    let args = parse_args();
    let config_path = mc_api::config::resolve_path(args.config_path.as_deref());

    let config = match mc_api::config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(path = %config_path.display(), error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    info!(
        path = %config_path.display(),
        addr = %format!("{}:{}", config.server.ip, config.server.port),
        "mc-api: config loaded"
    );

    let pool = match PgPoolOptions::new()
        .max_connections(config.db.max_conns)
        .connect(&config.db.url)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "failed to connect to postgres");
            return ExitCode::FAILURE;
        }
    };

    if args.migrate_only || config.db.migrate {
        info!("mc-api: running pending migrations");
        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            error!(error = %e, "failed to run migrations");
            return ExitCode::FAILURE;
        }
        info!("mc-api: migrations complete");
        if args.migrate_only {
            return ExitCode::SUCCESS;
        }
    }

    let kv = match RedisKvStore::connect(&config.redis.url).await {
        Ok(kv) => Arc::new(kv),
        Err(e) => {
            error!(error = %e, "failed to connect to redis");
            return ExitCode::FAILURE;
        }
    };

    let auther = match JwtAuther::new(
        "mc-manager",
        Duration::from_secs(config.auth.jwt_expiration),
        &config.auth.private_key,
        &config.auth.public_key,
        kv,
    ) {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, "invalid auth configuration");
            return ExitCode::FAILURE;
        }
    };

    let distributions = build_distribution_registry();

    let nodes = Arc::new(ApiNodeService::new(pool.clone(), config.runner.id));
    let mut dispatch = DispatchCache::new(nodes.clone(), Arc::new(UnimplementedConnector));

    if config.runner.enable {
        let java = Arc::new(TemurinJre::new(config.runner.docker.java_distro.clone()));
        let runtime = match DockerRuntimeAdapter::connect(
            config.runner.docker.prefix.clone(),
            config.runner.docker.network_name.clone(),
            config.runner.data.data_dir.clone(),
            java,
        )
        .await
        {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "failed to connect embedded runner to docker");
                return ExitCode::FAILURE;
            }
        };
        let manager = Arc::new(Manager::new(Arc::new(runtime)));
        let local_service = Arc::new(LocalRunnerService::new(manager));
        dispatch = dispatch.with_local_node(config.runner.id, local_service);
        info!(node_id = %config.runner.id, "mc-api: embedded local runner enabled");
    }

    let dispatch = Arc::new(dispatch);

    let _auth_service = ApiAuthService::new(pool.clone(), auther, config.auth.allow_signup);
    let _node_service = nodes;
    let _user_service = ApiUserService::new(pool.clone());
    let _instance_service = ApiInstanceService::new(pool, dispatch, distributions);

    info!(
        addr = %format!("{}:{}", config.server.ip, config.server.port),
        reflection = config.server.enable_reflection,
        "mc-api: ready"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        return ExitCode::FAILURE;
    }
    info!("mc-api: shutdown signal received");

    ExitCode::SUCCESS
}
