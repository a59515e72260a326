// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use psychdoodle_node::{
    api::{start_metrics_server, start_server, AppState},
    config::{ServerConfig, DEFAULT_CONFIG_PATH},
    vision::AnalysisModelManager,
};
use std::{path::PathBuf, time::Duration};
use tokio::{signal, sync::watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// PsychDoodle analysis node
#[derive(Parser, Debug)]
#[command(name = "psychdoodle-node")]
#[command(version = psychdoodle_node::version::VERSION_NUMBER)]
struct Args {
    /// Configuration file (TOML); defaults are used when it does not exist
    #[arg(long, short, env = "PSYCHDOODLE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Configuration first: it carries the default log level
    let config = ServerConfig::load(&args.config);
    let log_level = config
        .as_ref()
        .map(|c| c.server.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config.context("Failed to load configuration")?;

    info!("Starting {}", psychdoodle_node::version::get_version_string());
    info!("BUILD VERSION: {}", psychdoodle_node::version::VERSION);
    info!("Build Date: {}", psychdoodle_node::version::BUILD_DATE);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers)
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: ServerConfig) -> Result<()> {
    info!("Loading analysis models...");
    let models = AnalysisModelManager::new(&config.models.to_model_config());
    for model in models.list_models() {
        if model.available {
            info!("  {} ({}): loaded", model.name, model.model_type);
        } else {
            warn!("  {} ({}): not available, using fallback", model.name, model.model_type);
        }
    }

    let state = AppState::new(&config, models)?;

    let health_task = config.monitoring.enabled.then(|| {
        state.health.clone().spawn_periodic(Duration::from_secs(
            config.monitoring.health_check_interval,
        ))
    });

    let sweeper_task = state
        .rate_limiter
        .clone()
        .map(|limiter| {
            let interval = limiter.window();
            limiter.spawn_sweeper(interval)
        });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let metrics_task = if state.metrics.is_some() && config.monitoring.prometheus_port != 0 {
        let host = config.server.host.clone();
        let port = config.monitoring.prometheus_port;
        let metrics_state = state.clone();
        let shutdown = wait_for_shutdown(shutdown_rx.clone());
        Some(tokio::spawn(async move {
            if let Err(e) = start_metrics_server(&host, port, metrics_state, shutdown).await {
                error!("Metrics listener failed: {:#}", e);
            }
        }))
    } else {
        None
    };

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        let _ = shutdown_tx.send(true);
    });

    let result = start_server(&config, state, wait_for_shutdown(shutdown_rx)).await;

    for task in [health_task, sweeper_task].into_iter().flatten() {
        task.abort();
    }
    if let Some(task) = metrics_task {
        let _ = task.await;
    }

    info!("PsychDoodle node stopped");
    result
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            break;
        }
    }
}
