// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bazar serve` command implementation.
//!
//! Opens the database, wires the registry, watcher index, pipelines, and
//! recommendation engine into the gateway, and runs until SIGINT. The
//! scheduled recommendation batch runs on its own interval task and is
//! cancelled on shutdown.

use bazar_config::BazarConfig;
use bazar_core::BazarError;
use bazar_gateway::{AuthState, GatewayState, ServerConfig, TokenVerifier};
use bazar_realtime::{Broadcaster, ConnectionRegistry, DeliveryWatcherIndex, StatusPipeline};
use bazar_recommend::RecommendationEngine;
use bazar_storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the `bazar serve` command.
pub async fn run_serve(config: BazarConfig) -> Result<(), BazarError> {
    init_tracing(&config.service.log_level);

    info!("starting bazar serve");

    let db = Database::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "database ready");

    let verifier = match config.auth.token_key.as_deref() {
        Some(key) => Some(TokenVerifier::from_base64_key(
            key,
            Some(&config.service.name),
        )?),
        None => {
            warn!("no auth.token_key configured, gateway will reject all connections");
            None
        }
    };

    let registry = ConnectionRegistry::new();
    let watchers = DeliveryWatcherIndex::new();
    let broadcaster = Broadcaster::new(registry.clone(), watchers.clone());
    let pipeline = StatusPipeline::new(db.clone(), broadcaster);
    let engine = RecommendationEngine::new(db.clone());

    let cancel = CancellationToken::new();
    if config.recommend.scheduled {
        spawn_scheduled_recommendations(
            engine.clone(),
            config.recommend.interval_minutes,
            config.recommend.scheduled_limit,
            cancel.clone(),
        );
    } else {
        info!("scheduled recommendations disabled");
    }

    let state = GatewayState {
        db: db.clone(),
        registry,
        watchers,
        pipeline,
        engine,
        auth: AuthState { verifier },
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let result = tokio::select! {
        result = bazar_gateway::start_server(&server_config, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    };

    cancel.cancel();
    db.close().await?;
    info!("bazar serve shutdown complete");
    result
}

/// Spawn the periodic batch that regenerates recommendations for every
/// active user. Per-user failures are absorbed inside the engine.
fn spawn_scheduled_recommendations(
    engine: RecommendationEngine,
    interval_minutes: u64,
    limit: usize,
    cancel: CancellationToken,
) {
    info!(interval_minutes, limit, "scheduled recommendations enabled");
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(interval_minutes * 60));
        // Skip the first immediate tick.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match engine.generate_for_all_users(limit).await {
                        Ok(users) => debug!(users, "scheduled recommendation batch complete"),
                        Err(e) => warn!(error = %e, "scheduled recommendation batch failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("scheduled recommendation task shutting down");
                    break;
                }
            }
        }
    });
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bazar={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
