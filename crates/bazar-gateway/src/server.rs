// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP/WebSocket server built on axum.
//!
//! Routes are split three ways: unauthenticated health, bearer-token REST
//! under /v1, and the /ws endpoint whose auth happens during the
//! handshake rather than via middleware.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use bazar_core::BazarError;
use bazar_realtime::{ConnectionRegistry, DeliveryWatcherIndex, StatusPipeline};
use bazar_recommend::RecommendationEngine;
use bazar_storage::Database;
use tower_http::cors::CorsLayer;

use crate::auth::{auth_middleware, AuthState};
use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub db: Database,
    pub registry: ConnectionRegistry,
    pub watchers: DeliveryWatcherIndex,
    pub pipeline: StatusPipeline,
    pub engine: RecommendationEngine,
    pub auth: AuthState,
}

/// Gateway server configuration (mirrors GatewayConfig from bazar-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the gateway router. Separate from `start_server` so tests can
/// drive it without binding a socket.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new().route("/health", get(handlers::get_health));

    let api_routes = Router::new()
        .route("/v1/orders/{id}/status", post(handlers::post_order_status))
        .route(
            "/v1/deliveries/{id}/location",
            post(handlers::post_delivery_location),
        )
        .route(
            "/v1/notifications/{user_id}",
            get(handlers::get_notifications),
        )
        // The same segment name everywhere: the router requires matching
        // parameter names for overlapping paths.
        .route(
            "/v1/recommendations/{id}",
            get(handlers::get_recommendations),
        )
        .route(
            "/v1/recommendations/{id}/generate",
            post(handlers::post_generate_recommendations),
        )
        .route(
            "/v1/recommendations/{id}/viewed",
            post(handlers::post_recommendation_viewed),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state.clone());

    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .layer(CorsLayer::permissive())
}

/// Bind and serve the gateway until the process shuts down.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), BazarError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BazarError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| BazarError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
