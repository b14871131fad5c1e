// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST handlers: status updates, notifications, recommendations, health.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use bazar_core::BazarError;
use bazar_realtime::UpdateOutcome;
use bazar_storage::queries::notifications;

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("{what} not found"),
        }),
    )
        .into_response()
}

fn internal_error(e: BazarError) -> Response {
    tracing::error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Request body for POST /v1/orders/{id}/status.
#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: String,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// POST /v1/orders/{id}/status
///
/// Runs the full order-status pipeline: persist, notify, log, broadcast.
pub async fn post_order_status(
    State(state): State<GatewayState>,
    Path(order_id): Path<String>,
    Json(body): Json<OrderStatusRequest>,
) -> Response {
    match state
        .pipeline
        .update_order_status(&order_id, &body.status, body.updated_by.as_deref())
        .await
    {
        Ok(UpdateOutcome::Updated(order)) => (StatusCode::OK, Json(order)).into_response(),
        Ok(UpdateOutcome::NotFound) => not_found("order"),
        Err(e) => internal_error(e),
    }
}

/// Request body for POST /v1/deliveries/{id}/location.
#[derive(Debug, Deserialize)]
pub struct DeliveryLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub rider_id: String,
}

/// POST /v1/deliveries/{id}/location
pub async fn post_delivery_location(
    State(state): State<GatewayState>,
    Path(delivery_id): Path<String>,
    Json(body): Json<DeliveryLocationRequest>,
) -> Response {
    match state
        .pipeline
        .update_delivery_location(&delivery_id, body.latitude, body.longitude, &body.rider_id)
        .await
    {
        Ok(UpdateOutcome::Updated(delivery)) => (StatusCode::OK, Json(delivery)).into_response(),
        Ok(UpdateOutcome::NotFound) => not_found("delivery"),
        Err(e) => internal_error(e),
    }
}

/// Pagination query for list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

const NOTIFICATIONS_DEFAULT_LIMIT: usize = 50;
const RECOMMENDATIONS_DEFAULT_LIMIT: usize = 10;

/// GET /v1/notifications/{user_id}
pub async fn get_notifications(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(NOTIFICATIONS_DEFAULT_LIMIT);
    match notifications::for_user(&state.db, &user_id, limit).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /v1/recommendations/{user_id}
pub async fn get_recommendations(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(RECOMMENDATIONS_DEFAULT_LIMIT);
    match state.engine.recommendations_for_user(&user_id, limit).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Request body for POST /v1/recommendations/{user_id}/generate.
#[derive(Debug, Deserialize, Default)]
pub struct GenerateRequest {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// POST /v1/recommendations/{user_id}/generate
///
/// Regenerates on demand. Generation failures are absorbed by the engine
/// and show up as an empty list, never a 500.
pub async fn post_generate_recommendations(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
    body: Option<Json<GenerateRequest>>,
) -> Response {
    let Json(body) = body.unwrap_or_default();
    let limit = body.limit.unwrap_or(RECOMMENDATIONS_DEFAULT_LIMIT);
    let recs = state.engine.generate(&user_id, limit, &body.exclude).await;
    (StatusCode::OK, Json(recs)).into_response()
}

/// POST /v1/recommendations/{id}/viewed
pub async fn post_recommendation_viewed(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Response {
    match state.engine.mark_viewed(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found("recommendation"),
        Err(e) => internal_error(e),
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health (unauthenticated, for load balancers and systemd).
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_request_deserializes() {
        let req: OrderStatusRequest =
            serde_json::from_str(r#"{"status":"shipped"}"#).unwrap();
        assert_eq!(req.status, "shipped");
        assert!(req.updated_by.is_none());

        let req: OrderStatusRequest =
            serde_json::from_str(r#"{"status":"shipped","updated_by":"seller-1"}"#).unwrap();
        assert_eq!(req.updated_by.as_deref(), Some("seller-1"));
    }

    #[test]
    fn delivery_location_request_requires_coordinates() {
        let req: DeliveryLocationRequest = serde_json::from_str(
            r#"{"latitude":6.5,"longitude":3.3,"rider_id":"riderA"}"#,
        )
        .unwrap();
        assert_eq!(req.latitude, 6.5);
        assert_eq!(req.rider_id, "riderA");

        assert!(serde_json::from_str::<DeliveryLocationRequest>(r#"{"latitude":6.5}"#).is_err());
    }

    #[test]
    fn generate_request_defaults_are_empty() {
        let req: GenerateRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.limit.is_none());
        assert!(req.exclude.is_empty());

        let req: GenerateRequest =
            serde_json::from_str(r#"{"limit":5,"exclude":["i-1"]}"#).unwrap();
        assert_eq!(req.limit, Some(5));
        assert_eq!(req.exclude, vec!["i-1".to_string()]);
    }

    #[test]
    fn health_response_serializes() {
        let json = serde_json::to_string(&HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        })
        .unwrap();
        assert!(json.contains("\"status\":\"ok\""));
    }
}
