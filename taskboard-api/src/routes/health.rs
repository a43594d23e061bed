/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": {"active_connections": 1, "idle_connections": 2},
///   "realtime": {"topics": 4, "relay": "connected"}
/// }
/// ```
///
/// `relay` is `"disabled"` when no Redis URL is configured. Any dependency
/// that does not answer turns the status into `"degraded"`; the response is
/// still 200.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::db::pool::{get_pool_stats, health_check as db_health_check, PoolStats};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub pool: PoolStats,
    pub realtime: RealtimeHealth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RealtimeHealth {
    pub topics: usize,
    pub relay: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_ok = db_health_check(&state.db).await.is_ok();

    let relay = match state.fanout.relay() {
        None => "disabled",
        Some(relay) => match relay.client().ping().await {
            Ok(true) => "connected",
            _ => "disconnected",
        },
    };

    let healthy = database_ok && relay != "disconnected";

    Ok(Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_ok { "connected" } else { "disconnected" }.to_string(),
        pool: get_pool_stats(&state.db),
        realtime: RealtimeHealth {
            topics: state.fanout.hub().topic_count().await,
            relay: relay.to_string(),
        },
    }))
}
