//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub storage: StorageHealthResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresHealthResponse>,
}

#[derive(Debug, Serialize)]
pub struct StorageHealthResponse {
    pub backend: String,
}

#[derive(Debug, Serialize)]
pub struct PostgresHealthResponse {
    pub status: String,
    pub connected: bool,
    pub pool_size: u32,
    pub idle_connections: u32,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let postgres = match &state.postgres_pool {
        Some(pool) => {
            let connected = match pool.ping().await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "PostgreSQL health check failed");
                    false
                }
            };
            Some(PostgresHealthResponse {
                status: if connected { "connected" } else { "disconnected" }.to_string(),
                connected,
                pool_size: pool.pool().size(),
                idle_connections: pool.pool().num_idle() as u32,
            })
        }
        None => None,
    };

    let healthy = postgres.as_ref().map_or(true, |p| p.connected);
    let status = if healthy { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        storage: StorageHealthResponse {
            backend: state.storage_backend.to_string(),
        },
        postgres,
    })
}
