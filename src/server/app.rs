use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::api::api_routes;

use super::middleware::{trace_id, track_metrics};
use super::AppState;

/// Request bodies larger than this are rejected before reaching a handler
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.server.cors_origins);

    Router::new()
        .merge(api_routes(state.clone()))
        // Runs after routing so the matched path is known
        .route_layer(middleware::from_fn(track_metrics))
        // Add middleware
        .layer(middleware::from_fn(trace_id))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        // Add state
        .with_state(state)
}

/// Allow any origin unless specific origins are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static("x-trace-id")]);

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        tracing::debug!(origins = ?origins, "CORS restricted to configured origins");
        layer.allow_origin(parsed)
    }
}
