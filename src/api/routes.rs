use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::middleware::api_key_auth;
use crate::server::AppState;

use super::applications::{
    create_application, get_application, list_applications, update_application,
};
use super::events::{create_event, list_events, update_event};
use super::health::health;
use super::metrics::prometheus_metrics;
use super::notifications::{
    create_notification, get_notification, list_messages, list_notifications, preview_message,
    update_notification,
};
use super::tags::list_tags;

pub fn api_routes(state: AppState) -> Router<AppState> {
    let v1 = Router::new()
        // Applications
        .route(
            "/applications",
            get(list_applications).post(create_application),
        )
        .route(
            "/applications/{id}",
            get(get_application).patch(update_application),
        )
        // Events
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", axum::routing::patch(update_event))
        // Notifications
        .route(
            "/notifications",
            get(list_notifications).post(create_notification),
        )
        .route(
            "/notifications/{id}",
            get(get_notification).patch(update_notification),
        )
        // Messages
        .route("/notifications/{id}/message", post(preview_message))
        .route("/notifications/{id}/messages", get(list_messages))
        // Tags
        .route("/tags", get(list_tags))
        .route_layer(middleware::from_fn_with_state(state, api_key_auth));

    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest("/api/v1", v1)
}
