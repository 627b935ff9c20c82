//! Event endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::event::{CreateEventRequest, Event, UpdateEventRequest};
use crate::domain::listing::{ListQuery, PaginationInfo};
use crate::error::Result;
use crate::server::AppState;

/// `?applicationId=` on listings (required)
#[derive(Debug, Deserialize)]
pub struct EventListParams {
    #[serde(rename = "applicationId")]
    pub application_id: Uuid,
}

/// `?applicationId=` on updates (optional ownership check)
#[derive(Debug, Default, Deserialize)]
pub struct EventScope {
    #[serde(rename = "applicationId")]
    pub application_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<Event>,
    pub pagination: PaginationInfo,
}

/// GET /api/v1/events?applicationId=
#[tracing::instrument(name = "http.list_events", skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
    Query(query): Query<ListQuery>,
) -> Result<Json<EventListResponse>> {
    let listing = state.events.list(params.application_id, &query).await?;
    Ok(Json(EventListResponse {
        events: listing.items,
        pagination: listing.pagination,
    }))
}

/// POST /api/v1/events
#[tracing::instrument(
    name = "http.create_event",
    skip(state, request),
    fields(application_id = %request.application_id)
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    request.validate()?;
    let created = state.events.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/v1/events/{id}
#[tracing::instrument(name = "http.update_event", skip(state, request))]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(scope): Query<EventScope>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    request.validate()?;
    let updated = state
        .events
        .update(id, request, scope.application_id)
        .await?;
    Ok(Json(updated))
}
