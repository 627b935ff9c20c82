//! Notification and message endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::listing::{ListQuery, PaginationInfo};
use crate::domain::message::{Message, PreviewOutcome, PreviewRequest};
use crate::domain::notification::{
    CreateNotificationRequest, Notification, NotificationScope, UpdateNotificationRequest,
};
use crate::error::Result;
use crate::server::AppState;

/// `?eventId=` on listings (required)
#[derive(Debug, Deserialize)]
pub struct NotificationListParams {
    #[serde(rename = "eventId")]
    pub event_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub total: usize,
}

/// GET /api/v1/notifications?eventId=
#[tracing::instrument(name = "http.list_notifications", skip(state))]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<NotificationListParams>,
    Query(query): Query<ListQuery>,
) -> Result<Json<NotificationListResponse>> {
    let listing = state.notifications.list(params.event_id, &query).await?;
    Ok(Json(NotificationListResponse {
        notifications: listing.items,
        pagination: listing.pagination,
    }))
}

/// POST /api/v1/notifications
#[tracing::instrument(
    name = "http.create_notification",
    skip(state, request),
    fields(event_id = %request.event_id)
)]
pub async fn create_notification(
    State(state): State<AppState>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>)> {
    request.validate()?;
    let created = state.notifications.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/notifications/{id}
#[tracing::instrument(name = "http.get_notification", skip(state))]
pub async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>> {
    Ok(Json(state.notifications.get(id).await?))
}

/// PATCH /api/v1/notifications/{id}?eventId=&applicationId=
#[tracing::instrument(name = "http.update_notification", skip(state, request))]
pub async fn update_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(scope): Query<NotificationScope>,
    Json(request): Json<UpdateNotificationRequest>,
) -> Result<Json<Notification>> {
    request.validate()?;
    Ok(Json(state.notifications.update(id, request, scope).await?))
}

/// POST /api/v1/notifications/{id}/message - Render and store per-recipient messages
#[tracing::instrument(name = "http.preview_message", skip(state, request))]
pub async fn preview_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewOutcome>> {
    request.validate()?;
    Ok(Json(state.messages.preview(id, request).await?))
}

/// GET /api/v1/notifications/{id}/messages
#[tracing::instrument(name = "http.list_messages", skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageListResponse>> {
    let messages = state.messages.list(id).await?;
    Ok(Json(MessageListResponse {
        total: messages.len(),
        messages,
    }))
}
