//! Application endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::application::{
    Application, CreateApplicationRequest, UpdateApplicationRequest,
};
use crate::domain::listing::{ListQuery, PaginationInfo};
use crate::error::Result;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<Application>,
    pub pagination: PaginationInfo,
}

/// GET /api/v1/applications
#[tracing::instrument(name = "http.list_applications", skip(state))]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApplicationListResponse>> {
    let listing = state.applications.list(&query).await?;
    Ok(Json(ApplicationListResponse {
        applications: listing.items,
        pagination: listing.pagination,
    }))
}

/// POST /api/v1/applications
#[tracing::instrument(name = "http.create_application", skip(state, request), fields(name = %request.name))]
pub async fn create_application(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>)> {
    request.validate()?;
    let created = state.applications.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/applications/{id}
#[tracing::instrument(name = "http.get_application", skip(state))]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>> {
    Ok(Json(state.applications.get(id).await?))
}

/// PATCH /api/v1/applications/{id}
#[tracing::instrument(name = "http.update_application", skip(state, request))]
pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Result<Json<Application>> {
    request.validate()?;
    Ok(Json(state.applications.update(id, request).await?))
}
