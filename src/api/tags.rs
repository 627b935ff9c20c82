//! Tag catalog endpoint.

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::AppState;

/// GET /api/v1/tags - All catalog labels, ascending
#[tracing::instrument(name = "http.list_tags", skip(state))]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.tags.list_labels().await?))
}
