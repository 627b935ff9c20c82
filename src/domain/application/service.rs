//! Application create/update/read operations.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::PaginationConfig;
use crate::domain::error::{CatalogError, CatalogResult};
use crate::domain::listing::{ListQuery, Listing};
use crate::metrics::CatalogMetrics;
use crate::storage::ApplicationRepository;

use super::types::{Application, CreateApplicationRequest, UpdateApplicationRequest};

const ENTITY: &str = "application";

#[derive(Clone)]
pub struct ApplicationService {
    repo: Arc<dyn ApplicationRepository>,
    pagination: PaginationConfig,
}

impl ApplicationService {
    pub fn new(repo: Arc<dyn ApplicationRepository>, pagination: PaginationConfig) -> Self {
        Self { repo, pagination }
    }

    pub async fn create(&self, req: CreateApplicationRequest) -> CatalogResult<Application> {
        if self.repo.find_by_name(&req.name).await?.is_some() {
            CatalogMetrics::record_conflict(ENTITY);
            return Err(conflict(&req.name));
        }

        let application = Application::new(req.name, req.description);
        self.repo
            .insert(&application)
            .await
            .map_err(|e| on_write_error(e.into(), &application.name))?;

        CatalogMetrics::record_created(ENTITY);
        tracing::info!(application_id = %application.id, name = %application.name, "Application created");
        Ok(application)
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateApplicationRequest,
    ) -> CatalogResult<Application> {
        let mut application = self.get(id).await?;

        if let Some(name) = req.name {
            if name != application.name {
                if let Some(other) = self.repo.find_by_name(&name).await? {
                    if other.id != id {
                        CatalogMetrics::record_conflict(ENTITY);
                        return Err(conflict(&name));
                    }
                }
            }
            application.name = name;
        }
        if let Some(description) = req.description {
            application.description = description;
        }
        if let Some(is_active) = req.is_active {
            application.is_active = is_active;
        }
        if let Some(is_deleted) = req.is_deleted {
            application.is_deleted = is_deleted;
        }
        application.updated_at = Utc::now();

        self.repo
            .update(&application)
            .await
            .map_err(|e| on_write_error(e.into(), &application.name))?;

        CatalogMetrics::record_updated(ENTITY);
        tracing::info!(application_id = %id, "Application updated");
        Ok(application)
    }

    pub async fn get(&self, id: Uuid) -> CatalogResult<Application> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("application {}", id)))
    }

    pub async fn list(&self, query: &ListQuery) -> CatalogResult<Listing<Application>> {
        let request = query.page_request(&self.pagination);
        let page = self
            .repo
            .list(&query.filter(), query.sort(), request)
            .await?;
        Ok(Listing::from_page(page, request))
    }
}

fn conflict(name: &str) -> CatalogError {
    CatalogError::Conflict(format!("application with name '{}' already exists", name))
}

/// A unique index losing the check-then-insert race still reports a conflict.
fn on_write_error(err: CatalogError, name: &str) -> CatalogError {
    match err {
        CatalogError::Conflict(_) => {
            CatalogMetrics::record_conflict(ENTITY);
            conflict(name)
        }
        other => other,
    }
}
