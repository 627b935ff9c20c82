//! Event create/update/list operations, scoped by owning application.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::PaginationConfig;
use crate::domain::error::{CatalogError, CatalogResult};
use crate::domain::hierarchy::HierarchyGuard;
use crate::domain::listing::{ListQuery, Listing};
use crate::metrics::CatalogMetrics;
use crate::storage::{ApplicationRepository, EventRepository};

use super::types::{CreateEventRequest, Event, UpdateEventRequest};

const ENTITY: &str = "event";

#[derive(Clone)]
pub struct EventService {
    applications: Arc<dyn ApplicationRepository>,
    events: Arc<dyn EventRepository>,
    guard: HierarchyGuard,
    pagination: PaginationConfig,
}

impl EventService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        events: Arc<dyn EventRepository>,
        guard: HierarchyGuard,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            applications,
            events,
            guard,
            pagination,
        }
    }

    pub async fn create(&self, req: CreateEventRequest) -> CatalogResult<Event> {
        self.require_application(req.application_id).await?;

        if self
            .events
            .find_by_name(req.application_id, &req.name)
            .await?
            .is_some()
        {
            CatalogMetrics::record_conflict(ENTITY);
            return Err(conflict(&req.name));
        }

        let event = Event::new(req.application_id, req.name, req.description);
        self.events
            .insert(&event)
            .await
            .map_err(|e| on_write_error(e.into(), &event.name))?;

        CatalogMetrics::record_created(ENTITY);
        tracing::info!(
            event_id = %event.id,
            application_id = %event.application_id,
            name = %event.name,
            "Event created"
        );
        Ok(event)
    }

    /// Apply a partial update. When `application_id` is supplied the event
    /// must belong to it.
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateEventRequest,
        application_id: Option<Uuid>,
    ) -> CatalogResult<Event> {
        let mut event = self.guard.ensure_event(id, application_id).await?;

        if let Some(name) = req.name {
            if name != event.name {
                if let Some(other) = self
                    .events
                    .find_by_name(event.application_id, &name)
                    .await?
                {
                    if other.id != id {
                        CatalogMetrics::record_conflict(ENTITY);
                        return Err(conflict(&name));
                    }
                }
            }
            event.name = name;
        }
        if let Some(description) = req.description {
            event.description = description;
        }
        if let Some(is_active) = req.is_active {
            event.is_active = is_active;
        }
        if let Some(is_deleted) = req.is_deleted {
            event.is_deleted = is_deleted;
        }
        event.updated_at = Utc::now();

        self.events
            .update(&event)
            .await
            .map_err(|e| on_write_error(e.into(), &event.name))?;

        CatalogMetrics::record_updated(ENTITY);
        tracing::info!(event_id = %id, "Event updated");
        Ok(event)
    }

    pub async fn list(
        &self,
        application_id: Uuid,
        query: &ListQuery,
    ) -> CatalogResult<Listing<Event>> {
        self.require_application(application_id).await?;

        let request = query.page_request(&self.pagination);
        let page = self
            .events
            .list(application_id, &query.filter(), query.sort(), request)
            .await?;
        Ok(Listing::from_page(page, request))
    }

    async fn require_application(&self, application_id: Uuid) -> CatalogResult<()> {
        match self.applications.get(application_id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::NotFound(format!(
                "application {}",
                application_id
            ))),
        }
    }
}

fn conflict(name: &str) -> CatalogError {
    CatalogError::Conflict(format!(
        "event with name '{}' already exists in this application",
        name
    ))
}

fn on_write_error(err: CatalogError, name: &str) -> CatalogError {
    match err {
        CatalogError::Conflict(_) => {
            CatalogMetrics::record_conflict(ENTITY);
            conflict(name)
        }
        other => other,
    }
}
