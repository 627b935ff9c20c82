//! Notification entity manager.
//!
//! Owns create and update of notifications: ancestry checks through the
//! hierarchy guard, name uniqueness within the owning event, tag derivation
//! from the template body and best-effort tag catalog reconciliation.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::PaginationConfig;
use crate::domain::error::{CatalogError, CatalogResult};
use crate::domain::hierarchy::HierarchyGuard;
use crate::domain::listing::{ListQuery, Listing};
use crate::domain::tags::TagRegistry;
use crate::domain::template::labels;
use crate::metrics::CatalogMetrics;
use crate::storage::NotificationRepository;

use super::types::{
    CreateNotificationRequest, Notification, NotificationScope, UpdateNotificationRequest,
};

const ENTITY: &str = "notification";

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    guard: HierarchyGuard,
    tags: TagRegistry,
    pagination: PaginationConfig,
}

impl NotificationService {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        guard: HierarchyGuard,
        tags: TagRegistry,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            notifications,
            guard,
            tags,
            pagination,
        }
    }

    #[tracing::instrument(name = "notification.create", skip(self, req), fields(event_id = %req.event_id))]
    pub async fn create(&self, req: CreateNotificationRequest) -> CatalogResult<Notification> {
        self.guard
            .ensure_event(req.event_id, req.application_id)
            .await?;

        if self
            .notifications
            .find_by_name(req.event_id, &req.name)
            .await?
            .is_some()
        {
            CatalogMetrics::record_conflict(ENTITY);
            return Err(conflict(&req.name));
        }

        let notification =
            Notification::new(req.event_id, req.name, req.description, req.templatebody);

        let stats = self.tags.reconcile(&labels(&notification.tags)).await;
        tracing::debug!(
            inserted = stats.inserted,
            existing = stats.existing,
            failed = stats.failed,
            "Tag catalog reconciled"
        );

        self.notifications
            .insert(&notification)
            .await
            .map_err(|e| on_write_error(e.into(), &notification.name))?;

        CatalogMetrics::record_created(ENTITY);
        tracing::info!(
            notification_id = %notification.id,
            name = %notification.name,
            tag_count = notification.tags.len(),
            "Notification created"
        );
        Ok(notification)
    }

    /// Apply a partial update.
    ///
    /// Ancestors named in `scope` must match the stored chain. A new
    /// template body replaces the whole tag list.
    #[tracing::instrument(name = "notification.update", skip(self, req))]
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateNotificationRequest,
        scope: NotificationScope,
    ) -> CatalogResult<Notification> {
        let mut notification = self
            .guard
            .ensure_notification(id, scope.event_id, scope.application_id)
            .await?;

        if let Some(name) = req.name {
            if name != notification.name {
                if let Some(other) = self
                    .notifications
                    .find_by_name(notification.event_id, &name)
                    .await?
                {
                    if other.id != id {
                        CatalogMetrics::record_conflict(ENTITY);
                        return Err(conflict(&name));
                    }
                }
            }
            notification.name = name;
        }
        if let Some(description) = req.description {
            notification.description = description;
        }
        if let Some(is_active) = req.is_active {
            notification.is_active = is_active;
        }
        if let Some(is_deleted) = req.is_deleted {
            notification.is_deleted = is_deleted;
        }
        if let Some(templatebody) = req.templatebody {
            notification.set_templatebody(templatebody);
            self.tags.reconcile(&labels(&notification.tags)).await;
        }
        notification.updated_at = Utc::now();

        self.notifications
            .update(&notification)
            .await
            .map_err(|e| on_write_error(e.into(), &notification.name))?;

        CatalogMetrics::record_updated(ENTITY);
        tracing::info!(notification_id = %id, "Notification updated");
        Ok(notification)
    }

    pub async fn get(&self, id: Uuid) -> CatalogResult<Notification> {
        self.notifications
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("notification {}", id)))
    }

    pub async fn list(
        &self,
        event_id: Uuid,
        query: &ListQuery,
    ) -> CatalogResult<Listing<Notification>> {
        self.guard.ensure_event(event_id, None).await?;

        let request = query.page_request(&self.pagination);
        let page = self
            .notifications
            .list(event_id, &query.filter(), query.sort(), request)
            .await?;
        Ok(Listing::from_page(page, request))
    }
}

fn conflict(name: &str) -> CatalogError {
    CatalogError::Conflict(format!(
        "notification with name '{}' already exists for this event",
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
