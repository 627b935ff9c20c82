//! Ancestry checks for the Application → Event → Notification chain.
//!
//! Every entry point that accepts an ancestor id from the caller runs the
//! relevant check before touching storage for writing. A missing child
//! surfaces as `NotFound`; a child that exists under a different parent
//! surfaces as `InvalidReference`.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::error::{CatalogError, CatalogResult};
use crate::domain::event::Event;
use crate::domain::notification::Notification;
use crate::storage::{EventRepository, NotificationRepository};

#[derive(Clone)]
pub struct HierarchyGuard {
    events: Arc<dyn EventRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl HierarchyGuard {
    pub fn new(
        events: Arc<dyn EventRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            events,
            notifications,
        }
    }

    /// `true` when the event exists and is owned by `application_id`.
    pub async fn event_belongs_to_application(
        &self,
        event_id: Uuid,
        application_id: Uuid,
    ) -> CatalogResult<bool> {
        Ok(self
            .events
            .get(event_id)
            .await?
            .is_some_and(|e| e.application_id == application_id))
    }

    /// `true` when the notification exists and is owned by `event_id`.
    pub async fn notification_belongs_to_event(
        &self,
        notification_id: Uuid,
        event_id: Uuid,
    ) -> CatalogResult<bool> {
        Ok(self
            .notifications
            .get(notification_id)
            .await?
            .is_some_and(|n| n.event_id == event_id))
    }

    /// Load an event, failing unless it is owned by `application_id` (when given).
    pub async fn ensure_event(
        &self,
        event_id: Uuid,
        application_id: Option<Uuid>,
    ) -> CatalogResult<Event> {
        let event = self
            .events
            .get(event_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("event {}", event_id)))?;

        check_parent("event", event_id, "application", event.application_id, application_id)?;
        Ok(event)
    }

    /// Load a notification, failing unless the chain up to the given
    /// ancestors matches.
    ///
    /// With only `application_id` supplied, the owning event is loaded to
    /// compare against it.
    pub async fn ensure_notification(
        &self,
        notification_id: Uuid,
        event_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> CatalogResult<Notification> {
        let notification = self
            .notifications
            .get(notification_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("notification {}", notification_id)))?;

        check_parent(
            "notification",
            notification_id,
            "event",
            notification.event_id,
            event_id,
        )?;

        if application_id.is_some() {
            self.ensure_event(notification.event_id, application_id)
                .await?;
        }

        Ok(notification)
    }
}

fn check_parent(
    child: &str,
    child_id: Uuid,
    parent: &str,
    actual: Uuid,
    expected: Option<Uuid>,
) -> CatalogResult<()> {
    match expected {
        Some(expected) if expected != actual => {
            tracing::debug!(
                child = child,
                child_id = %child_id,
                expected = %expected,
                actual = %actual,
                "Ancestry check failed"
            );
            Err(CatalogError::InvalidReference(format!(
                "{} {} does not belong to {} {}",
                child, child_id, parent, expected
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    async fn seeded() -> (HierarchyGuard, Event, Notification) {
        let store = Arc::new(MemoryStore::new());
        let event = Event::new(Uuid::new_v4(), "Signup".into(), "User signed up".into());
        EventRepository::insert(store.as_ref(), &event).await.unwrap();
        let notification = Notification::new(
            event.id,
            "Welcome".into(),
            "Welcome mail".into(),
            "Hello {{name}}".into(),
        );
        NotificationRepository::insert(store.as_ref(), &notification)
            .await
            .unwrap();
        (
            HierarchyGuard::new(store.clone(), store),
            event,
            notification,
        )
    }

    #[tokio::test]
    async fn test_belongs_predicates() {
        let (guard, event, notification) = seeded().await;

        assert!(guard
            .event_belongs_to_application(event.id, event.application_id)
            .await
            .unwrap());
        assert!(!guard
            .event_belongs_to_application(event.id, Uuid::new_v4())
            .await
            .unwrap());
        assert!(!guard
            .event_belongs_to_application(Uuid::new_v4(), event.application_id)
            .await
            .unwrap());

        assert!(guard
            .notification_belongs_to_event(notification.id, event.id)
            .await
            .unwrap());
        assert!(!guard
            .notification_belongs_to_event(notification.id, Uuid::new_v4())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_ensure_distinguishes_missing_from_mismatch() {
        let (guard, event, notification) = seeded().await;

        let err = guard.ensure_event(Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));

        let err = guard
            .ensure_event(event.id, Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidReference(_)));

        let err = guard
            .ensure_notification(notification.id, None, Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_ensure_full_chain() {
        let (guard, event, notification) = seeded().await;
        let loaded = guard
            .ensure_notification(notification.id, Some(event.id), Some(event.application_id))
            .await
            .unwrap();
        assert_eq!(loaded.id, notification.id);
    }
}
