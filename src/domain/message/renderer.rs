//! Per-recipient message rendering.
//!
//! A render call loads the notification once, substitutes each recipient's
//! values into the template and stores one message per recipient. Recipients
//! are independent: a failed write for one is reported in the outcome and
//! never stops the others.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use crate::domain::error::CatalogResult;
use crate::domain::hierarchy::HierarchyGuard;
use crate::domain::notification::Notification;
use crate::domain::template::{compose_message_body, substitute_tags};
use crate::metrics::MessageMetrics;
use crate::storage::MessageRepository;

use super::types::{Message, PreviewOutcome, PreviewRequest, Recipient, RecipientFailure};

#[derive(Clone)]
pub struct MessageRenderer {
    messages: Arc<dyn MessageRepository>,
    guard: HierarchyGuard,
}

impl MessageRenderer {
    pub fn new(messages: Arc<dyn MessageRepository>, guard: HierarchyGuard) -> Self {
        Self { messages, guard }
    }

    /// Render and store one message per recipient.
    ///
    /// Fails only when the notification cannot be resolved; per-recipient
    /// storage errors are collected into the outcome.
    #[tracing::instrument(
        name = "message.preview",
        skip(self, req),
        fields(recipients = req.to.len())
    )]
    pub async fn preview(
        &self,
        notification_id: Uuid,
        req: PreviewRequest,
    ) -> CatalogResult<PreviewOutcome> {
        let notification = self
            .guard
            .ensure_notification(notification_id, req.event_id, None)
            .await?;

        let messages = render_all(&notification, &req);
        MessageMetrics::record_rendered(messages.len() as u64);

        let results = join_all(messages.iter().map(|m| self.messages.insert(m))).await;

        let mut outcome = PreviewOutcome::default();
        for (message, result) in messages.iter().zip(results) {
            match result {
                Ok(()) => outcome.saved_count += 1,
                Err(e) => {
                    tracing::warn!(
                        notification_id = %notification_id,
                        email = %message.email,
                        error = %e,
                        "Failed to store rendered message"
                    );
                    outcome.failures.push(RecipientFailure {
                        email: message.email.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if !outcome.failures.is_empty() {
            MessageMetrics::record_failed(outcome.failures.len() as u64);
        }
        tracing::info!(
            notification_id = %notification_id,
            saved = outcome.saved_count,
            failed = outcome.failures.len(),
            "Messages rendered"
        );

        Ok(outcome)
    }

    /// Messages stored for a notification, oldest first.
    pub async fn list(&self, notification_id: Uuid) -> CatalogResult<Vec<Message>> {
        self.guard
            .ensure_notification(notification_id, None, None)
            .await?;
        Ok(self.messages.list_by_notification(notification_id).await?)
    }
}

/// Build the message for every recipient against one snapshot of the template.
fn render_all(notification: &Notification, req: &PreviewRequest) -> Vec<Message> {
    let known: HashSet<&str> = notification.tags.iter().map(|t| t.label.as_str()).collect();

    req.to
        .iter()
        .map(|recipient| render_one(notification, &known, req, recipient))
        .collect()
}

fn render_one(
    notification: &Notification,
    known: &HashSet<&str>,
    req: &PreviewRequest,
    recipient: &Recipient,
) -> Message {
    let rendered = substitute_tags(&notification.templatebody, known, &recipient.tags);
    let body = compose_message_body(
        &req.application_name,
        &req.event_name,
        &notification.name,
        &rendered,
    );
    Message::new(notification.id, recipient.email.clone(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::CatalogError;
    use crate::domain::event::Event;
    use crate::storage::{
        EventRepository, MemoryStore, NotificationRepository, StoreError, StoreResult,
    };
    use async_trait::async_trait;

    async fn seed(store: &Arc<MemoryStore>, body: &str) -> Notification {
        let event = Event::new(Uuid::new_v4(), "Signup".into(), "User signed up".into());
        EventRepository::insert(store.as_ref(), &event).await.unwrap();
        let notification =
            Notification::new(event.id, "Welcome".into(), "Welcome mail".into(), body.into());
        NotificationRepository::insert(store.as_ref(), &notification)
            .await
            .unwrap();
        notification
    }

    fn renderer(store: &Arc<MemoryStore>) -> MessageRenderer {
        MessageRenderer::new(store.clone(), HierarchyGuard::new(store.clone(), store.clone()))
    }

    fn request(to: serde_json::Value) -> PreviewRequest {
        serde_json::from_value(serde_json::json!({
            "applicationName": "Shop",
            "eventName": "Signup",
            "to": to,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_tag_left_literal() {
        let store = Arc::new(MemoryStore::new());
        let n = seed(&store, "Hi {{name}}").await;
        let r = renderer(&store);

        let outcome = r
            .preview(n.id, request(serde_json::json!([{"email": "a@x.io", "tags": {}}])))
            .await
            .unwrap();
        assert_eq!(outcome.saved_count, 1);

        let messages = r.list(n.id).await.unwrap();
        assert_eq!(messages[0].body, "Shop\nSignup\nWelcome\nHi {{name}}");
    }

    #[tokio::test]
    async fn test_unknown_recipient_tag_ignored() {
        let store = Arc::new(MemoryStore::new());
        let n = seed(&store, "Hi {{name}}").await;
        let r = renderer(&store);

        r.preview(
            n.id,
            request(serde_json::json!([{"email": "a@x.io", "tags": {"foo": "bar", "name": "Ann"}}])),
        )
        .await
        .unwrap();
        assert_eq!(
            r.list(n.id).await.unwrap()[0].body,
            "Shop\nSignup\nWelcome\nHi Ann"
        );
    }

    #[tokio::test]
    async fn test_header_precedes_template() {
        let store = Arc::new(MemoryStore::new());
        let n = seed(&store, "{{appName}} fired {{eventName}}").await;
        let r = renderer(&store);

        r.preview(
            n.id,
            request(serde_json::json!([
                {"email": "a@x.io", "tags": {"appName": "Billing", "eventName": "Paid"}}
            ])),
        )
        .await
        .unwrap();
        let body = &r.list(n.id).await.unwrap()[0].body;
        assert!(body.starts_with("Shop\nSignup\nWelcome\n"));
        assert!(body.ends_with("Billing fired Paid"));
    }

    #[tokio::test]
    async fn test_recipients_isolated() {
        let store = Arc::new(MemoryStore::new());
        let n = seed(&store, "Hello {{name}}").await;
        let r = renderer(&store);

        let outcome = r
            .preview(
                n.id,
                request(serde_json::json!([
                    {"email": "a@x.io", "tags": {"name": "Ann"}},
                    {"email": "b@x.io", "tags": {"name": "Bob"}}
                ])),
            )
            .await
            .unwrap();
        assert_eq!(outcome.saved_count, 2);

        let mut bodies: Vec<(String, String)> = r
            .list(n.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| (m.email, m.body))
            .collect();
        bodies.sort();
        assert_eq!(bodies[0].1, "Shop\nSignup\nWelcome\nHello Ann");
        assert_eq!(bodies[1].1, "Shop\nSignup\nWelcome\nHello Bob");
    }

    #[tokio::test]
    async fn test_unknown_notification() {
        let store = Arc::new(MemoryStore::new());
        let err = renderer(&store)
            .preview(Uuid::new_v4(), request(serde_json::json!([])))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_event_mismatch_rejected() {
        let store = Arc::new(MemoryStore::new());
        let n = seed(&store, "Hello {{name}}").await;
        let mut req = request(serde_json::json!([{"email": "a@x.io"}]));
        req.event_id = Some(Uuid::new_v4());

        let err = renderer(&store).preview(n.id, req).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidReference(_)));
    }

    /// Rejects messages for one address, stores nothing else.
    struct PickyMessages;

    #[async_trait]
    impl MessageRepository for PickyMessages {
        async fn insert(&self, message: &Message) -> StoreResult<()> {
            if message.email.starts_with("bad") {
                Err(StoreError::Unavailable("disk full".into()))
            } else {
                Ok(())
            }
        }

        async fn list_by_notification(&self, _id: Uuid) -> StoreResult<Vec<Message>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_partial_failure_reported() {
        let store = Arc::new(MemoryStore::new());
        let n = seed(&store, "Hello {{name}}").await;
        let r = MessageRenderer::new(
            Arc::new(PickyMessages),
            HierarchyGuard::new(store.clone(), store.clone()),
        );

        let outcome = r
            .preview(
                n.id,
                request(serde_json::json!([
                    {"email": "bad@x.io"},
                    {"email": "good@x.io"}
                ])),
            )
            .await
            .unwrap();
        assert_eq!(outcome.saved_count, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].email, "bad@x.io");
    }
}
