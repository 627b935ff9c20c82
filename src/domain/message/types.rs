//! Message types

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{CatalogError, CatalogResult};

/// A rendered, recipient-specific instance of a notification template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,

    pub email: String,

    /// Header lines followed by the substituted template
    pub body: String,

    #[serde(rename = "notificationId")]
    pub notification_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(notification_id: Uuid, email: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            body,
            notification_id,
            created_at: Utc::now(),
        }
    }
}

/// One addressee and its label → value substitutions.
#[derive(Debug, Clone, Deserialize)]
pub struct Recipient {
    pub email: String,

    /// Applied in the order given
    #[serde(default)]
    pub tags: IndexMap<String, String>,
}

/// Request to render a notification for a list of recipients
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewRequest {
    #[serde(rename = "applicationName")]
    pub application_name: String,

    #[serde(rename = "eventName")]
    pub event_name: String,

    /// When present, the notification must belong to this event
    #[serde(rename = "eventId", default)]
    pub event_id: Option<Uuid>,

    pub to: Vec<Recipient>,
}

impl PreviewRequest {
    pub fn validate(&self) -> CatalogResult<()> {
        if self.application_name.is_empty() {
            return Err(CatalogError::Validation(
                "applicationName is required".to_string(),
            ));
        }
        if self.event_name.is_empty() {
            return Err(CatalogError::Validation("eventName is required".to_string()));
        }
        for recipient in &self.to {
            if !is_plausible_email(&recipient.email) {
                return Err(CatalogError::Validation(format!(
                    "invalid recipient email: {}",
                    recipient.email
                )));
            }
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

/// A recipient whose message could not be persisted
#[derive(Debug, Clone, Serialize)]
pub struct RecipientFailure {
    pub email: String,
    pub error: String,
}

/// Outcome of a render call
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreviewOutcome {
    #[serde(rename = "savedCount")]
    pub saved_count: usize,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RecipientFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_tags_keep_order() {
        let recipient: Recipient = serde_json::from_str(
            r#"{"email": "a@example.com", "tags": {"z": "1", "a": "2", "m": "3"}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = recipient.tags.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_recipient_tags_default_empty() {
        let recipient: Recipient = serde_json::from_str(r#"{"email": "a@example.com"}"#).unwrap();
        assert!(recipient.tags.is_empty());
    }

    #[test]
    fn test_preview_validation() {
        let req: PreviewRequest = serde_json::from_str(
            r#"{"applicationName": "App", "eventName": "Signup", "to": [{"email": "nope"}]}"#,
        )
        .unwrap();
        assert!(matches!(req.validate(), Err(CatalogError::Validation(_))));

        let req: PreviewRequest = serde_json::from_str(
            r#"{"applicationName": "App", "eventName": "Signup", "to": []}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_outcome_omits_empty_failures() {
        let outcome = PreviewOutcome {
            saved_count: 2,
            failures: vec![],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"savedCount": 2}));
    }
}
