//! Notification types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{check_length, CatalogError, CatalogResult};
use crate::domain::template::{extract_tags, TagRef};

/// A parameterized message template owned by one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,

    /// Unique within the owning event
    pub name: String,

    pub description: String,

    #[serde(rename = "eventId")]
    pub event_id: Uuid,

    /// Template text with `{{label}}` placeholders
    pub templatebody: String,

    /// Placeholders found in `templatebody`, one entry per occurrence
    pub tags: Vec<TagRef>,

    pub is_active: bool,

    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Build a notification, deriving `tags` from the template body.
    pub fn new(event_id: Uuid, name: String, description: String, templatebody: String) -> Self {
        let now = Utc::now();
        let tags = extract_tags(&templatebody);
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            event_id,
            templatebody,
            tags,
            is_active: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the template body and re-derive the whole tag list from it.
    pub fn set_templatebody(&mut self, templatebody: String) {
        self.tags = extract_tags(&templatebody);
        self.templatebody = templatebody;
    }
}

/// Request to create a new notification
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationRequest {
    #[serde(rename = "eventId")]
    pub event_id: Uuid,

    /// When present, the event must belong to this application
    #[serde(rename = "applicationId", default)]
    pub application_id: Option<Uuid>,

    pub name: String,
    pub description: String,
    pub templatebody: String,
}

impl CreateNotificationRequest {
    pub fn validate(&self) -> CatalogResult<()> {
        check_length("name", &self.name, 3, None)?;
        check_length("description", &self.description, 5, None)?;
        check_length("templatebody", &self.templatebody, 10, Some(250))
    }
}

/// Request to update an existing notification
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNotificationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub templatebody: Option<String>,
    pub is_active: Option<bool>,
    pub is_deleted: Option<bool>,
}

impl UpdateNotificationRequest {
    pub fn validate(&self) -> CatalogResult<()> {
        if self.name.is_none()
            && self.description.is_none()
            && self.templatebody.is_none()
            && self.is_active.is_none()
            && self.is_deleted.is_none()
        {
            return Err(CatalogError::Validation(
                "at least one of name, description, templatebody, is_active, is_deleted is required"
                    .to_string(),
            ));
        }
        if let Some(name) = &self.name {
            check_length("name", name, 3, None)?;
        }
        if let Some(description) = &self.description {
            check_length("description", description, 5, None)?;
        }
        if let Some(templatebody) = &self.templatebody {
            check_length("templatebody", templatebody, 10, Some(250))?;
        }
        Ok(())
    }
}

/// Optional ancestor ids accepted on update, checked before writing
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NotificationScope {
    #[serde(rename = "eventId")]
    pub event_id: Option<Uuid>,
    #[serde(rename = "applicationId")]
    pub application_id: Option<Uuid>,
}
