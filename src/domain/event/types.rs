//! Event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{check_length, CatalogError, CatalogResult};

/// An event owned by exactly one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,

    /// Unique within the owning application
    pub name: String,

    pub description: String,

    #[serde(rename = "applicationId")]
    pub application_id: Uuid,

    pub is_active: bool,

    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(application_id: Uuid, name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            application_id,
            is_active: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to create a new event
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    #[serde(rename = "applicationId")]
    pub application_id: Uuid,
    pub name: String,
    pub description: String,
}

impl CreateEventRequest {
    pub fn validate(&self) -> CatalogResult<()> {
        check_length("name", &self.name, 3, Some(50))?;
        check_length("description", &self.description, 5, Some(50))
    }
}

/// Request to update an existing event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_deleted: Option<bool>,
}

impl UpdateEventRequest {
    pub fn validate(&self) -> CatalogResult<()> {
        if self.name.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
            && self.is_deleted.is_none()
        {
            return Err(CatalogError::Validation(
                "at least one of name, description, is_active, is_deleted is required".to_string(),
            ));
        }
        if let Some(name) = &self.name {
            check_length("name", name, 3, Some(50))?;
        }
        if let Some(description) = &self.description {
            check_length("description", description, 5, Some(50))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_names() {
        let event = Event::new(Uuid::nil(), "Signup".into(), "User signed up".into());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["applicationId"], Uuid::nil().to_string());
        assert!(json.get("application_id").is_none());
    }

    #[test]
    fn test_description_upper_bound() {
        let req = CreateEventRequest {
            application_id: Uuid::nil(),
            name: "Signup".into(),
            description: "x".repeat(51),
        };
        assert!(matches!(req.validate(), Err(CatalogError::Validation(_))));
    }
}
