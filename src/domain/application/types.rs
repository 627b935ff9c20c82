//! Application types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{check_length, CatalogError, CatalogResult};

/// Root of the Application → Event → Notification hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,

    /// Globally unique name (3-50 characters)
    pub name: String,

    pub description: String,

    pub is_active: bool,

    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            is_active: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to create a new application
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationRequest {
    pub name: String,
    pub description: String,
}

impl CreateApplicationRequest {
    pub fn validate(&self) -> CatalogResult<()> {
        check_length("name", &self.name, 3, Some(50))?;
        check_length("description", &self.description, 5, None)
    }
}

/// Request to update an existing application; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_deleted: Option<bool>,
}

impl UpdateApplicationRequest {
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
            check_length("description", description, 5, None)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_application_is_active() {
        let app = Application::new("Billing".into(), "Billing system".into());
        assert!(app.is_active);
        assert!(!app.is_deleted);
        assert_eq!(app.created_at, app.updated_at);
    }

    #[test]
    fn test_create_validation() {
        let ok = CreateApplicationRequest {
            name: "Billing".into(),
            description: "Billing system".into(),
        };
        assert!(ok.validate().is_ok());

        let short = CreateApplicationRequest {
            name: "Bi".into(),
            description: "Billing system".into(),
        };
        assert!(matches!(short.validate(), Err(CatalogError::Validation(_))));
    }

    #[test]
    fn test_empty_update_rejected() {
        let update = UpdateApplicationRequest::default();
        assert!(matches!(update.validate(), Err(CatalogError::Validation(_))));

        let update = UpdateApplicationRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }
}
