//! Repository traits for catalog storage.
//!
//! This module defines the abstraction layer between the domain services and
//! the persistence technology, allowing different storage implementations
//! (memory, PostgreSQL) to be used interchangeably.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::application::Application;
use crate::domain::event::Event;
use crate::domain::message::Message;
use crate::domain::notification::Notification;
use crate::domain::tags::Tag;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The row to update does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend is temporarily unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Field filters shared by the application, event and notification listings.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive substring match on `name`
    pub name: Option<String>,
    /// Case-insensitive substring match on `description`
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::IsActive => "is_active",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// A resolved page window (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.limit as u64
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Storage for the root of the hierarchy.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert a new application.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateKey` if the name is already taken.
    async fn insert(&self, application: &Application) -> StoreResult<()>;

    /// Replace a stored application with the given record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no row has this id and
    /// `StoreError::DuplicateKey` if the new name is taken by another row.
    async fn update(&self, application: &Application) -> StoreResult<()>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Application>>;

    /// Exact-match lookup on the globally unique name.
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Application>>;

    async fn list(
        &self,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<Application>>;
}

/// Storage for events, scoped by owning application.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateKey` if the name is taken within the
    /// owning application.
    async fn insert(&self, event: &Event) -> StoreResult<()>;

    async fn update(&self, event: &Event) -> StoreResult<()>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Event>>;

    async fn find_by_name(&self, application_id: Uuid, name: &str) -> StoreResult<Option<Event>>;

    async fn list(
        &self,
        application_id: Uuid,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<Event>>;
}

/// Storage for notifications, scoped by owning event.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateKey` if the name is taken within the
    /// owning event.
    async fn insert(&self, notification: &Notification) -> StoreResult<()>;

    async fn update(&self, notification: &Notification) -> StoreResult<()>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Notification>>;

    async fn find_by_name(&self, event_id: Uuid, name: &str)
        -> StoreResult<Option<Notification>>;

    async fn list(
        &self,
        event_id: Uuid,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<Notification>>;
}

/// The global tag catalog. Append-only.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_label(&self, label: &str) -> StoreResult<Option<Tag>>;

    /// # Errors
    ///
    /// Returns `StoreError::DuplicateKey` if the label is already present.
    async fn insert(&self, tag: &Tag) -> StoreResult<()>;

    /// All tags ordered by label.
    async fn list(&self) -> StoreResult<Vec<Tag>>;
}

/// Storage for rendered messages. Rows are immutable once written.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: &Message) -> StoreResult<()>;

    /// Messages for one notification, oldest first.
    async fn list_by_notification(&self, notification_id: Uuid) -> StoreResult<Vec<Message>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(PageRequest { page: 1, limit: 3 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, limit: 3 }.offset(), 6);
        assert_eq!(PageRequest { page: 0, limit: 3 }.offset(), 0);
    }

    #[test]
    fn test_sort_field_columns() {
        assert_eq!(SortField::Name.column(), "name");
        assert_eq!(SortField::IsActive.column(), "is_active");
        assert_eq!(SortDirection::Desc.keyword(), "DESC");
    }

    #[test]
    fn test_duplicate_key_detection() {
        assert!(StoreError::DuplicateKey("tags_label_key".into()).is_duplicate_key());
        assert!(!StoreError::NotFound("x".into()).is_duplicate_key());
    }
}
