//! PostgreSQL-based catalog storage.
//!
//! This module provides a persistent implementation of every repository
//! trait. Uniqueness rules are enforced by the unique indexes created in
//! `migrations/0001_init.sql`; a violated index surfaces as
//! `StoreError::DuplicateKey`.
//!
//! Table structure:
//! - `applications` - Root of the hierarchy, unique `name`
//! - `events` - Unique `(application_id, name)`
//! - `notifications` - Unique `(event_id, name)`, `tags` stored as JSONB
//! - `tags` - Global label catalog, unique `label`
//! - `messages` - Rendered messages per notification

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::application::Application;
use crate::domain::event::Event;
use crate::domain::message::Message;
use crate::domain::notification::Notification;
use crate::domain::tags::Tag;
use crate::domain::template::TagRef;

use super::backend::{
    ApplicationRepository, EventRepository, ListFilter, MessageRepository, NotificationRepository,
    Page, PageRequest, Sort, StoreError, StoreResult, TagRepository,
};

/// PostgreSQL unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";

/// Map a driver error, turning unique index violations into `DuplicateKey`.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unique index").to_string();
            return StoreError::DuplicateKey(constraint);
        }
    }
    StoreError::Postgres(err)
}

/// Shared WHERE fragment for the listing filters, parameters `$2..=$5`.
/// `$1` is the parent id, bound as NULL for applications.
const FILTER_CLAUSE: &str = r#"
    ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
    AND ($3::text IS NULL OR description ILIKE '%' || $3 || '%')
    AND ($4::boolean IS NULL OR is_active = $4)
    AND ($5::boolean IS NULL OR is_deleted = $5)
"#;

/// ORDER BY clause built only from whitelisted column names.
fn order_clause(sort: Option<Sort>) -> String {
    match sort {
        Some(sort) => format!(
            "ORDER BY {} {}, created_at ASC, id ASC",
            sort.field.column(),
            sort.direction.keyword()
        ),
        None => "ORDER BY created_at ASC, id ASC".to_string(),
    }
}

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    name: String,
    description: String,
    is_active: bool,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    application_id: Uuid,
    name: String,
    description: String,
    is_active: bool,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            application_id: row.application_id,
            is_active: row.is_active,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    event_id: Uuid,
    name: String,
    description: String,
    templatebody: String,
    tags: Json<Vec<TagRef>>,
    is_active: bool,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            event_id: row.event_id,
            templatebody: row.templatebody,
            tags: row.tags.0,
            is_active: row.is_active,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    label: String,
    created_at: DateTime<Utc>,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            label: row.label,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    notification_id: Uuid,
    email: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            body: row.body,
            notification_id: row.notification_id,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL-based catalog storage.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count plus one page of rows for a filtered listing.
    ///
    /// `parent` binds to `$1`. Applications have no parent and pass `None`.
    async fn fetch_page<R>(
        &self,
        table: &str,
        parent_column: Option<&str>,
        parent: Option<Uuid>,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<R>>
    where
        R: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let parent_clause = match parent_column {
            Some(column) => format!("{} = $1", column),
            None => "$1::uuid IS NULL".to_string(),
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} AND {}",
            table, parent_clause, FILTER_CLAUSE
        );
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(parent)
            .bind(filter.name.as_deref())
            .bind(filter.description.as_deref())
            .bind(filter.is_active)
            .bind(filter.is_deleted)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let select_sql = format!(
            "SELECT * FROM {} WHERE {} AND {} {} LIMIT $6 OFFSET $7",
            table,
            parent_clause,
            FILTER_CLAUSE,
            order_clause(sort)
        );
        let items: Vec<R> = sqlx::query_as(&select_sql)
            .bind(parent)
            .bind(filter.name.as_deref())
            .bind(filter.description.as_deref())
            .bind(filter.is_active)
            .bind(filter.is_deleted)
            .bind(page.limit as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page {
            items,
            total: total.max(0) as u64,
        })
    }
}

#[async_trait]
impl ApplicationRepository for PostgresStore {
    async fn insert(&self, application: &Application) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO applications (id, name, description, is_active, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(application.id)
        .bind(&application.name)
        .bind(&application.description)
        .bind(application.is_active)
        .bind(application.is_deleted)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update(&self, application: &Application) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET name = $2, description = $3, is_active = $4, is_deleted = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(application.id)
        .bind(&application.name)
        .bind(&application.description)
        .bind(application.is_active)
        .bind(application.is_deleted)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("application {}", application.id)));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let row: Option<ApplicationRow> = sqlx::query_as("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Application>> {
        let row: Option<ApplicationRow> =
            sqlx::query_as("SELECT * FROM applications WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn list(
        &self,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<Application>> {
        let rows: Page<ApplicationRow> = self
            .fetch_page("applications", None, None, filter, sort, page)
            .await?;
        Ok(Page {
            items: rows.items.into_iter().map(Into::into).collect(),
            total: rows.total,
        })
    }
}

#[async_trait]
impl EventRepository for PostgresStore {
    async fn insert(&self, event: &Event) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, application_id, name, description, is_active, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.id)
        .bind(event.application_id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.is_active)
        .bind(event.is_deleted)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update(&self, event: &Event) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET name = $2, description = $3, is_active = $4, is_deleted = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.is_active)
        .bind(event.is_deleted)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("event {}", event.id)));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, application_id: Uuid, name: &str) -> StoreResult<Option<Event>> {
        let row: Option<EventRow> =
            sqlx::query_as("SELECT * FROM events WHERE application_id = $1 AND name = $2")
                .bind(application_id)
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn list(
        &self,
        application_id: Uuid,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<Event>> {
        let rows: Page<EventRow> = self
            .fetch_page(
                "events",
                Some("application_id"),
                Some(application_id),
                filter,
                sort,
                page,
            )
            .await?;
        Ok(Page {
            items: rows.items.into_iter().map(Into::into).collect(),
            total: rows.total,
        })
    }
}

#[async_trait]
impl NotificationRepository for PostgresStore {
    async fn insert(&self, notification: &Notification) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications
                (id, event_id, name, description, templatebody, tags, is_active, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(notification.id)
        .bind(notification.event_id)
        .bind(&notification.name)
        .bind(&notification.description)
        .bind(&notification.templatebody)
        .bind(Json(&notification.tags))
        .bind(notification.is_active)
        .bind(notification.is_deleted)
        .bind(notification.created_at)
        .bind(notification.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update(&self, notification: &Notification) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET name = $2, description = $3, templatebody = $4, tags = $5,
                is_active = $6, is_deleted = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(notification.id)
        .bind(&notification.name)
        .bind(&notification.description)
        .bind(&notification.templatebody)
        .bind(Json(&notification.tags))
        .bind(notification.is_active)
        .bind(notification.is_deleted)
        .bind(notification.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "notification {}",
                notification.id
            )));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Notification>> {
        let row: Option<NotificationRow> =
            sqlx::query_as("SELECT * FROM notifications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_by_name(
        &self,
        event_id: Uuid,
        name: &str,
    ) -> StoreResult<Option<Notification>> {
        let row: Option<NotificationRow> =
            sqlx::query_as("SELECT * FROM notifications WHERE event_id = $1 AND name = $2")
                .bind(event_id)
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn list(
        &self,
        event_id: Uuid,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<Notification>> {
        let rows: Page<NotificationRow> = self
            .fetch_page(
                "notifications",
                Some("event_id"),
                Some(event_id),
                filter,
                sort,
                page,
            )
            .await?;
        Ok(Page {
            items: rows.items.into_iter().map(Into::into).collect(),
            total: rows.total,
        })
    }
}

#[async_trait]
impl TagRepository for PostgresStore {
    async fn find_by_label(&self, label: &str) -> StoreResult<Option<Tag>> {
        let row: Option<TagRow> = sqlx::query_as("SELECT * FROM tags WHERE label = $1")
            .bind(label)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn insert(&self, tag: &Tag) -> StoreResult<()> {
        sqlx::query("INSERT INTO tags (id, label, created_at) VALUES ($1, $2, $3)")
            .bind(tag.id)
            .bind(&tag.label)
            .bind(tag.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Tag>> {
        let rows: Vec<TagRow> = sqlx::query_as("SELECT * FROM tags ORDER BY label ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl MessageRepository for PostgresStore {
    async fn insert(&self, message: &Message) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, notification_id, email, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(message.notification_id)
        .bind(&message.email)
        .bind(&message.body)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_by_notification(&self, notification_id: Uuid) -> StoreResult<Vec<Message>> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT * FROM messages WHERE notification_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(notification_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SortDirection, SortField};

    #[test]
    fn test_order_clause_default() {
        assert_eq!(order_clause(None), "ORDER BY created_at ASC, id ASC");
    }

    #[test]
    fn test_order_clause_whitelisted_column() {
        let clause = order_clause(Some(Sort {
            field: SortField::UpdatedAt,
            direction: SortDirection::Desc,
        }));
        assert!(clause.starts_with("ORDER BY updated_at DESC"));
    }

    #[test]
    fn test_non_database_error_passthrough() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Postgres(_)));
    }
}
