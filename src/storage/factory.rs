//! Storage backend factory

use std::sync::Arc;

use crate::infrastructure::config::StorageConfig;
use crate::infrastructure::postgres::PostgresPool;

use super::backend::{
    ApplicationRepository, EventRepository, MessageRepository, NotificationRepository,
    TagRepository,
};
use super::memory_backend::MemoryStore;
use super::postgres_backend::PostgresStore;

/// One handle per repository trait, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub applications: Arc<dyn ApplicationRepository>,
    pub events: Arc<dyn EventRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub messages: Arc<dyn MessageRepository>,
    /// `"memory"` or `"postgres"`
    pub backend_type: &'static str,
}

impl Repositories {
    /// Repositories over a fresh in-memory store.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            applications: store.clone(),
            events: store.clone(),
            notifications: store.clone(),
            tags: store.clone(),
            messages: store,
            backend_type: "memory",
        }
    }

    /// Repositories over a PostgreSQL pool.
    pub fn postgres(pool: &PostgresPool) -> Self {
        let store = Arc::new(PostgresStore::new(pool.pool().clone()));
        Self {
            applications: store.clone(),
            events: store.clone(),
            notifications: store.clone(),
            tags: store.clone(),
            messages: store,
            backend_type: "postgres",
        }
    }
}

/// Create the catalog repositories based on configuration.
///
/// Returns the appropriate backend implementation based on the `backend` setting:
/// - `"postgres"`: PostgreSQL-backed repositories if a pool is provided
/// - `"memory"` (default): In-memory repositories
///
/// # Example
///
/// ```rust,ignore
/// let repos = create_repositories(&settings.storage, Some(pg_pool.clone()));
/// ```
pub fn create_repositories(
    settings: &StorageConfig,
    postgres_pool: Option<Arc<PostgresPool>>,
) -> Repositories {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(
                    backend = "postgres",
                    database = %pool.database_url_masked(),
                    "Creating PostgreSQL catalog storage"
                );
                Repositories::postgres(&pool)
            } else {
                tracing::warn!(
                    "PostgreSQL backend requested but no pool provided, falling back to memory"
                );
                Repositories::memory()
            }
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating memory catalog storage");
            Repositories::memory()
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown storage backend, falling back to memory"
            );
            Repositories::memory()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_without_pool_falls_back() {
        let settings = StorageConfig {
            backend: "postgres".to_string(),
            ..Default::default()
        };
        let repos = create_repositories(&settings, None);
        assert_eq!(repos.backend_type, "memory");
    }

    #[test]
    fn test_unknown_backend_falls_back() {
        let settings = StorageConfig {
            backend: "cassandra".to_string(),
            ..Default::default()
        };
        assert_eq!(create_repositories(&settings, None).backend_type, "memory");
    }

    #[tokio::test]
    async fn test_memory_handles_share_one_store() {
        use crate::domain::application::Application;

        let repos = Repositories::memory();
        let app = Application::new("Shared".into(), "shared store".into());
        repos.applications.insert(&app).await.unwrap();
        assert!(repos.applications.get(app.id).await.unwrap().is_some());
    }
}
