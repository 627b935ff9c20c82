use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::domain::application::ApplicationService;
use crate::domain::event::EventService;
use crate::domain::hierarchy::HierarchyGuard;
use crate::domain::message::MessageRenderer;
use crate::domain::notification::NotificationService;
use crate::domain::tags::TagRegistry;
use crate::postgres::PostgresPool;
use crate::storage::Repositories;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub applications: ApplicationService,
    pub events: EventService,
    pub notifications: NotificationService,
    pub messages: MessageRenderer,
    pub tags: TagRegistry,
    /// `"memory"` or `"postgres"`
    pub storage_backend: &'static str,
    pub postgres_pool: Option<Arc<PostgresPool>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        settings: Settings,
        repos: Repositories,
        postgres_pool: Option<Arc<PostgresPool>>,
    ) -> Self {
        let pagination = settings.pagination.clone();
        let guard = HierarchyGuard::new(repos.events.clone(), repos.notifications.clone());
        let tags = TagRegistry::new(repos.tags.clone());

        let applications = ApplicationService::new(repos.applications.clone(), pagination.clone());
        let events = EventService::new(
            repos.applications.clone(),
            repos.events.clone(),
            guard.clone(),
            pagination.clone(),
        );
        let notifications = NotificationService::new(
            repos.notifications.clone(),
            guard.clone(),
            tags.clone(),
            pagination,
        );
        let messages = MessageRenderer::new(repos.messages.clone(), guard);

        Self {
            settings: Arc::new(settings),
            applications,
            events,
            notifications,
            messages,
            tags,
            storage_backend: repos.backend_type,
            postgres_pool,
            start_time: Instant::now(),
        }
    }
}
