//! API layer - HTTP endpoint handlers organized by resource.

mod applications;
mod events;
mod health;
mod metrics;
mod notifications;
mod routes;
mod tags;

pub use applications::ApplicationListResponse;
pub use events::{EventListParams, EventListResponse, EventScope};
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use notifications::{MessageListResponse, NotificationListParams, NotificationListResponse};
pub use routes::api_routes;
