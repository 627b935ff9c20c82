//! Notifications: parameterized templates owned by an event.
//!
//! The tag list of a notification is always derived from its template body
//! and re-derived in full whenever the body changes.

mod service;
mod types;

pub use service::NotificationService;
pub use types::{
    CreateNotificationRequest, Notification, NotificationScope, UpdateNotificationRequest,
};
