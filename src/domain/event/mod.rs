//! Events: named triggers owned by an application.

mod service;
mod types;

pub use service::EventService;
pub use types::{CreateEventRequest, Event, UpdateEventRequest};
