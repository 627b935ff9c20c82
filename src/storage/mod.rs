//! Catalog persistence.
//!
//! Repository traits live in `backend`; `MemoryStore` and `PostgresStore`
//! implement all of them, and `create_repositories` picks one from
//! configuration.

mod backend;
mod factory;
mod memory_backend;
mod postgres_backend;

pub use backend::{
    ApplicationRepository, EventRepository, ListFilter, MessageRepository, NotificationRepository,
    Page, PageRequest, Sort, SortDirection, SortField, StoreError, StoreResult, TagRepository,
};
pub use factory::{create_repositories, Repositories};
pub use memory_backend::MemoryStore;
pub use postgres_backend::PostgresStore;
