//! Domain layer modules
//!
//! This module contains the catalog's business logic:
//! - `application`, `event`, `notification`: the entity hierarchy and its services
//! - `message`: per-recipient rendering of notification templates
//! - `template`: placeholder extraction and substitution
//! - `tags`: the global tag catalog
//! - `hierarchy`: ancestry checks across the hierarchy
//! - `listing`: pagination, sorting and filtering of list operations

pub mod application;
pub mod error;
pub mod event;
pub mod hierarchy;
pub mod listing;
pub mod message;
pub mod notification;
pub mod tags;
pub mod template;

pub use error::{CatalogError, CatalogResult};
