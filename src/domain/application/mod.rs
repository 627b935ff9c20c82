//! Applications: the root of the catalog hierarchy.

mod service;
mod types;

pub use service::ApplicationService;
pub use types::{Application, CreateApplicationRequest, UpdateApplicationRequest};
