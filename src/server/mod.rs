//! HTTP server assembly: shared state, middleware and the router.

mod app;
pub mod middleware;
mod state;

pub use app::create_app;
pub use state::AppState;
