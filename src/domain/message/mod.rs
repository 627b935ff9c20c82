//! Rendered messages and the renderer that produces them.

mod renderer;
mod types;

pub use renderer::MessageRenderer;
pub use types::{Message, PreviewOutcome, PreviewRequest, Recipient, RecipientFailure};
