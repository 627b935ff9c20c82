//! Notification template engine.
//!
//! This module provides:
//! - Placeholder extraction for `{{label}}` tokens in a template body
//! - Per-recipient substitution of label values into a template body
//! - Composition of the persisted message body
//!
//! # Example
//!
//! ```ignore
//! let tags = extract_tags("Hi {{name}}, your code is {{code}}");
//! // [TagRef { label: "name" }, TagRef { label: "code" }]
//!
//! let known: HashSet<&str> = tags.iter().map(|t| t.label.as_str()).collect();
//! let body = substitute_tags("Hi {{name}}, your code is {{code}}", &known, &values);
//! ```

mod parser;
mod substitution;
mod types;

pub use parser::{extract_tags, placeholder};
pub use substitution::{compose_message_body, substitute_tags};
pub use types::{labels, TagRef};
