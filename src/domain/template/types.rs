//! Template tag types

use serde::{Deserialize, Serialize};

/// A placeholder reference found in a notification template.
///
/// Persisted as `{"label": "..."}` inside a notification's `tags` list;
/// the message renderer reads labels back out of this shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRef {
    pub label: String,
}

impl TagRef {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Collect the labels of a tag list, keeping order and repeats.
pub fn labels(tags: &[TagRef]) -> Vec<String> {
    tags.iter().map(|t| t.label.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_ref_wire_shape() {
        let tag = TagRef::new("name");
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json, serde_json::json!({"label": "name"}));
    }

    #[test]
    fn test_labels_keeps_repeats() {
        let tags = vec![TagRef::new("a"), TagRef::new("b"), TagRef::new("a")];
        assert_eq!(labels(&tags), vec!["a", "b", "a"]);
    }
}
