//! Placeholder extraction for `{{label}}` templates

use lazy_static::lazy_static;
use regex::Regex;

use super::types::TagRef;

lazy_static! {
    /// `{{` then one or more non-`}` characters then `}}`
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder regex is valid");
}

/// Extract every `{{label}}` placeholder from a template body.
///
/// Labels are returned in order of appearance, one entry per match. A label
/// referenced twice yields two entries. Labels are not trimmed or otherwise
/// validated, and an unterminated `{{` is simply not matched.
pub fn extract_tags(template_body: &str) -> Vec<TagRef> {
    PLACEHOLDER
        .captures_iter(template_body)
        .filter_map(|caps| caps.get(1))
        .map(|m| TagRef::new(m.as_str()))
        .collect()
}

/// The literal placeholder text for a label, e.g. `{{name}}`.
pub fn placeholder(label: &str) -> String {
    format!("{{{{{}}}}}", label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_of(body: &str) -> Vec<String> {
        extract_tags(body).into_iter().map(|t| t.label).collect()
    }

    #[test]
    fn test_extract_in_order() {
        let tags = extract_tags("Hi {{name}}, your code is {{code}}");
        assert_eq!(tags, vec![TagRef::new("name"), TagRef::new("code")]);
    }

    #[test]
    fn test_no_placeholders() {
        assert!(extract_tags("Hello world").is_empty());
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn test_repeated_label_not_deduplicated() {
        assert_eq!(labels_of("{{a}} and again {{a}}"), vec!["a", "a"]);
    }

    #[test]
    fn test_label_whitespace_preserved() {
        assert_eq!(labels_of("Hello {{ name }}!"), vec![" name "]);
    }

    #[test]
    fn test_unterminated_placeholder_ignored() {
        assert_eq!(labels_of("Hi {{name"), Vec::<String>::new());
        assert_eq!(labels_of("Hi {{name} and {{code}}"), vec!["code"]);
    }

    #[test]
    fn test_empty_braces_ignored() {
        assert!(extract_tags("{{}}").is_empty());
    }

    #[test]
    fn test_opening_brace_inside_label() {
        assert_eq!(labels_of("{{{a}}"), vec!["{a"]);
    }

    #[test]
    fn test_adjacent_placeholders() {
        assert_eq!(labels_of("{{a}}{{b}}"), vec!["a", "b"]);
    }

    #[test]
    fn test_placeholder_text() {
        assert_eq!(placeholder("name"), "{{name}}");
    }
}
