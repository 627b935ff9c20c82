//! Per-recipient placeholder substitution

use std::collections::HashSet;

use indexmap::IndexMap;

use super::parser::placeholder;

/// Substitute recipient values into a template body.
///
/// Values are applied in the recipient map's order, each one replacing only
/// the first remaining `{{label}}` occurrence in the evolving body. Labels
/// outside `known_labels` are skipped entirely. Known labels the recipient
/// does not supply stay in the output as literal `{{label}}` text.
///
/// Because substitution is sequential, a value that itself contains
/// `{{other}}` can be picked up by a later replacement.
pub fn substitute_tags(
    template_body: &str,
    known_labels: &HashSet<&str>,
    values: &IndexMap<String, String>,
) -> String {
    let mut body = template_body.to_string();

    for (label, value) in values {
        if known_labels.contains(label.as_str()) {
            body = body.replacen(&placeholder(label), value, 1);
        }
    }

    body
}

/// Build the persisted message body: a three-line header followed by the
/// substituted template.
pub fn compose_message_body(
    application_name: &str,
    event_name: &str,
    notification_name: &str,
    rendered_template: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        application_name, event_name, notification_name, rendered_template
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_simple() {
        let known: HashSet<&str> = ["name"].into_iter().collect();
        let out = substitute_tags("Hi {{name}}", &known, &values(&[("name", "Ada")]));
        assert_eq!(out, "Hi Ada");
    }

    #[test]
    fn test_missing_value_left_literal() {
        let known: HashSet<&str> = ["name"].into_iter().collect();
        let out = substitute_tags("Hi {{name}}", &known, &IndexMap::new());
        assert_eq!(out, "Hi {{name}}");
    }

    #[test]
    fn test_unknown_label_ignored() {
        let known: HashSet<&str> = ["name"].into_iter().collect();
        let out = substitute_tags(
            "Hi {{name}} {{foo}}",
            &known,
            &values(&[("foo", "bar"), ("name", "Ada")]),
        );
        assert_eq!(out, "Hi Ada {{foo}}");
    }

    #[test]
    fn test_only_first_occurrence_replaced() {
        let known: HashSet<&str> = ["a"].into_iter().collect();
        let out = substitute_tags("{{a}}-{{a}}", &known, &values(&[("a", "x")]));
        assert_eq!(out, "x-{{a}}");
    }

    #[test]
    fn test_sequential_reentrant_substitution() {
        let known: HashSet<&str> = ["a", "b"].into_iter().collect();
        let out = substitute_tags(
            "{{a}} and {{b}}",
            &known,
            &values(&[("a", "{{b}}"), ("b", "B")]),
        );
        // The value of `a` introduced a `{{b}}` ahead of the original one.
        assert_eq!(out, "B and {{b}}");
    }

    #[test]
    fn test_compose_message_body() {
        let body = compose_message_body("App", "Signup", "Welcome", "Hi Ada");
        assert_eq!(body, "App\nSignup\nWelcome\nHi Ada");
    }
}
