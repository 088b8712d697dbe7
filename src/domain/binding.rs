//! Mustache-style `{{ key }}` bindings inside action configuration strings.
//!
//! A binding is the text between `{{` and the next `}}`, trimmed. Empty
//! bindings and unterminated openers are kept as literal text. When openers
//! nest (`{{ a {{ b }}`) the innermost one wins. Triple braces (`{{{ a }}}`)
//! are the same binding as `{{ a }}`.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Binding(&'a str),
}

fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let Some(close_rel) = rest[open + 2..].find("}}") else {
            break;
        };
        let close = open + 2 + close_rel;
        let open = match rest[open + 2..close].rfind("{{") {
            Some(inner) => open + 2 + inner,
            None => open,
        };

        let mut key = &rest[open + 2..close];
        let mut end = close + 2;
        if key.starts_with('{') && rest[end..].starts_with('}') {
            key = &key[1..];
            end += 1;
        }

        let key = key.trim();
        if key.is_empty() {
            out.push(Segment::Literal(&rest[..end]));
        } else {
            if open > 0 {
                out.push(Segment::Literal(&rest[..open]));
            }
            out.push(Segment::Binding(key));
        }
        rest = &rest[end..];
    }

    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

/// Keys referenced by a template, in order of appearance (duplicates kept)
pub fn extract_keys(template: &str) -> Vec<String> {
    segments(template)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Binding(key) => Some(key.to_string()),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Substitute every binding with its value.
///
/// Returns the set of keys that had no value when any are missing.
pub fn render(template: &str, values: &HashMap<String, String>) -> Result<String, BTreeSet<String>> {
    let mut rendered = String::with_capacity(template.len());
    let mut missing = BTreeSet::new();

    for segment in segments(template) {
        match segment {
            Segment::Literal(text) => rendered.push_str(text),
            Segment::Binding(key) => match values.get(key) {
                Some(value) => rendered.push_str(value),
                None => {
                    missing.insert(key.to_string());
                }
            },
        }
    }

    if missing.is_empty() {
        Ok(rendered)
    } else {
        Err(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_keys_trims_whitespace() {
        let keys = extract_keys("/users/{{ Input1.text }}/posts/{{page}}");
        assert_eq!(keys, vec!["Input1.text", "page"]);
    }

    #[test]
    fn test_extract_keys_ignores_empty_and_unterminated() {
        assert!(extract_keys("a {{ }} b").is_empty());
        assert!(extract_keys("a {{ b").is_empty());
        assert!(extract_keys("plain text").is_empty());
    }

    #[test]
    fn test_extract_keys_nested_opener() {
        assert_eq!(extract_keys("{{ a {{ b }}"), vec!["b"]);
    }

    #[test]
    fn test_triple_braces_bind_like_double() {
        assert_eq!(extract_keys("{{{a}}}"), vec!["a"]);
        assert_eq!(render("[{{{ a }}}]", &values(&[("a", "1")])).unwrap(), "[1]");
    }

    #[test]
    fn test_render_substitutes_values() {
        let rendered = render(
            r#"{"id": {{ id }}, "name": "{{name}}"}"#,
            &values(&[("id", "42"), ("name", "Ada")]),
        )
        .unwrap();
        assert_eq!(rendered, r#"{"id": 42, "name": "Ada"}"#);
    }

    #[test]
    fn test_render_keeps_literals() {
        let rendered = render("x {{ }} y {{ z", &HashMap::new()).unwrap();
        assert_eq!(rendered, "x {{ }} y {{ z");
    }

    #[test]
    fn test_render_nested_opener_keeps_outer_text() {
        let rendered = render("{{ a {{ b }}", &values(&[("b", "1")])).unwrap();
        assert_eq!(rendered, "{{ a 1");
    }

    #[test]
    fn test_render_reports_missing_keys() {
        let missing = render("{{a}}{{b}}{{a}}", &values(&[("b", "ok")])).unwrap_err();
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["a"]);
    }
}
