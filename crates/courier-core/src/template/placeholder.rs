//! Placeholder extraction and flat substitution.
//!
//! A placeholder is a non-empty run of characters other than `}` enclosed in
//! braces: `{Name}`. Matches never overlap; scanning resumes after the closing
//! brace. `{}` is not a placeholder and is left in place.

use std::collections::{BTreeSet, HashMap};

/// A placeholder match: byte range of the whole `{...}` and its inner name.
struct Match<'a> {
    start: usize,
    end: usize,
    name: &'a str,
}

/// Iterate placeholder matches in a body, left to right.
fn scan(body: &str) -> impl Iterator<Item = Match<'_>> {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos < body.len() {
            let open = pos + body[pos..].find('{')?;
            let close = match body[open + 1..].find('}') {
                Some(offset) => open + 1 + offset,
                None => {
                    pos = body.len();
                    return None;
                }
            };
            if close == open + 1 {
                // "{}": empty inner text, resume right after the opening brace
                pos = open + 1;
                continue;
            }
            pos = close + 1;
            return Some(Match {
                start: open,
                end: close + 1,
                name: &body[open + 1..close],
            });
        }
        None
    })
}

/// Extract the distinct placeholder names from a template body, sorted.
///
/// ```
/// use courier_core::template::placeholder::extract_placeholders;
///
/// let names = extract_placeholders("Hi {Name}, see you {Date}. Bye {Name}!");
/// assert_eq!(names, vec!["Date".to_string(), "Name".to_string()]);
/// ```
pub fn extract_placeholders(body: &str) -> Vec<String> {
    scan(body)
        .map(|m| m.name.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Substitute every placeholder in `body`.
///
/// Known names are replaced with their parameter value; unknown names become
/// the literal `[Name]` so gaps stay visible in the output.
pub fn render_body(body: &str, parameters: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for m in scan(body) {
        out.push_str(&body[last..m.start]);
        match parameters.get(m.name) {
            Some(value) => out.push_str(value),
            None => {
                out.push('[');
                out.push_str(m.name);
                out.push(']');
            }
        }
        last = m.end;
    }

    out.push_str(&body[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_sorted_and_deduplicated() {
        let names = extract_placeholders("{b} {a} {b} {c}");
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let body = "Order {order_id} for {Name} ({Name})";
        assert_eq!(extract_placeholders(body), extract_placeholders(body));
    }

    #[test]
    fn test_extract_ignores_empty_braces() {
        assert_eq!(extract_placeholders("{} and {x}"), vec!["x"]);
    }

    #[test]
    fn test_extract_unclosed_brace() {
        assert!(extract_placeholders("hello {world").is_empty());
        assert_eq!(extract_placeholders("{a} then {b"), vec!["a"]);
    }

    #[test]
    fn test_extract_nested_open_brace_is_part_of_name() {
        // leftmost '{' starts the match and runs to the first '}'
        assert_eq!(extract_placeholders("{{a}}"), vec!["{a"]);
    }

    #[test]
    fn test_extract_keeps_inner_whitespace() {
        assert_eq!(extract_placeholders("{first name}"), vec!["first name"]);
    }

    #[test]
    fn test_render_greet_scenario() {
        let out = render_body("Hello, {Name}! Today is {Date}.", &params(&[("Name", "Ann")]));
        assert_eq!(out, "Hello, Ann! Today is [Date].");
    }

    #[test]
    fn test_render_all_supplied_leaves_no_markers() {
        let body = "{greeting}, {Name}! Your code is {code}.";
        let out = render_body(
            body,
            &params(&[("greeting", "Hi"), ("Name", "Bo"), ("code", "42")]),
        );
        assert_eq!(out, "Hi, Bo! Your code is 42.");
        assert!(extract_placeholders(&out).is_empty());
    }

    #[test]
    fn test_render_repeated_placeholder_consistent() {
        let out = render_body("{x}-{x}-{y}-{y}", &params(&[("x", "1")]));
        assert_eq!(out, "1-1-[y]-[y]");
    }

    #[test]
    fn test_render_value_with_braces_is_not_rescanned() {
        let out = render_body("{a} {b}", &params(&[("a", "{b}"), ("b", "B")]));
        assert_eq!(out, "{b} B");
    }

    #[test]
    fn test_render_keeps_empty_braces_and_unicode() {
        let out = render_body("Привет, {имя}! {}", &params(&[("имя", "Аня")]));
        assert_eq!(out, "Привет, Аня! {}");
    }

    #[test]
    fn test_render_without_placeholders() {
        assert_eq!(render_body("plain text", &HashMap::new()), "plain text");
    }
}
