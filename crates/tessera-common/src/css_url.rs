//! `url(...)` references inside CSS values.
//!
//! The argument may be double quoted, single quoted or bare. Quoted
//! arguments can contain parentheses; bare ones end at the first `)`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#).expect("BUG: invalid CSS_URL regex literal")
});

fn argument<'a>(caps: &Captures<'a>) -> &'a str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map_or("", |m| m.as_str().trim())
}

/// Every URL inside `url(...)` functions of a CSS value, in order.
#[must_use]
pub fn css_urls(value: &str) -> Vec<&str> {
    CSS_URL
        .captures_iter(value)
        .map(|caps| argument(&caps))
        .filter(|url| !url.is_empty())
        .collect()
}

/// Replaces the URL of each `url(...)` for which `replace` returns a new one.
/// Replaced functions are written with a double-quoted argument; the others
/// are kept as written.
pub fn replace_css_urls(value: &str, mut replace: impl FnMut(&str) -> Option<String>) -> String {
    CSS_URL
        .replace_all(value, |caps: &Captures<'_>| match replace(argument(caps)) {
            Some(url) => format!("url(\"{url}\")"),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_urls_handle_quoting() {
        assert_eq!(
            css_urls(r#"url("a.png"), url('b c.png'), url( d.png ), linear-gradient(red, blue)"#),
            vec!["a.png", "b c.png", "d.png"]
        );
        assert!(css_urls("none").is_empty());
        assert!(css_urls("url(broken").is_empty());
    }

    #[test]
    fn test_quoted_url_keeps_parentheses() {
        assert_eq!(css_urls(r#"url("a(1).png"), url('b(2).png')"#), vec!["a(1).png", "b(2).png"]);
    }

    #[test]
    fn test_replace_only_known_urls() {
        let replaced = replace_css_urls(r"url(a.png) no-repeat, url('b.png')", |url| {
            (url == "a.png").then(|| "local/a.png".to_string())
        });
        assert_eq!(replaced, r#"url("local/a.png") no-repeat, url('b.png')"#);
    }
}
