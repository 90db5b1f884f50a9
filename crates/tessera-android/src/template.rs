//! Declarative XML emission.
//!
//! A template maps each tag name to a rule object with these directives:
//!
//! - `@`: attribute names, read from each data item in this order
//! - `>`: child tags with their own rules; the item holds an array of child
//!   items under the same key
//! - `~`: key of the item's text content
//! - `#`: key of pre-rendered markup, inserted verbatim and re-indented
//!
//! ```text
//! { "resources": { ">": { "string": { "@": ["name"], "~": "value" } } } }
//! ```
//!
//! Data items are JSON objects; missing or `null` attributes are skipped.

use std::fmt::Write;

use serde_json::{Map, Value};
use thiserror::Error;

/// A template or its data did not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// No rule for a tag that has data.
    #[error("no template rule for <{0}>")]
    MissingRule(String),
    /// A rule directive has the wrong type.
    #[error("template rule for <{tag}> is malformed: {reason}")]
    InvalidRule {
        /// Tag of the rule.
        tag: String,
        /// What was wrong.
        reason: &'static str,
    },
    /// Data for a tag is not an array of objects.
    #[error("data for <{0}> must be an array of objects")]
    InvalidData(String),
}

struct Rule<'a> {
    attributes: Vec<&'a str>,
    children: Option<&'a Map<String, Value>>,
    text: Option<&'a str>,
    markup: Option<&'a str>,
}

impl<'a> Rule<'a> {
    fn parse(tag: &str, rule: &'a Map<String, Value>) -> Result<Self, TemplateError> {
        let invalid = |reason| TemplateError::InvalidRule {
            tag: tag.to_string(),
            reason,
        };
        let attributes = match rule.get("@") {
            None => Vec::new(),
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| name.as_str().ok_or_else(|| invalid("`@` entries must be strings")))
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(invalid("`@` must be an array")),
        };
        let children = match rule.get(">") {
            None => None,
            Some(Value::Object(children)) => Some(children),
            Some(_) => return Err(invalid("`>` must be an object")),
        };
        let key = |directive: &str| match rule.get(directive) {
            None => Ok(None),
            Some(Value::String(key)) => Ok(Some(key.as_str())),
            Some(_) => Err(invalid("`~` and `#` must name a key")),
        };
        Ok(Self {
            attributes,
            children,
            text: key("~")?,
            markup: key("#")?,
        })
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Rule map from a JSON object literal. Anything else yields no rules.
#[must_use]
pub fn rules(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Escapes text for an XML attribute value.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            c => out.push(c),
        }
    }
    out
}

/// Escapes XML text content.
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Renders `items` as `<tag>` elements using the rule for `tag` in
/// `template`, indented `depth` levels of `indent` spaces.
///
/// # Errors
///
/// [`TemplateError`] when a tag with data has no rule, a rule is malformed,
/// or data is not an array of objects.
pub fn apply_template(
    tag: &str,
    template: &Map<String, Value>,
    items: &[Value],
    depth: usize,
    indent: usize,
) -> Result<String, TemplateError> {
    let rule = template
        .get(tag)
        .and_then(Value::as_object)
        .ok_or_else(|| TemplateError::MissingRule(tag.to_string()))?;
    let rule = Rule::parse(tag, rule)?;
    let pad = " ".repeat(depth * indent);
    let inner_pad = " ".repeat((depth + 1) * indent);
    let mut out = String::new();

    for item in items {
        let item = item
            .as_object()
            .ok_or_else(|| TemplateError::InvalidData(tag.to_string()))?;
        let _ = write!(out, "{pad}<{tag}");
        for name in &rule.attributes {
            if let Some(value) = item.get(*name).and_then(scalar) {
                let _ = write!(out, " {name}=\"{}\"", escape_attribute(&value));
            }
        }

        let mut body = String::new();
        if let Some(children) = rule.children {
            for child in children.keys() {
                match item.get(child) {
                    None | Some(Value::Null) => {}
                    Some(Value::Array(list)) => {
                        body.push_str(&apply_template(child, children, list, depth + 1, indent)?);
                    }
                    Some(_) => return Err(TemplateError::InvalidData(child.clone())),
                }
            }
        }
        if let Some(markup) = rule.markup.and_then(|key| item.get(key)).and_then(Value::as_str) {
            for line in markup.lines().filter(|line| !line.trim().is_empty()) {
                let _ = writeln!(body, "{inner_pad}{line}");
            }
        }
        let text = rule.text.and_then(|key| item.get(key)).and_then(scalar);

        match (text, body.is_empty()) {
            (None, true) => out.push_str(" />\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{tag}>", escape_text(&text));
            }
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    let _ = writeln!(out, "{inner_pad}{}", escape_text(&text));
                }
                out.push_str(&body);
                let _ = writeln!(out, "{pad}</{tag}>");
            }
        }
    }
    Ok(out)
}
