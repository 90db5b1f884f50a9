//! CSS number and length parsing.
//!
//! Computed styles arrive as strings. Nothing in this module fails loudly:
//! malformed input degrades to `None` or `0.0` so a translator can still emit
//! a visually plausible result for author-written CSS.

use crate::warning::warn_once;

/// User agent default font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Values needed to resolve relative lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    /// Font size of the element (`em`).
    pub font_size: f32,
    /// Font size of the root element (`rem`).
    pub root_font_size: f32,
    /// Viewport width (`vw`).
    pub viewport_width: f32,
    /// Viewport height (`vh`).
    pub viewport_height: f32,
}

impl Default for LengthContext {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            root_font_size: DEFAULT_FONT_SIZE,
            viewport_width: 1280.0,
            viewport_height: 900.0,
        }
    }
}

/// Parse a plain number, returning `0.0` for anything that is not finite.
#[must_use]
pub fn parse_number(value: &str) -> f32 {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Parse an integer, truncating any fraction.
///
/// Returns `None` for anything that is not a finite number inside the `i32`
/// range; out-of-range values are rejected rather than saturated.
#[must_use]
pub fn parse_integer(value: &str) -> Option<i32> {
    let number = value.trim().parse::<f64>().ok().filter(|n| n.is_finite())?.trunc();
    if number < f64::from(i32::MIN) || number > f64::from(i32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let integer = number as i32;
    Some(integer)
}

/// Parse a non-negative count, truncating any fraction and capping it at
/// `limit`. Negative and non-finite values give `None`.
#[must_use]
pub fn parse_count(value: &str, limit: usize) -> Option<usize> {
    let number = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)?
        .trunc();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = number.min(limit as f64) as usize;
    Some(count)
}

/// Split a numeric prefix from its unit suffix: `"12.5px"` → `(12.5, "px")`.
fn split_unit(value: &str) -> Option<(f32, &str)> {
    let value = value.trim();
    let numeric = |i: usize, c: char| {
        c.is_ascii_digit()
            || c == '.'
            || (i == 0 && (c == '-' || c == '+'))
            || (i > 0 && c == 'e' && value[i + 1..].starts_with(|n: char| n.is_ascii_digit()))
    };
    let end = value
        .char_indices()
        .find(|&(i, c)| !numeric(i, c))
        .map_or(value.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }
    let number = value[..end].parse::<f32>().ok().filter(|n| n.is_finite())?;
    Some((number, value[end..].trim()))
}

/// Resolve a CSS length to pixels.
///
/// Percentages are not lengths here; use [`parse_percent`] and resolve them
/// against the relevant container dimension.
#[must_use]
pub fn parse_length(value: &str, context: &LengthContext) -> Option<f32> {
    let (number, unit) = split_unit(value)?;
    let px = match unit.to_ascii_lowercase().as_str() {
        "px" => number,
        "" if number == 0.0 => 0.0,
        "em" => number * context.font_size,
        "rem" => number * context.root_font_size,
        "pt" => number * 4.0 / 3.0,
        "pc" => number * 16.0,
        "in" => number * 96.0,
        "cm" => number * 96.0 / 2.54,
        "mm" => number * 96.0 / 25.4,
        "q" => number * 96.0 / 101.6,
        "vw" => number * context.viewport_width / 100.0,
        "vh" => number * context.viewport_height / 100.0,
        "vmin" => number * context.viewport_width.min(context.viewport_height) / 100.0,
        "vmax" => number * context.viewport_width.max(context.viewport_height) / 100.0,
        "%" => return None,
        other => {
            warn_once("units", &format!("unsupported unit '{other}'"));
            return None;
        }
    };
    Some(px)
}

/// Parse `"50%"` into the fraction `0.5`.
#[must_use]
pub fn parse_percent(value: &str) -> Option<f32> {
    let (number, unit) = split_unit(value)?;
    (unit == "%").then_some(number / 100.0)
}

/// Whether the value is a length (not a percentage or keyword).
#[must_use]
pub fn is_length(value: &str) -> bool {
    split_unit(value).is_some_and(|(n, unit)| {
        !unit.is_empty() && unit != "%" || unit.is_empty() && n == 0.0
    })
}

/// Whether the value is a percentage.
#[must_use]
pub fn is_percent(value: &str) -> bool {
    parse_percent(value).is_some()
}

/// Resolve a length or a percentage of `basis`.
#[must_use]
pub fn parse_length_or_percent(value: &str, basis: f32, context: &LengthContext) -> Option<f32> {
    parse_percent(value).map_or_else(|| parse_length(value, context), |fraction| Some(fraction * basis))
}

/// Format a number with at most `precision` decimals and no trailing zeros.
///
/// `-0` is printed as `0`.
#[must_use]
pub fn format_decimal(value: f32, precision: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let text = format!("{value:.precision$}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" { "0".to_string() } else { text }
}

/// Split on `separator` while ignoring separators nested inside parentheses.
///
/// `"repeat(2, 1fr) 20px"` split on whitespace yields
/// `["repeat(2, 1fr)", "20px"]`.
#[must_use]
pub fn split_outside_parens(value: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && (c == separator || separator == ' ' && c.is_whitespace()) => {
                let part = value[start..i].trim();
                if !part.is_empty() {
                    parts.push(part);
                }
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let part = value[start..].trim();
    if !part.is_empty() {
        parts.push(part);
    }
    parts
}
