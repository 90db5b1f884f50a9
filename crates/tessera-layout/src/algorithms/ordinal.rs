//! List marker text for `list-style-type`.

use strum_macros::{Display, EnumString};

/// Supported `list-style-type` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ListStyle {
    /// `disc`
    #[default]
    Disc,
    /// `circle`
    Circle,
    /// `square`
    Square,
    /// `decimal`
    Decimal,
    /// `decimal-leading-zero`
    DecimalLeadingZero,
    /// `lower-alpha`, `lower-latin`
    #[strum(serialize = "lower-alpha", serialize = "lower-latin")]
    LowerAlpha,
    /// `upper-alpha`, `upper-latin`
    #[strum(serialize = "upper-alpha", serialize = "upper-latin")]
    UpperAlpha,
    /// `lower-roman`
    LowerRoman,
    /// `upper-roman`
    UpperRoman,
    /// `lower-greek`
    LowerGreek,
    /// `none`
    None,
}

impl ListStyle {
    /// Parses a computed value; unknown styles fall back to `disc`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }

    /// Whether the marker is a glyph rather than a counter.
    #[must_use]
    pub fn is_bullet(self) -> bool {
        matches!(self, ListStyle::Disc | ListStyle::Circle | ListStyle::Square)
    }
}

const GREEK: [char; 24] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ',
    'τ', 'υ', 'φ', 'χ', 'ψ', 'ω',
];

/// Bijective base-N numbering (`a`..`z`, `aa`, `ab`, ...).
#[allow(clippy::cast_possible_truncation)]
fn alphabetic(mut value: u32, alphabet: &[char]) -> String {
    let base = alphabet.len() as u32;
    let mut out = Vec::new();
    while value > 0 {
        value -= 1;
        out.push(alphabet[(value % base) as usize]);
        value /= base;
    }
    out.iter().rev().collect()
}

fn roman(mut value: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (amount, numeral) in TABLE {
        while value >= amount {
            out.push_str(numeral);
            value -= amount;
        }
    }
    out
}

/// Marker text for the `ordinal`-th item.
///
/// Counter styles that cannot represent the value (zero or negative for
/// alphabetic, out of range for roman) fall back to decimal.
#[must_use]
pub fn marker(style: ListStyle, ordinal: i32) -> String {
    let positive = u32::try_from(ordinal).ok().filter(|&n| n > 0);
    match style {
        ListStyle::None => String::new(),
        ListStyle::Disc => "●".to_string(),
        ListStyle::Circle => "○".to_string(),
        ListStyle::Square => "■".to_string(),
        ListStyle::Decimal => format!("{ordinal}."),
        ListStyle::DecimalLeadingZero => {
            if (0..10).contains(&ordinal) {
                format!("0{ordinal}.")
            } else {
                format!("{ordinal}.")
            }
        }
        ListStyle::LowerAlpha | ListStyle::UpperAlpha | ListStyle::LowerGreek => {
            let Some(value) = positive else {
                return format!("{ordinal}.");
            };
            let latin: Vec<char> = ('a'..='z').collect();
            let text = match style {
                ListStyle::LowerGreek => alphabetic(value, &GREEK),
                ListStyle::UpperAlpha => alphabetic(value, &latin).to_uppercase(),
                _ => alphabetic(value, &latin),
            };
            format!("{text}.")
        }
        ListStyle::LowerRoman | ListStyle::UpperRoman => match positive.filter(|&n| n < 4000) {
            Some(value) if style == ListStyle::UpperRoman => format!("{}.", roman(value).to_uppercase()),
            Some(value) => format!("{}.", roman(value)),
            None => format!("{ordinal}."),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        assert_eq!(marker(ListStyle::Decimal, 3), "3.");
        assert_eq!(marker(ListStyle::DecimalLeadingZero, 7), "07.");
        assert_eq!(marker(ListStyle::LowerAlpha, 28), "ab.");
        assert_eq!(marker(ListStyle::UpperAlpha, 26), "Z.");
        assert_eq!(marker(ListStyle::LowerRoman, 14), "xiv.");
        assert_eq!(marker(ListStyle::UpperRoman, 1994), "MCMXCIV.");
        assert_eq!(marker(ListStyle::LowerGreek, 2), "β.");
    }

    #[test]
    fn test_out_of_range_falls_back_to_decimal() {
        assert_eq!(marker(ListStyle::LowerAlpha, 0), "0.");
        assert_eq!(marker(ListStyle::UpperRoman, -2), "-2.");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(ListStyle::parse("lower-latin"), ListStyle::LowerAlpha);
        assert_eq!(ListStyle::parse("decimal-leading-zero"), ListStyle::DecimalLeadingZero);
        assert_eq!(ListStyle::parse("klingon"), ListStyle::Disc);
        assert!(ListStyle::Square.is_bullet());
    }
}
