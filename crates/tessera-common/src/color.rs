//! Computed CSS color values.
//!
//! A computed style view reports colors as `rgb()` / `rgba()` functions; author
//! values that leak through (`#hex`, a handful of keywords) are accepted too.

use crate::units::parse_number;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity in `0.0..=1.0`.
    pub a: f32,
}

impl Rgba {
    /// Fully opaque color.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Whether the color paints nothing.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// `#RRGGBB`, or `#AARRGGBB` when not fully opaque.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_hex(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            let alpha = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
            format!("#{alpha:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        }
    }
}

const NAMED: &[(&str, Rgba)] = &[
    ("black", Rgba::opaque(0, 0, 0)),
    ("white", Rgba::opaque(255, 255, 255)),
    ("red", Rgba::opaque(255, 0, 0)),
    ("green", Rgba::opaque(0, 128, 0)),
    ("blue", Rgba::opaque(0, 0, 255)),
    ("yellow", Rgba::opaque(255, 255, 0)),
    ("gray", Rgba::opaque(128, 128, 128)),
    ("grey", Rgba::opaque(128, 128, 128)),
    ("silver", Rgba::opaque(192, 192, 192)),
    ("orange", Rgba::opaque(255, 165, 0)),
    ("purple", Rgba::opaque(128, 0, 128)),
];

/// Parse a computed color. Returns `None` for `transparent`-like keywords
/// that cannot be painted and for anything unrecognised.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_color(value: &str) -> Option<Rgba> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels: Vec<&str> = args
            .split([',', ' ', '/'])
            .filter(|part| !part.is_empty())
            .collect();
        if channels.len() < 3 {
            return None;
        }
        let channel = |text: &str| parse_number(text).clamp(0.0, 255.0).round() as u8;
        let alpha = channels.get(3).map_or(1.0, |text| {
            text.strip_suffix('%')
                .map_or_else(|| parse_number(text), |pct| parse_number(pct) / 100.0)
                .clamp(0.0, 1.0)
        });
        return Some(Rgba {
            r: channel(channels[0]),
            g: channel(channels[1]),
            b: channel(channels[2]),
            a: alpha,
        });
    }
    if value == "transparent" {
        return Some(Rgba { r: 0, g: 0, b: 0, a: 0.0 });
    }
    NAMED
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, color)| *color)
}

#[allow(clippy::cast_possible_truncation)]
fn parse_hex(hex: &str) -> Option<Rgba> {
    let expand = |c: char| c.to_digit(16).map(|d| (d * 17) as u8);
    let pair = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 | 4 => {
            let mut chars = hex.chars();
            let r = expand(chars.next()?)?;
            let g = expand(chars.next()?)?;
            let b = expand(chars.next()?)?;
            let a = chars.next().map_or(Some(255), expand)?;
            Some(Rgba { r, g, b, a: f32::from(a) / 255.0 })
        }
        6 | 8 => {
            let r = pair(hex.get(0..2)?)?;
            let g = pair(hex.get(2..4)?)?;
            let b = pair(hex.get(4..6)?)?;
            let a = hex.get(6..8).map_or(Some(255), pair)?;
            Some(Rgba { r, g, b, a: f32::from(a) / 255.0 })
        }
        _ => None,
    }
}

/// The name of an exact keyword match, used to give color resources readable names.
#[must_use]
pub fn color_name(color: &Rgba) -> Option<&'static str> {
    if color.a < 1.0 {
        return None;
    }
    NAMED
        .iter()
        .find(|(_, named)| named.r == color.r && named.g == color.g && named.b == color.b)
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb_functions() {
        assert_eq!(parse_color("rgb(255, 0, 0)"), Some(Rgba::opaque(255, 0, 0)));
        let translucent = parse_color("rgba(0, 0, 0, 0.5)").unwrap();
        assert_eq!(translucent.to_hex(), "#80000000");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_color("#fff"), Some(Rgba::opaque(255, 255, 255)));
        assert_eq!(parse_color("#00ff00").unwrap().to_hex(), "#00FF00");
        assert_eq!(parse_color("#zzz"), None);
    }

    #[test]
    fn test_transparent() {
        assert!(parse_color("rgba(0, 0, 0, 0)").unwrap().is_transparent());
        assert!(parse_color("transparent").unwrap().is_transparent());
    }
}
