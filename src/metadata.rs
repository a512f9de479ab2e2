// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Parsing of loosely formatted spreadsheet fields: numbers, colors and
//! opacities.
//!
//! Every parser here is lenient: malformed input yields `None` or the supplied
//! fallback, never an error.

use nom::{
    bytes::complete::take_while_m_n,
    character::complete::char,
    combinator::all_consuming,
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

/// Non-premultiplied 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const INDIAN_RED: Color = Color::rgb(0xCD, 0x5C, 0x5C);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_color(&value).ok_or_else(|| format!("invalid color \"{value}\""))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", c.a, c.r, c.g, c.b)
    }
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0x00, 0x00, 0x00)),
    ("blue", Color::rgb(0x00, 0x00, 0xFF)),
    ("crimson", Color::rgb(0xDC, 0x14, 0x3C)),
    ("cyan", Color::rgb(0x00, 0xFF, 0xFF)),
    ("darkorange", Color::rgb(0xFF, 0x8C, 0x00)),
    ("deepskyblue", Color::rgb(0x00, 0xBF, 0xFF)),
    ("dodgerblue", Color::rgb(0x1E, 0x90, 0xFF)),
    ("gold", Color::rgb(0xFF, 0xD7, 0x00)),
    ("gray", Color::rgb(0x80, 0x80, 0x80)),
    ("green", Color::rgb(0x00, 0x80, 0x00)),
    ("hotpink", Color::rgb(0xFF, 0x69, 0xB4)),
    ("indianred", Color::INDIAN_RED),
    ("lime", Color::rgb(0x00, 0xFF, 0x00)),
    ("limegreen", Color::rgb(0x32, 0xCD, 0x32)),
    ("magenta", Color::rgb(0xFF, 0x00, 0xFF)),
    ("orange", Color::rgb(0xFF, 0xA5, 0x00)),
    ("orangered", Color::rgb(0xFF, 0x45, 0x00)),
    ("purple", Color::rgb(0x80, 0x00, 0x80)),
    ("red", Color::rgb(0xFF, 0x00, 0x00)),
    ("tomato", Color::rgb(0xFF, 0x63, 0x47)),
    ("transparent", Color::rgba(0xFF, 0xFF, 0xFF, 0x00)),
    ("white", Color::rgb(0xFF, 0xFF, 0xFF)),
    ("yellow", Color::rgb(0xFF, 0xFF, 0x00)),
];

fn hex_body(input: &str) -> IResult<&str, &str> {
    preceded(
        char('#'),
        take_while_m_n(3, 8, |c: char| c.is_ascii_hexdigit()),
    )
    .parse(input)
}

fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn expand(digits: &[u8]) -> Vec<u8> {
    digits.iter().map(|&d| nibble(d) * 17).collect()
}

fn pairs(digits: &[u8]) -> Vec<u8> {
    digits
        .chunks(2)
        .map(|p| nibble(p[0]) * 16 + nibble(p[1]))
        .collect()
}

/// Parses `#RGB`, `#ARGB`, `#RRGGBB`, `#AARRGGBB` or a known color name.
/// Alpha comes first in the four- and eight-digit forms.
pub fn parse_color(text: &str) -> Option<Color> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok((_, digits)) = all_consuming(hex_body).parse(text) {
        let digits = digits.as_bytes();
        let channels = match digits.len() {
            3 | 4 => expand(digits),
            6 | 8 => pairs(digits),
            _ => return None,
        };
        return Some(match channels.as_slice() {
            [r, g, b] => Color::rgb(*r, *g, *b),
            [a, r, g, b] => Color::rgba(*r, *g, *b, *a),
            _ => return None,
        });
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(text))
        .map(|(_, color)| *color)
}

pub fn parse_color_or(text: &str, fallback: Color) -> Color {
    parse_color(text).unwrap_or(fallback)
}

/// Parses a decimal number the same way regardless of the system locale.
/// Non-finite values are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    match all_consuming(double::<&str, nom::error::Error<&str>>).parse(text) {
        Ok((_, value)) if value.is_finite() => Some(value),
        _ => None,
    }
}

/// Parses an opacity given either as a 0-1 fraction or as a 0-100 percentage.
/// Values above 1 are read as percentages; the result is clamped to `[0, 1]`.
pub fn parse_opacity_or(text: &str, fallback: f64) -> f64 {
    let Some(mut value) = parse_number(text) else {
        return fallback;
    };

    if value > 1.0 {
        value /= 100.0;
    }

    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#F00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("#8F00"), Some(Color::rgba(255, 0, 0, 0x88)));
        assert_eq!(parse_color("#00ff7f"), Some(Color::rgb(0, 255, 127)));
        assert_eq!(
            parse_color("#80102030"),
            Some(Color::rgba(0x10, 0x20, 0x30, 0x80))
        );
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#GGGGGG"), None);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse_color(" IndianRed "), Some(Color::INDIAN_RED));
        assert_eq!(parse_color("not-a-color"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("1e2"), Some(100.0));
        assert_eq!(parse_number("1,5"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_color_string_round_trip() {
        let text: String = Color::INDIAN_RED.into();
        assert_eq!(text, "#FFCD5C5C");
        assert_eq!(Color::try_from(text), Ok(Color::INDIAN_RED));
    }
}
