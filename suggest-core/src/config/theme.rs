use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
}

const NAMED: &[(&str, NamedColor)] = &[
    ("black", NamedColor::Black),
    ("blue", NamedColor::Blue),
    ("cyan", NamedColor::Cyan),
    ("gray", NamedColor::Gray),
    ("grey", NamedColor::Gray),
    ("green", NamedColor::Green),
    ("magenta", NamedColor::Magenta),
    ("red", NamedColor::Red),
    ("white", NamedColor::White),
    ("yellow", NamedColor::Yellow),
];

impl NamedColor {
    pub fn as_str(self) -> &'static str {
        NAMED
            .iter()
            .find(|(_, color)| *color == self)
            .map_or("white", |(name, _)| name)
    }
}

/// A terminal color: one of the basic named colors or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeColor {
    Named(NamedColor),
    Rgb(u8, u8, u8),
}

impl ThemeColor {
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Self::Rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        let lower = s.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, color)| Self::Named(*color))
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(color) => f.write_str(color.as_str()),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl Serialize for ThemeColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ThemeColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid color '{s}': expected a named color or hex (#rrggbb)"
            ))
        })
    }
}

/// Picker colors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Prompt and selected-row marker (default: "cyan")
    pub accent: ThemeColor,
    /// Secondary text such as types and domains (default: "gray")
    pub muted: ThemeColor,
    pub border: ThemeColor,
    /// Foreground of the highlighted row (default: "white")
    pub highlight_fg: ThemeColor,
    /// Part of a label matching the typed text (default: "yellow")
    pub emphasis: ThemeColor,
    /// Timeout content and errors (default: "red")
    pub error: ThemeColor,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent: ThemeColor::Named(NamedColor::Cyan),
            muted: ThemeColor::Named(NamedColor::Gray),
            border: ThemeColor::Named(NamedColor::Gray),
            highlight_fg: ThemeColor::Named(NamedColor::White),
            emphasis: ThemeColor::Named(NamedColor::Yellow),
            error: ThemeColor::Named(NamedColor::Red),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex() {
        assert_eq!(
            ThemeColor::parse("Magenta"),
            Some(ThemeColor::Named(NamedColor::Magenta))
        );
        assert_eq!(
            ThemeColor::parse("grey"),
            Some(ThemeColor::Named(NamedColor::Gray))
        );
        assert_eq!(ThemeColor::parse("#0a0B0c"), Some(ThemeColor::Rgb(10, 11, 12)));
        assert_eq!(ThemeColor::parse("#abc"), None);
        assert_eq!(ThemeColor::parse("#gggggg"), None);
        assert_eq!(ThemeColor::parse("mauve"), None);
    }

    #[test]
    fn displays_canonical_form() {
        assert_eq!(ThemeColor::Named(NamedColor::Gray).to_string(), "gray");
        assert_eq!(ThemeColor::Rgb(255, 0, 16).to_string(), "#ff0010");
    }
}
