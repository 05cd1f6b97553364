use ratatui::style::Color;
use suggest_core::config::{NamedColor, ThemeColor, ThemeConfig};

pub struct Theme {
    pub accent: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight_fg: Color,
    pub emphasis: Color,
    pub error: Color,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            accent: to_ratatui_color(config.accent),
            muted: to_ratatui_color(config.muted),
            border: to_ratatui_color(config.border),
            highlight_fg: to_ratatui_color(config.highlight_fg),
            emphasis: to_ratatui_color(config.emphasis),
            error: to_ratatui_color(config.error),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

fn to_ratatui_color(color: ThemeColor) -> Color {
    match color {
        ThemeColor::Rgb(r, g, b) => Color::Rgb(r, g, b),
        ThemeColor::Named(named) => match named {
            NamedColor::Black => Color::Black,
            NamedColor::Red => Color::Red,
            NamedColor::Green => Color::Green,
            NamedColor::Yellow => Color::Yellow,
            NamedColor::Blue => Color::Blue,
            NamedColor::Magenta => Color::Magenta,
            NamedColor::Cyan => Color::Cyan,
            NamedColor::White => Color::White,
            NamedColor::Gray => Color::DarkGray,
        },
    }
}
