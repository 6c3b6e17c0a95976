// TOML theme format parser
//
// This is the native theme format for chatline. Each theme names its colors
// by role (background, text, border, accent) rather than by palette slot.
//
// Format version: 1

use ratatui::style::Color;
use serde::Deserialize;

/// Root structure for TOML theme files
#[derive(Debug, Clone, Deserialize)]
pub struct TomlTheme {
    pub meta: ThemeMeta,
    pub background: BackgroundColors,
    pub text: TextColors,
    pub border: BorderColors,
    pub accent: AccentColors,
    /// Optional chrome settings
    #[serde(default)]
    pub ui: UiOptions,
}

/// Theme metadata
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeMeta {
    pub name: String,
}

/// Surfaces
#[derive(Debug, Clone, Deserialize)]
pub struct BackgroundColors {
    pub primary: String,
    pub secondary: String,
    pub sidebar: String,
    pub message_user: String,
    pub message_bot: String,
    pub hover: String,
    pub input: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextColors {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
    pub muted: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BorderColors {
    pub primary: String,
    pub secondary: String,
    pub active: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccentColors {
    pub primary: String,
    pub hover: String,
    pub danger: String,
    pub danger_hover: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiOptions {
    /// Border style: "plain", "rounded", "double", "thick" (default: plain)
    pub border_type: Option<String>,
}

impl TomlTheme {
    /// Parse a TOML theme from string
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Parse a color string to ratatui Color
    /// Supports:
    /// - Hex format: #RRGGBB
    /// - ANSI format: ansi:0-15, ansi:fg, ansi:bg (for terminal-native colors)
    pub fn parse_color(value: &str) -> Color {
        if let Some(ansi) = value.strip_prefix("ansi:") {
            return match ansi {
                "0" => Color::Black,
                "1" => Color::Red,
                "2" => Color::Green,
                "3" => Color::Yellow,
                "4" => Color::Blue,
                "5" => Color::Magenta,
                "6" => Color::Cyan,
                "7" => Color::White,
                "8" => Color::DarkGray,
                "9" => Color::LightRed,
                "10" => Color::LightGreen,
                "11" => Color::LightYellow,
                "12" => Color::LightBlue,
                "13" => Color::LightMagenta,
                "14" => Color::LightCyan,
                "15" => Color::Gray,
                "fg" | "bg" => Color::Reset,
                _ => Color::White,
            };
        }

        let hex = value.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Color::White;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);
        Color::Rgb(r, g, b)
    }
}
