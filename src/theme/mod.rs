// Theme system for the TUI
//
// - TomlTheme: on-disk format with colors named by role
// - Theme: resolved theme with ratatui colors ready for use
// - ThemeProvider: the current choice, persisted in the local store
//
// Theme loading priority:
// 1. External TOML themes from ~/.config/chatline/themes/<key>.toml
// 2. Bundled themes (compiled in, extracted on first run)
// 3. Hardcoded dark fallback

mod bundled;
mod provider;
mod toml_format;

pub use provider::ThemeProvider;
pub use toml_format::TomlTheme;

use crate::config::{Config, DEFAULT_THEME};
use ratatui::style::Color;
use ratatui::widgets::BorderType;
use std::path::PathBuf;

/// Complete resolved theme ready for use in the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Lookup key ("dark", "light", "ocean")
    pub key: String,
    /// Display name from the theme file
    pub name: String,

    // ─── Surfaces ────────────────────────────────────────────
    pub background: Color,
    pub surface: Color,
    pub sidebar: Color,
    pub message_user: Color,
    pub message_bot: Color,
    pub hover: Color,
    pub input: Color,

    // ─── Text ────────────────────────────────────────────────
    pub foreground: Color,
    pub text_secondary: Color,
    pub text_tertiary: Color,
    pub muted: Color,

    // ─── Borders ─────────────────────────────────────────────
    pub border: Color,
    pub border_secondary: Color,
    pub border_active: Color,
    pub border_type: BorderType,

    // ─── Accents ─────────────────────────────────────────────
    pub accent: Color,
    pub accent_hover: Color,
    pub danger: Color,
    pub danger_hover: Color,
}

impl Theme {
    /// Map user input to a theme key; `branded` is the old name of `ocean`
    pub fn normalize_key(name: &str) -> String {
        let key = name.trim().to_lowercase().replace(' ', "_");
        match key.as_str() {
            "branded" => "ocean".to_string(),
            _ => key,
        }
    }

    /// Whether a theme with this name can be loaded (bundled or external)
    pub fn exists(name: &str) -> bool {
        Self::load_toml(&Self::normalize_key(name)).is_some()
    }

    /// Load theme by name; unknown names fall back to the default theme
    pub fn by_name(name: &str) -> Self {
        let key = Self::normalize_key(name);
        if let Some(theme) = Self::load_toml(&key) {
            return theme;
        }

        if key != DEFAULT_THEME {
            tracing::debug!("Unknown theme '{}', falling back to {}", name, DEFAULT_THEME);
            if let Some(theme) = Self::load_toml(DEFAULT_THEME) {
                return theme;
            }
        }

        Self::hardcoded_default()
    }

    /// Load from external TOML file or bundled theme
    fn load_toml(key: &str) -> Option<Self> {
        if let Some(themes_dir) = Self::themes_dir() {
            let path = themes_dir.join(format!("{}.toml", key));
            if path.exists() {
                match std::fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|c| TomlTheme::parse(&c).map_err(|e| e.to_string()))
                {
                    Ok(toml_theme) => return Some(Self::from_toml(key, toml_theme)),
                    Err(e) => tracing::warn!("Ignoring broken theme file {:?}: {}", path, e),
                }
            }
        }

        let bundled = bundled::find(key)?;
        TomlTheme::parse(bundled.content)
            .ok()
            .map(|toml_theme| Self::from_toml(key, toml_theme))
    }

    /// Get themes directory path
    fn themes_dir() -> Option<PathBuf> {
        Config::config_dir().map(|p| p.join("themes"))
    }

    /// Parse border type string to BorderType enum
    fn parse_border_type(value: Option<&str>) -> BorderType {
        match value {
            Some("rounded") => BorderType::Rounded,
            Some("double") => BorderType::Double,
            Some("thick") => BorderType::Thick,
            _ => BorderType::Plain,
        }
    }

    /// Create theme from native TOML format
    fn from_toml(key: &str, toml: TomlTheme) -> Self {
        let parse = TomlTheme::parse_color;

        Self {
            key: key.to_string(),
            name: toml.meta.name.clone(),

            background: parse(&toml.background.primary),
            surface: parse(&toml.background.secondary),
            sidebar: parse(&toml.background.sidebar),
            message_user: parse(&toml.background.message_user),
            message_bot: parse(&toml.background.message_bot),
            hover: parse(&toml.background.hover),
            input: parse(&toml.background.input),

            foreground: parse(&toml.text.primary),
            text_secondary: parse(&toml.text.secondary),
            text_tertiary: parse(&toml.text.tertiary),
            muted: parse(&toml.text.muted),

            border: parse(&toml.border.primary),
            border_secondary: parse(&toml.border.secondary),
            border_active: parse(&toml.border.active),
            border_type: Self::parse_border_type(toml.ui.border_type.as_deref()),

            accent: parse(&toml.accent.primary),
            accent_hover: parse(&toml.accent.hover),
            danger: parse(&toml.accent.danger),
            danger_hover: parse(&toml.accent.danger_hover),
        }
    }

    /// Hardcoded fallback when no themes can be loaded
    fn hardcoded_default() -> Self {
        Self {
            key: DEFAULT_THEME.to_string(),
            name: "Dark (Fallback)".to_string(),

            background: Color::Rgb(15, 15, 15),
            surface: Color::Rgb(26, 26, 26),
            sidebar: Color::Rgb(10, 10, 10),
            message_user: Color::Rgb(45, 91, 255),
            message_bot: Color::Rgb(37, 37, 37),
            hover: Color::Rgb(42, 42, 42),
            input: Color::Rgb(31, 31, 31),

            foreground: Color::Rgb(255, 255, 255),
            text_secondary: Color::Rgb(176, 176, 176),
            text_tertiary: Color::Rgb(128, 128, 128),
            muted: Color::Rgb(96, 96, 96),

            border: Color::Rgb(42, 42, 42),
            border_secondary: Color::Rgb(31, 31, 31),
            border_active: Color::Rgb(61, 61, 61),
            border_type: BorderType::Plain,

            accent: Color::Rgb(45, 91, 255),
            accent_hover: Color::Rgb(65, 105, 255),
            danger: Color::Rgb(255, 68, 68),
            danger_hover: Color::Rgb(255, 102, 102),
        }
    }

    /// Border color for a panel based on focus state
    pub fn panel_border(&self, focused: bool) -> Color {
        if focused {
            self.accent
        } else {
            self.border_active
        }
    }

    /// List all available theme keys (bundled first, then external)
    pub fn list_available() -> Vec<String> {
        let mut themes: Vec<String> = bundled::list_bundled_themes()
            .into_iter()
            .map(str::to_string)
            .collect();

        if let Some(themes_dir) = Self::themes_dir() {
            if let Ok(entries) = std::fs::read_dir(themes_dir) {
                let mut external: Vec<String> = entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
                    .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().to_string()))
                    .filter(|key| !themes.contains(key))
                    .collect();
                external.sort();
                themes.extend(external);
            }
        }

        themes
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::by_name(DEFAULT_THEME)
    }
}

/// Extract bundled themes to the config directory on first run
pub fn ensure_themes_extracted() {
    let Some(themes_dir) = Theme::themes_dir() else {
        return;
    };

    if std::fs::create_dir_all(&themes_dir).is_err() {
        return;
    }

    // Marker file: extract once, then leave the directory to the user
    let marker = themes_dir.join(".extracted_v1");
    if marker.exists() {
        return;
    }

    for theme in bundled::BUNDLED_THEMES {
        let path = themes_dir.join(theme.filename());
        // Don't overwrite user modifications
        if !path.exists() {
            let _ = std::fs::write(&path, theme.content);
        }
    }

    let _ = std::fs::write(&marker, "1");
}
