//! Bundled TOML themes (compiled into binary, extracted on first run)
//!
//! These themes are written to ~/.config/chatline/themes/ on first run.
//! Users can then modify them freely; an edited file wins over the bundled
//! copy with the same key.

mod dark;
mod light;
mod ocean;

/// Bundled theme: lookup key and TOML content
pub struct BundledTheme {
    pub key: &'static str,
    pub content: &'static str,
}

impl BundledTheme {
    pub fn filename(&self) -> String {
        format!("{}.toml", self.key)
    }
}

/// All bundled themes, in cycling order
pub const BUNDLED_THEMES: &[BundledTheme] = &[
    BundledTheme {
        key: "dark",
        content: dark::THEME,
    },
    BundledTheme {
        key: "light",
        content: light::THEME,
    },
    BundledTheme {
        key: "ocean",
        content: ocean::THEME,
    },
];

pub fn find(key: &str) -> Option<&'static BundledTheme> {
    BUNDLED_THEMES.iter().find(|t| t.key == key)
}

/// Keys of the bundled themes
pub fn list_bundled_themes() -> Vec<&'static str> {
    BUNDLED_THEMES.iter().map(|t| t.key).collect()
}
