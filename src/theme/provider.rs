// Theme provider - the current theme choice and its persistence
//
// Startup precedence: persisted choice > configured default > "dark".
// Startup only reads the store; every switch is written through immediately.

use super::Theme;
use crate::storage::{LocalStore, THEME_KEY};

pub struct ThemeProvider {
    theme: Theme,
    store: LocalStore,
}

impl ThemeProvider {
    pub fn init(store: LocalStore, configured: &str) -> Self {
        let persisted = store.get(THEME_KEY).filter(|name| Theme::exists(name));
        let theme = Theme::by_name(persisted.as_deref().unwrap_or(configured));
        tracing::debug!("Theme initialized: {}", theme.key);
        Self { theme, store }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Key of the current theme
    pub fn current(&self) -> &str {
        &self.theme.key
    }

    /// Switch themes; unknown names resolve to the default theme
    ///
    /// Returns the key that is now active.
    pub fn switch(&mut self, name: &str) -> &str {
        self.theme = Theme::by_name(name);
        self.store.set(THEME_KEY, &self.theme.key);
        tracing::info!("Theme switched to {}", self.theme.key);
        &self.theme.key
    }

    /// Move to the next available theme, wrapping around
    pub fn cycle(&mut self) -> &str {
        let available = Theme::list_available();
        let next = available
            .iter()
            .position(|key| *key == self.theme.key)
            .map(|i| (i + 1) % available.len())
            .unwrap_or(0);
        let key = available
            .get(next)
            .cloned()
            .unwrap_or_else(|| self.theme.key.clone());
        self.switch(&key)
    }
}
