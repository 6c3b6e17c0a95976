//! Interactive trait for components that handle keyboard input
//!
//! The App routes a key to the focused panel after its global keys. A panel
//! either consumes the key, lets it bubble up, or turns it into an action the
//! App applies to the controller (load this conversation, send this prompt).

use super::{Component, Scrollable};
use crossterm::event::{KeyCode, KeyEvent};

/// Result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled<A> {
    /// Consumed, nothing more to do
    Yes,
    /// Not handled, bubble up
    No,
    /// Consumed, and the App should perform this action
    Action(A),
}

/// Trait for components that handle keyboard input
///
/// ```text
/// KeyEvent
///    │
///    ▼
/// App (global keys: Ctrl+C, Tab, Ctrl+T, F1, ...)
///    │ if not handled
///    ▼
/// Focused panel (Interactive::handle_key)
///    │ Yes / No / Action(a)
///    ▼
/// App applies the action to the controller
/// ```
pub trait Interactive: Component {
    /// What this panel can ask the App to do
    type Action;

    fn handle_key(&mut self, key: KeyEvent) -> Handled<Self::Action>;

    /// Keybind hints for the status bar while focused
    fn focus_hint(&self) -> Option<&'static str> {
        None
    }
}

/// Shared scroll key handling for panels that are Interactive and Scrollable
pub trait ScrollableInteractive: Interactive + Scrollable {
    /// Up, Down, Home, End, PageUp, PageDown
    fn handle_scroll_keys(&mut self, key: KeyEvent) -> Handled<Self::Action> {
        match key.code {
            KeyCode::Up => self.scroll_up(),
            KeyCode::Down => self.scroll_down(),
            KeyCode::Home => self.scroll_to_top(),
            KeyCode::End => self.scroll_to_bottom(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::PageDown => self.page_down(),
            _ => return Handled::No,
        }
        Handled::Yes
    }
}

// Anything that implements both traits gets this for free
impl<T: Interactive + Scrollable> ScrollableInteractive for T {}
