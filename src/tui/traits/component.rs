//! Core component trait
//!
//! Every panel that can be rendered implements `Component`.

use crate::chat::Controller;
use crate::theme::Theme;
use crate::tui::scroll::FocusablePanel;
use ratatui::{layout::Rect, Frame};

/// Immutable context passed to components during rendering
///
/// Components read conversation state through the controller but cannot
/// change it while drawing.
pub struct RenderContext<'a> {
    pub theme: &'a Theme,

    /// Which panel currently has focus
    pub focus: FocusablePanel,

    /// Animation frame counter (for the streaming spinner)
    pub animation_frame: usize,

    pub controller: &'a Controller,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        theme: &'a Theme,
        focus: FocusablePanel,
        animation_frame: usize,
        controller: &'a Controller,
    ) -> Self {
        Self {
            theme,
            focus,
            animation_frame,
            controller,
        }
    }

    pub fn is_focused(&self, id: FocusablePanel) -> bool {
        self.focus == id
    }

    /// Spinner character for the current animation frame
    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
        SPINNER[self.animation_frame % SPINNER.len()]
    }

    /// Animated dots for the waiting indicator
    pub fn thinking_dots(&self) -> &'static str {
        const DOTS: [&str; 4] = ["", ".", "..", "..."];
        DOTS[self.animation_frame % DOTS.len()]
    }
}

/// Base trait for all panels
///
/// `render` takes `&mut self` because panels size their scroll state from
/// the area they are given.
pub trait Component {
    fn id(&self) -> FocusablePanel;

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext);
}
