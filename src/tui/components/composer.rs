//! Composer - single-line prompt editor
//!
//! The cursor is a char index, so multi-byte input edits cleanly. Enter
//! submits a non-blank value and clears the line; a blank value is left as is.

use crate::tui::scroll::FocusablePanel;
use crate::tui::traits::{Component, Handled, Interactive, RenderContext};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub struct Composer {
    input: String,
    /// Cursor position in chars
    cursor: usize,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            cursor: 0,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
    }

    /// Insert pasted text; newlines become spaces on a single-line input
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\r' => {}
                '\n' | '\t' => self.insert_char(' '),
                c => self.insert_char(c),
            }
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.input.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let at = self.byte_index(self.cursor);
            self.input.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Take the input if it holds anything besides whitespace
    pub fn submit(&mut self) -> Option<String> {
        if self.input.trim().is_empty() {
            return None;
        }
        self.cursor = 0;
        Some(std::mem::take(&mut self.input))
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    /// Display width of the text left of the cursor
    fn cursor_width(&self) -> usize {
        self.input[..self.byte_index(self.cursor)].width()
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Composer {
    fn id(&self) -> FocusablePanel {
        FocusablePanel::Composer
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let focused = ctx.is_focused(self.id());
        let inner_width = area.width.saturating_sub(2) as usize;

        // Scroll horizontally so the cursor stays visible
        let cursor_x = self.cursor_width();
        let skip = cursor_x.saturating_sub(inner_width.saturating_sub(1));

        let line = if self.input.is_empty() {
            Line::from(Span::styled(
                "Type a message and press Enter",
                Style::default().fg(theme.muted),
            ))
        } else {
            Line::from(Span::styled(
                self.input.as_str(),
                Style::default().fg(theme.foreground),
            ))
        };

        let title = if ctx.controller.is_streaming() {
            " Message (replying, Ctrl+X to stop) "
        } else {
            " Message "
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.panel_border(focused)))
            .title(title)
            .style(Style::default().bg(theme.input));

        let paragraph = Paragraph::new(line)
            .block(block)
            .scroll((0, u16::try_from(skip).unwrap_or(u16::MAX)));
        f.render_widget(paragraph, area);

        if focused && area.width > 2 && area.height > 2 {
            let x = area.x + 1 + u16::try_from(cursor_x - skip).unwrap_or(0);
            f.set_cursor_position(Position::new(x, area.y + 1));
        }
    }
}

/// What the composer asks the App to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerAction {
    Submit(String),
}

impl Interactive for Composer {
    type Action = ComposerAction;

    fn handle_key(&mut self, key: KeyEvent) -> Handled<ComposerAction> {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return Handled::No;
        }

        match key.code {
            KeyCode::Enter => {
                return match self.submit() {
                    Some(text) => Handled::Action(ComposerAction::Submit(text)),
                    None => Handled::Yes,
                };
            }
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return Handled::No,
        }
        Handled::Yes
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("Enter send")
    }
}
