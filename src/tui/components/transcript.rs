//! Transcript panel - the open conversation
//!
//! Each message renders as a header ("You" / "AI Assistant" plus the clock
//! time when known) followed by its word-wrapped text. While a reply is
//! connecting, a spinner stands in for the bot message.

use super::scrollbar::render_scrollbar;
use crate::chat::models::{Message, Role};
use crate::theme::Theme;
use crate::tui::scroll::{FocusablePanel, ScrollState};
use crate::tui::traits::{
    Component, Handled, Interactive, RenderContext, Scrollable, ScrollableInteractive,
};
use crate::util::wrap_text;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct TranscriptPanel {
    scroll: ScrollState,
}

impl TranscriptPanel {
    pub fn new() -> Self {
        Self {
            scroll: ScrollState::new(),
        }
    }

    /// Follow the newest message again (after switching conversations)
    pub fn follow(&mut self) {
        self.scroll.scroll_to_bottom();
    }
}

impl Default for TranscriptPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Header plus wrapped body for one message
fn message_lines(message: &Message, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let (bar_color, name_color) = match message.role {
        Role::User => (theme.message_user, theme.accent),
        Role::Bot => (theme.message_bot, theme.text_secondary),
    };
    let bar = Span::styled("▎ ", Style::default().fg(bar_color));

    let mut header = vec![
        bar.clone(),
        Span::styled(
            message.role.display_name(),
            Style::default().fg(name_color).add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(clock) = message.clock_label() {
        header.push(Span::styled(
            format!("  {}", clock),
            Style::default().fg(theme.muted),
        ));
    }

    let mut lines = vec![Line::from(header)];
    let body_style = Style::default().fg(theme.foreground);
    for text in wrap_text(&message.text, width.saturating_sub(2)) {
        lines.push(Line::from(vec![bar.clone(), Span::styled(text, body_style)]));
    }
    lines.push(Line::raw(""));
    lines
}

fn pending_reply_lines(ctx: &RenderContext) -> Vec<Line<'static>> {
    let theme = ctx.theme;
    let bar = Span::styled("▎ ", Style::default().fg(theme.message_bot));
    vec![
        Line::from(vec![
            bar.clone(),
            Span::styled(
                Role::Bot.display_name(),
                Style::default()
                    .fg(theme.text_secondary)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            bar,
            Span::styled(
                format!("{} thinking{}", ctx.spinner_char(), ctx.thinking_dots()),
                Style::default().fg(theme.text_tertiary),
            ),
        ]),
    ]
}

impl Component for TranscriptPanel {
    fn id(&self) -> FocusablePanel {
        FocusablePanel::Transcript
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let focused = ctx.is_focused(self.id());
        let store = ctx.controller.conversations();

        // Borders take two columns, the scrollbar one more
        let width = area.width.saturating_sub(3) as usize;
        let viewport = area.height.saturating_sub(2) as usize;

        let mut lines: Vec<Line> = store
            .transcript()
            .messages()
            .iter()
            .flat_map(|message| message_lines(message, width, theme))
            .collect();

        let waiting = ctx
            .controller
            .session()
            .is_some_and(|s| s.is_live() && s.fragments() == 0);
        if waiting {
            lines.extend(pending_reply_lines(ctx));
        }

        self.scroll.update_dimensions(lines.len(), viewport);
        let (start, end) = self.scroll.visible_range();
        let visible: Vec<Line> = lines.drain(start..end).collect();

        let name = store.active_title().unwrap_or("New conversation");
        let title = if self.is_following() {
            format!(" {} ", name)
        } else {
            format!(" {} [scroll] ", name)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.panel_border(focused)))
            .title(title)
            .style(Style::default().bg(theme.background));

        f.render_widget(Paragraph::new(visible).block(block), area);
        render_scrollbar(f, area, &self.scroll, theme);
    }
}

impl Scrollable for TranscriptPanel {
    fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    fn scroll_state_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }
}

impl Interactive for TranscriptPanel {
    type Action = ();

    fn handle_key(&mut self, key: KeyEvent) -> Handled<()> {
        self.handle_scroll_keys(key)
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("↑↓ PgUp PgDn Home End scroll")
    }
}
