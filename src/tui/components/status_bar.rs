// Status bar component
//
// One line at the bottom: session state (with a spinner while a reply is
// live), the active conversation, the theme, and key hints for the focused
// panel.

use crate::chat::session::{CloseReason, SessionState};
use crate::tui::app::App;
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.themes.theme();
    let state = app.controller.session_state();

    let state_style = match state {
        SessionState::Opening | SessionState::Streaming => Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
        SessionState::Closed(CloseReason::Error) => Style::default().fg(theme.danger),
        _ => Style::default().fg(theme.text_tertiary),
    };
    let state_text = if state.is_live() {
        format!(" {} {} ", app.spinner_char(), state.label())
    } else {
        format!(" {} ", state.label())
    };

    let store = app.controller.conversations();
    let title = store.active_title().unwrap_or("new conversation");
    let loading = if app.controller.is_loading() {
        " │ loading…"
    } else {
        ""
    };

    let hint = app.focus_hint();
    let left_width = state_text.chars().count() + 40;
    let hint_width = (area.width as usize).saturating_sub(left_width);

    let line = Line::from(vec![
        Span::styled(state_text, state_style),
        Span::styled("│ ", Style::default().fg(theme.border)),
        Span::styled(
            truncate_to_width(title, 24),
            Style::default().fg(theme.foreground),
        ),
        Span::styled(loading, Style::default().fg(theme.text_tertiary)),
        Span::styled(
            format!(" │ {} ", theme.name),
            Style::default().fg(theme.text_secondary),
        ),
        Span::styled(
            truncate_to_width(&format!("│ {}  F1 help", hint), hint_width),
            Style::default().fg(theme.muted),
        ),
    ]);

    let status = Paragraph::new(line).style(Style::default().bg(theme.surface));
    f.render_widget(status, area);
}
