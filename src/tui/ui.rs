// UI rendering - layout of the chat screen and its overlays
//
// ┌──────────────┬──────────────────────────────────┐
// │ Conversations│ Transcript                       │
// │              │                                  │
// │              ├──────────────────────────────────┤
// │              │ Composer                         │
// ├──────────────┴──────────────────────────────────┤
// │ status bar                                      │
// └─────────────────────────────────────────────────┘

use super::app::App;
use super::components::{scrollbar::render_scrollbar, status_bar};
use super::traits::{Component, RenderContext};
use crate::logging::{LogEntry, LogLevel};
use crate::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Sidebar width in columns
const SIDEBAR_WIDTH: u16 = 30;

/// Below this width the sidebar is hidden
const MIN_WIDTH_FOR_SIDEBAR: u16 = 70;

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let theme = app.themes.theme().clone();

    f.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let (sidebar, main) = if area.width >= MIN_WIDTH_FOR_SIDEBAR {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(rows[0]);
        (Some(columns[0]), columns[1])
    } else {
        (None, rows[0])
    };

    let main_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(main);

    {
        let ctx = RenderContext::new(&theme, app.focused, app.animation_frame(), &app.controller);
        if let Some(sidebar) = sidebar {
            app.conversation_list.render(f, sidebar, &ctx);
        }
        app.transcript.render(f, main_rows[0], &ctx);
        app.composer.render(f, main_rows[1], &ctx);
    }

    status_bar::render(f, rows[1], app);

    if app.show_logs {
        render_logs(f, app, &theme);
    }
    if app.show_help {
        render_help(f, &theme);
    }
    if let Some(toast) = &app.toast {
        toast.render(f, area, &theme);
    }
}

/// Center a `width` x `height` rect inside `area`
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn render_help(f: &mut Frame, theme: &Theme) {
    let key_style = Style::default().fg(theme.accent);
    let desc_style = Style::default().fg(theme.foreground);
    let header_style = Style::default()
        .fg(theme.accent_hover)
        .add_modifier(Modifier::BOLD);

    // "    key         description"
    let kb = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<14}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled("  Chat", header_style)),
        kb("Enter", "Send message"),
        kb("Ctrl+X", "Stop the reply"),
        kb("Ctrl+N", "New conversation"),
        kb("Ctrl+Y", "Copy last reply"),
        Line::raw(""),
        Line::from(Span::styled("  Conversations", header_style)),
        kb("↑/↓", "Select"),
        kb("Enter", "Open"),
        kb("d, Delete", "Delete"),
        kb("n", "New conversation"),
        kb("Ctrl+R", "Refresh list"),
        Line::raw(""),
        Line::from(Span::styled("  Transcript", header_style)),
        kb("↑/↓ PgUp/PgDn", "Scroll"),
        kb("Home/End", "Jump to start/end"),
        Line::raw(""),
        Line::from(Span::styled("  General", header_style)),
        kb("Tab/Shift+Tab", "Cycle focus"),
        kb("Ctrl+T", "Next theme"),
        kb("Ctrl+L", "Logs"),
        kb("F1", "Toggle this help"),
        kb("Ctrl+C, Ctrl+Q", "Quit"),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Theme: ", desc_style),
            Span::styled(theme.name.as_str(), key_style),
        ]),
    ]);

    let area = centered_rect(46, 30, f.area());
    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(content)
        .style(Style::default().bg(theme.surface))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent))
                .border_type(theme.border_type)
                .title(" Help ")
                .title_bottom(Line::from(" F1 or Esc to close ").centered()),
        );

    f.render_widget(paragraph, area);
}

fn render_logs(f: &mut Frame, app: &mut App, theme: &Theme) {
    let screen = f.area();
    let area = centered_rect(
        screen.width.saturating_sub(8),
        screen.height.saturating_sub(4),
        screen,
    );
    let viewport = area.height.saturating_sub(2) as usize;

    let entries = app.log_buffer.recent(usize::MAX);
    app.logs_scroll.update_dimensions(entries.len(), viewport);
    let (start, end) = app.logs_scroll.visible_range();

    let lines: Vec<Line> = entries[start..end]
        .iter()
        .map(|entry| {
            Line::from(Span::styled(
                format_log_entry(entry),
                log_level_style(entry.level, theme),
            ))
        })
        .collect();

    let title = if app.logs_scroll.auto_follow {
        format!(" Logs ({}) ", entries.len())
    } else {
        format!(" Logs ({}) [scroll] ", entries.len())
    };

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(theme.surface))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border_active))
                    .border_type(theme.border_type)
                    .title(title)
                    .title_bottom(Line::from(" Ctrl+L or Esc to close ").centered()),
            ),
        area,
    );
    render_scrollbar(f, area, &app.logs_scroll, theme);
}

fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "[{}] {:5} {}: {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        entry.target,
        entry.message
    )
}

fn log_level_style(level: LogLevel, theme: &Theme) -> Style {
    match level {
        LogLevel::Error => Style::default().fg(theme.danger),
        LogLevel::Warn => Style::default().fg(theme.danger_hover),
        LogLevel::Info => Style::default().fg(theme.foreground),
        LogLevel::Debug => Style::default().fg(theme.text_tertiary),
        LogLevel::Trace => Style::default().fg(theme.muted),
    }
}
