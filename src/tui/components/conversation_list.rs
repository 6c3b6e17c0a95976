//! Conversation list (sidebar)
//!
//! Shows the conversation summaries with the active one marked. The
//! selection is view state only: moving it does not load anything until
//! Enter is pressed.

use super::scrollbar::render_scrollbar;
use crate::chat::models::ConversationSummary;
use crate::tui::scroll::{FocusablePanel, ScrollState};
use crate::tui::traits::{Component, Handled, Interactive, RenderContext, Scrollable};
use crate::util::truncate_to_width;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// What the list asks the App to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Load(String),
    Delete(String),
    New,
}

pub struct ConversationList {
    scroll: ScrollState,
    selected: usize,
    /// Ids in display order, synced from the store on every render
    ids: Vec<String>,
}

impl ConversationList {
    pub fn new() -> Self {
        Self {
            scroll: ScrollState::manual(),
            selected: 0,
            ids: Vec::new(),
        }
    }

    /// Take the current summaries, keeping the selection in range
    pub fn sync(&mut self, summaries: &[ConversationSummary]) {
        self.ids = summaries.iter().map(|s| s.id.clone()).collect();
        self.selected = self.selected.min(self.ids.len().saturating_sub(1));
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.ids.get(self.selected).map(String::as_str)
    }

    fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.scroll.reveal(self.selected);
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.ids.len() {
            self.selected += 1;
        }
        self.scroll.reveal(self.selected);
    }
}

impl Default for ConversationList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ConversationList {
    fn id(&self) -> FocusablePanel {
        FocusablePanel::Conversations
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let focused = ctx.is_focused(self.id());
        let store = ctx.controller.conversations();
        self.sync(store.summaries());

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.panel_border(focused)))
            .title(" Conversations ")
            .style(Style::default().bg(theme.sidebar));

        if self.ids.is_empty() {
            let hint = Paragraph::new(Line::from(Span::styled(
                " No conversations yet",
                Style::default().fg(theme.muted),
            )))
            .block(block);
            f.render_widget(hint, area);
            return;
        }

        let viewport = area.height.saturating_sub(2) as usize;
        let width = area.width.saturating_sub(4) as usize;
        self.scroll.update_dimensions(self.ids.len(), viewport);
        self.scroll.reveal(self.selected);
        let (start, end) = self.scroll.visible_range();

        let active = store.active_id();
        let items: Vec<ListItem> = store.summaries()[start..end]
            .iter()
            .enumerate()
            .map(|(i, summary)| {
                let is_active = active == Some(summary.id.as_str());
                let marker = if is_active { "● " } else { "  " };
                let title = if summary.title.is_empty() {
                    "(untitled)"
                } else {
                    summary.title.as_str()
                };

                let mut style = Style::default().fg(if is_active {
                    theme.foreground
                } else {
                    theme.text_secondary
                });
                if is_active {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if focused && start + i == self.selected {
                    style = style.bg(theme.hover);
                }

                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(theme.accent)),
                    Span::styled(truncate_to_width(title, width.saturating_sub(2)), style),
                ]))
            })
            .collect();

        f.render_widget(List::new(items).block(block), area);
        render_scrollbar(f, area, &self.scroll, theme);
    }
}

impl Scrollable for ConversationList {
    fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    fn scroll_state_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }
}

impl Interactive for ConversationList {
    type Action = ListAction;

    fn handle_key(&mut self, key: KeyEvent) -> Handled<ListAction> {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return Handled::No;
        }

        match key.code {
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Home => {
                self.selected = 0;
                self.scroll.reveal(0);
            }
            KeyCode::End => {
                self.selected = self.ids.len().saturating_sub(1);
                self.scroll.reveal(self.selected);
            }
            KeyCode::Enter => {
                return match self.selected_id() {
                    Some(id) => Handled::Action(ListAction::Load(id.to_string())),
                    None => Handled::Yes,
                };
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                return match self.selected_id() {
                    Some(id) => Handled::Action(ListAction::Delete(id.to_string())),
                    None => Handled::Yes,
                };
            }
            KeyCode::Char('n') => return Handled::Action(ListAction::New),
            _ => return Handled::No,
        }
        Handled::Yes
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("↑↓ select  Enter open  d delete  n new")
    }
}
