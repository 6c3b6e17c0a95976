// TUI application state
//
// App owns the controller and the panels. Keys go to global handlers first,
// then to the focused panel; panel actions become controller intents. The
// event loop drains the controller's commands into the runtime after every
// update and calls `apply_notifications` for focus requests and toasts.

use super::clipboard;
use super::components::{
    Composer, ComposerAction, ConversationList, ListAction, Toast, TranscriptPanel,
};
use super::scroll::{FocusablePanel, ScrollState};
use super::traits::{Handled, Interactive, Scrollable};
use crate::chat::{Controller, Notification};
use crate::logging::LogBuffer;
use crate::theme::ThemeProvider;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Main application state for the TUI
pub struct App {
    pub controller: Controller,

    pub themes: ThemeProvider,

    /// Panel receiving keyboard input
    pub focused: FocusablePanel,

    pub conversation_list: ConversationList,
    pub transcript: TranscriptPanel,
    pub composer: Composer,

    /// Active toast, cleared on tick once expired
    pub toast: Option<Toast>,

    pub show_help: bool,
    pub show_logs: bool,

    /// Captured logs for the log overlay
    pub log_buffer: LogBuffer,
    pub logs_scroll: ScrollState,

    pub should_quit: bool,

    /// Animation frame counter for spinners
    animation_frame: usize,
}

impl App {
    pub fn new(controller: Controller, themes: ThemeProvider, log_buffer: LogBuffer) -> Self {
        Self {
            controller,
            themes,
            focused: FocusablePanel::default(),
            conversation_list: ConversationList::new(),
            transcript: TranscriptPanel::new(),
            composer: Composer::new(),
            toast: None,
            show_help: false,
            show_logs: false,
            log_buffer,
            logs_scroll: ScrollState::new(),
            should_quit: false,
            animation_frame: 0,
        }
    }

    /// Advance animations and drop an expired toast
    pub fn tick_animation(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn animation_frame(&self) -> usize {
        self.animation_frame
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
        SPINNER[self.animation_frame % SPINNER.len()]
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.prev();
    }

    /// Key hints for the focused panel
    pub fn focus_hint(&self) -> &'static str {
        let hint = match self.focused {
            FocusablePanel::Conversations => self.conversation_list.focus_hint(),
            FocusablePanel::Transcript => self.transcript.focus_hint(),
            FocusablePanel::Composer => self.composer.focus_hint(),
        };
        hint.unwrap_or("")
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::info(message));
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::error(message));
    }

    /// Act on what the controller asked for since the last call
    pub fn apply_notifications(&mut self) {
        for notification in self.controller.take_notifications() {
            match notification {
                Notification::FocusComposer => {
                    self.focused = FocusablePanel::Composer;
                    self.transcript.follow();
                }
                Notification::Info(message) => self.show_toast(message),
                Notification::Error(message) => self.show_error(message),
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// Layered dispatch: overlays, then global keys, then the focused panel
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        if self.handle_overlay_key(key) || self.handle_global_key(key) {
            return;
        }

        self.dispatch_to_focused(key);
    }

    /// Pasted text goes to the composer
    pub fn handle_paste(&mut self, text: &str) {
        self.focused = FocusablePanel::Composer;
        self.composer.insert_str(text);
    }

    /// Mouse wheel scrolls the transcript
    pub fn scroll_transcript(&mut self, up: bool) {
        if up {
            self.transcript.scroll_up();
        } else {
            self.transcript.scroll_down();
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> bool {
        if !self.show_help && !self.show_logs {
            return false;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Char('l') if ctrl => self.show_logs = !self.show_logs,
            KeyCode::Esc => {
                self.show_help = false;
                self.show_logs = false;
            }
            KeyCode::F(1) => self.show_help = !self.show_help,
            _ if self.show_logs && !self.show_help => self.handle_logs_key(key),
            _ => {}
        }
        // Overlays absorb everything else
        true
    }

    fn handle_logs_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.logs_scroll.scroll_up(),
            KeyCode::Down => self.logs_scroll.scroll_down(),
            KeyCode::PageUp => self.logs_scroll.page_up(),
            KeyCode::PageDown => self.logs_scroll.page_down(),
            KeyCode::Home => self.logs_scroll.scroll_to_top(),
            KeyCode::End => self.logs_scroll.scroll_to_bottom(),
            _ => {}
        }
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Char('t') if ctrl => {
                let key = self.themes.cycle().to_string();
                self.show_toast(format!("Theme: {}", key));
            }
            KeyCode::Char('n') if ctrl => self.controller.new_conversation(),
            KeyCode::Char('r') if ctrl => {
                self.controller.list_conversations();
                self.show_toast("Refreshing conversations");
            }
            KeyCode::Char('x') if ctrl => {
                if self.controller.close_session() {
                    self.show_toast("Reply stopped");
                }
            }
            KeyCode::Char('y') if ctrl => self.copy_last_reply(),
            KeyCode::Char('l') if ctrl => {
                self.show_logs = true;
                self.logs_scroll.scroll_to_bottom();
            }
            KeyCode::F(1) => self.show_help = true,
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            _ => return false,
        }
        true
    }

    fn dispatch_to_focused(&mut self, key: KeyEvent) {
        match self.focused {
            FocusablePanel::Conversations => {
                if let Handled::Action(action) = self.conversation_list.handle_key(key) {
                    self.apply_list_action(action);
                }
            }
            FocusablePanel::Transcript => {
                self.transcript.handle_key(key);
            }
            FocusablePanel::Composer => {
                if let Handled::Action(ComposerAction::Submit(prompt)) =
                    self.composer.handle_key(key)
                {
                    self.controller.send_message(&prompt);
                }
            }
        }
    }

    fn apply_list_action(&mut self, action: ListAction) {
        match action {
            ListAction::Load(id) => self.controller.load_conversation(&id),
            ListAction::Delete(id) => self.controller.delete_conversation(&id),
            ListAction::New => self.controller.new_conversation(),
        }
    }

    fn copy_last_reply(&mut self) {
        let Some(text) = self
            .controller
            .conversations()
            .transcript()
            .last_bot_text()
            .map(str::to_string)
        else {
            self.show_toast("Nothing to copy");
            return;
        };

        match clipboard::copy_to_clipboard(&text) {
            Ok(()) => self.show_toast("✓ Copied last reply"),
            Err(e) => {
                tracing::warn!("Clipboard copy failed: {:#}", e);
                self.show_error("✗ Failed to copy");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::controller::Command;
    use crate::storage::{LocalStore, ACTIVE_CHAT_KEY, THEME_KEY};

    fn app() -> App {
        let local = LocalStore::in_memory();
        let controller = Controller::new(local.clone(), "Hello!");
        let themes = ThemeProvider::init(local, "dark");
        App::new(controller, themes, LogBuffer::new())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_enter_in_composer_sends() {
        let mut app = app();
        type_str(&mut app, "hi");
        press(&mut app, KeyCode::Enter);

        let commands = app.controller.take_commands();
        assert!(matches!(
            commands.as_slice(),
            [Command::OpenStream { prompt, chat_id: None, .. }] if prompt == "hi"
        ));
        assert_eq!(app.controller.conversations().transcript().messages().len(), 2);
        assert_eq!(app.composer.submit(), None);
    }

    #[test]
    fn test_plain_q_types_instead_of_quitting() {
        let mut app = app();
        type_str(&mut app, "q");
        assert!(!app.should_quit);
        assert_eq!(app.composer.submit().as_deref(), Some("q"));

        ctrl(&mut app, 'q');
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut app = app();
        assert_eq!(app.focused, FocusablePanel::Composer);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused, FocusablePanel::Conversations);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focused, FocusablePanel::Composer);
    }

    #[test]
    fn test_focus_request_returns_to_composer() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        ctrl(&mut app, 'n');
        app.apply_notifications();
        assert_eq!(app.focused, FocusablePanel::Composer);
    }

    #[test]
    fn test_theme_cycle_persists() {
        let mut app = app();
        let before = app.themes.current().to_string();
        ctrl(&mut app, 't');
        let after = app.themes.current().to_string();
        assert_ne!(before, after);
        assert!(app.toast.is_some());
    }

    #[test]
    fn test_new_conversation_clears_persisted_id() {
        let local = LocalStore::in_memory();
        local.set(ACTIVE_CHAT_KEY, "chat1");
        local.set(THEME_KEY, "ocean");
        let controller = Controller::new(local.clone(), "Hello!");
        let themes = ThemeProvider::init(local.clone(), "dark");
        let mut app = App::new(controller, themes, LogBuffer::new());

        ctrl(&mut app, 'n');
        assert_eq!(local.get(ACTIVE_CHAT_KEY), None);
        assert_eq!(local.get(THEME_KEY).as_deref(), Some("ocean"));
    }

    #[test]
    fn test_overlays_absorb_keys() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        assert!(app.show_help);

        type_str(&mut app, "abc");
        assert_eq!(app.composer.submit(), None);

        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);

        ctrl(&mut app, 'l');
        assert!(app.show_logs);
        ctrl(&mut app, 'l');
        assert!(!app.show_logs);
    }

    #[test]
    fn test_error_notification_becomes_toast() {
        let mut app = app();
        ctrl(&mut app, 'r');
        app.controller.handle_event(crate::events::ChatEvent::ConversationsListed(Err(
            crate::backend::BackendError::Stream("boom".to_string()),
        )));
        app.apply_notifications();
        let toast = app.toast.as_ref().unwrap();
        assert!(toast.message.contains("boom"));
    }

    #[test]
    fn test_list_actions_reach_controller() {
        let mut app = app();
        app.controller.handle_event(crate::events::ChatEvent::ConversationsListed(Ok(vec![
            crate::chat::models::ConversationSummary::new("chat1", "One"),
        ])));
        app.conversation_list
            .sync(app.controller.conversations().summaries());

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert!(app.controller.is_loading());
        assert!(app
            .controller
            .take_commands()
            .contains(&Command::LoadConversation {
                id: "chat1".to_string()
            }));
    }
}
