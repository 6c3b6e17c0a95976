// Root controller - owns conversation state and the streaming session
//
// The controller is a synchronous state machine. User intents (send, load,
// delete, ...) and background results (`ChatEvent`) go in; state changes
// happen immediately and any side effect comes out as a `Command` for the
// runtime to perform. UI-facing signals come out as `Notification`s.
//
// Invariants kept here:
// - at most one live streaming session; a new send supersedes the old one
// - events tagged with any other session id are dropped
// - the active conversation id is written to the local store on every change
// - only the most recently requested load is applied

use super::models::{ConversationSummary, Message, Role};
use super::session::{CloseReason, SessionId, SessionState, StreamingSession};
use super::store::ConversationStore;
use crate::backend::models::parse_fragment;
use crate::events::ChatEvent;
use crate::storage::{LocalStore, ACTIVE_CHAT_KEY};
use crate::util::take_chars;
use std::mem;

/// Characters of the prompt used to title a conversation created by a send
pub const TITLE_PREFIX_CHARS: usize = 20;

/// Side effects requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenStream {
        session: SessionId,
        prompt: String,
        chat_id: Option<String>,
    },
    CloseStream {
        session: SessionId,
    },
    ListConversations,
    LoadConversation {
        id: String,
    },
    DeleteConversation {
        id: String,
    },
}

/// Signals for whoever is presenting the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Put keyboard focus back on the composer
    FocusComposer,
    Info(String),
    Error(String),
}

pub struct Controller {
    conversations: ConversationStore,
    session: Option<StreamingSession>,
    last_session: SessionId,
    local: LocalStore,
    /// Id of the load whose result we will accept
    pending_load: Option<String>,
    /// Id being restored from the local store at startup
    restoring: Option<String>,
    commands: Vec<Command>,
    notifications: Vec<Notification>,
}

impl Controller {
    pub fn new(local: LocalStore, greeting: &str) -> Self {
        Self {
            conversations: ConversationStore::new(greeting),
            session: None,
            last_session: SessionId::new(0),
            local,
            pending_load: None,
            restoring: None,
            commands: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn session(&self) -> Option<&StreamingSession> {
        self.session.as_ref()
    }

    pub fn session_state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(StreamingSession::state)
            .unwrap_or_default()
    }

    pub fn is_streaming(&self) -> bool {
        self.session.as_ref().is_some_and(StreamingSession::is_live)
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Drain the commands produced since the last call
    pub fn take_commands(&mut self) -> Vec<Command> {
        mem::take(&mut self.commands)
    }

    /// Drain the notifications produced since the last call
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        mem::take(&mut self.notifications)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Intents
    // ─────────────────────────────────────────────────────────────────────────

    /// Startup: fetch the list and reopen the last active conversation
    ///
    /// The greeting stays on screen until (and unless) the load succeeds.
    pub fn restore(&mut self) {
        self.list_conversations();
        if let Some(id) = self.local.get(ACTIVE_CHAT_KEY).filter(|id| !id.is_empty()) {
            tracing::info!("Restoring conversation {}", id);
            self.load_conversation(&id);
            self.restoring = Some(id);
        }
    }

    /// Send a prompt in the active conversation (or a new one)
    ///
    /// Returns the new session id, or `None` if the prompt was blank.
    pub fn send_message(&mut self, prompt: &str) -> Option<SessionId> {
        if prompt.trim().is_empty() {
            return None;
        }

        // The prompt belongs to the conversation on screen, not one still loading
        if let Some(id) = self.pending_load.take() {
            tracing::debug!("Send cancels pending load of {}", id);
        }
        self.restoring = None;

        self.conversations
            .transcript_mut()
            .push(Message::user(prompt));

        self.close_live_session(CloseReason::Superseded);

        let id = self.last_session.next();
        self.last_session = id;
        let chat_id = self.conversations.active_id().map(str::to_string);
        let mut session = StreamingSession::new(id, prompt, chat_id.clone());
        session.open();
        self.session = Some(session);

        tracing::debug!(
            "Opening session {} for conversation {}",
            id,
            chat_id.as_deref().unwrap_or("<new>")
        );
        self.commands.push(Command::OpenStream {
            session: id,
            prompt: prompt.to_string(),
            chat_id,
        });
        self.notifications.push(Notification::FocusComposer);
        Some(id)
    }

    /// Stop the live reply, keeping whatever text has arrived
    pub fn close_session(&mut self) -> bool {
        self.close_live_session(CloseReason::Explicit)
    }

    pub fn list_conversations(&mut self) {
        self.commands.push(Command::ListConversations);
    }

    pub fn load_conversation(&mut self, id: &str) {
        self.close_live_session(CloseReason::Explicit);
        self.restoring = None;
        self.pending_load = Some(id.to_string());
        self.commands.push(Command::LoadConversation { id: id.to_string() });
    }

    pub fn delete_conversation(&mut self, id: &str) {
        self.commands
            .push(Command::DeleteConversation { id: id.to_string() });
    }

    /// Fresh state without deleting anything
    pub fn new_conversation(&mut self) {
        self.close_live_session(CloseReason::Explicit);
        self.pending_load = None;
        self.restoring = None;
        self.conversations.reset();
        self.persist_active();
        self.notifications.push(Notification::FocusComposer);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Background results
    // ─────────────────────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::StreamOpened { session } => {
                if let Some(live) = self.live_session_mut(session) {
                    live.on_opened();
                    tracing::debug!("Session {} connected", session);
                }
            }
            ChatEvent::StreamData { session, data } => self.on_stream_data(session, &data),
            ChatEvent::StreamFailed { session, error } => {
                let Some(live) = self.live_session_mut(session) else {
                    tracing::debug!("Ignoring failure of stale session {}: {}", session, error);
                    return;
                };
                live.close(CloseReason::Error);
                tracing::warn!("Reply stream {} failed: {}", session, error);
                self.notifications
                    .push(Notification::Error(format!("Reply failed: {}", error)));
            }
            ChatEvent::StreamEnded { session } => {
                if let Some(live) = self.live_session_mut(session) {
                    live.close(CloseReason::Completed);
                    tracing::debug!(
                        "Session {} completed after {} fragments in conversation {}",
                        session,
                        live.fragments(),
                        live.conversation_id().unwrap_or("<none>")
                    );
                }
            }
            ChatEvent::ConversationsListed(result) => match result {
                Ok(summaries) => {
                    tracing::debug!("Listed {} conversations", summaries.len());
                    self.conversations.replace_summaries(summaries);
                }
                Err(e) => {
                    tracing::warn!("Failed to list conversations: {}", e);
                    self.notifications.push(Notification::Error(format!(
                        "Could not fetch conversations: {}",
                        e
                    )));
                }
            },
            ChatEvent::ConversationLoaded { id, result } => self.on_conversation_loaded(id, result),
            ChatEvent::ConversationDeleted { id, result } => {
                self.on_conversation_deleted(id, result)
            }
        }
    }

    fn on_stream_data(&mut self, session: SessionId, data: &str) {
        let Some(live) = self.live_session_mut(session) else {
            tracing::debug!("Dropping fragment from stale session {}", session);
            return;
        };

        let fragment = match parse_fragment(data) {
            Ok(fragment) => fragment,
            Err(e) => {
                tracing::warn!("Dropping malformed fragment in session {}: {}", session, e);
                return;
            }
        };
        live.on_fragment();

        let adopted = match &fragment.chat_id {
            Some(id) if live.wants_conversation_id() => {
                live.adopt_conversation_id(id.clone());
                Some((id.clone(), take_chars(live.prompt(), TITLE_PREFIX_CHARS)))
            }
            _ => None,
        };
        if let Some((id, title)) = adopted {
            self.adopt_conversation(id, title);
        }

        if fragment.role != Role::Bot {
            tracing::debug!("Fragment in session {} has role {:?}", session, fragment.role);
        }
        let message = Message {
            role: Role::Bot,
            ..Message::from(fragment)
        };
        self.conversations.transcript_mut().reconcile(message);
    }

    fn adopt_conversation(&mut self, id: String, title: String) {
        tracing::info!("Backend assigned conversation id {}", id);
        self.conversations
            .ensure_summary(ConversationSummary::new(id.clone(), title));
        self.conversations.set_active_id(Some(id));
        self.persist_active();
    }

    fn on_conversation_loaded(
        &mut self,
        id: String,
        result: Result<super::models::LoadedConversation, crate::backend::BackendError>,
    ) {
        if self.pending_load.as_deref() != Some(id.as_str()) {
            tracing::debug!("Ignoring stale load result for {}", id);
            return;
        }
        self.pending_load = None;
        let restoring = self.restoring.take().is_some_and(|r| r == id);

        match result {
            Ok(loaded) => {
                tracing::debug!("Loaded conversation {} ({} messages)", id, loaded.messages.len());
                if let Some(title) = loaded.title {
                    self.conversations
                        .ensure_summary(ConversationSummary::new(id.clone(), title));
                }
                self.conversations.open(id, loaded.messages);
                self.persist_active();
                self.notifications.push(Notification::FocusComposer);
            }
            Err(e) => {
                tracing::warn!("Failed to load conversation {}: {}", id, e);
                if restoring && e.is_not_found() {
                    tracing::info!("Forgetting missing conversation {}", id);
                    self.local.remove(ACTIVE_CHAT_KEY);
                }
                self.notifications.push(Notification::Error(format!(
                    "Could not load conversation: {}",
                    e
                )));
            }
        }
    }

    fn on_conversation_deleted(
        &mut self,
        id: String,
        result: Result<(), crate::backend::BackendError>,
    ) {
        if let Err(e) = result {
            tracing::warn!("Failed to delete conversation {}: {}", id, e);
            self.notifications.push(Notification::Error(format!(
                "Could not delete conversation: {}",
                e
            )));
            return;
        }

        self.conversations.remove_summary(&id);
        if self.pending_load.as_deref() == Some(id.as_str()) {
            self.pending_load = None;
            self.restoring = None;
        }
        if self.conversations.active_id() == Some(id.as_str()) {
            self.close_live_session(CloseReason::Explicit);
            self.conversations.reset();
            self.persist_active();
        }
        tracing::info!("Deleted conversation {}", id);
        self.notifications
            .push(Notification::Info("Conversation deleted".to_string()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn live_session_mut(&mut self, id: SessionId) -> Option<&mut StreamingSession> {
        self.session
            .as_mut()
            .filter(|s| s.id() == id && s.is_live())
    }

    fn close_live_session(&mut self, reason: CloseReason) -> bool {
        let Some(session) = self.session.as_mut().filter(|s| s.is_live()) else {
            return false;
        };
        session.close(reason);
        tracing::debug!("Closing session {} ({:?})", session.id(), reason);
        self.commands.push(Command::CloseStream {
            session: session.id(),
        });
        true
    }

    fn persist_active(&self) {
        self.local
            .put(ACTIVE_CHAT_KEY, self.conversations.active_id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::chat::models::LoadedConversation;

    const GREETING: &str = "Hello there";

    fn controller() -> (Controller, LocalStore) {
        let local = LocalStore::in_memory();
        (Controller::new(local.clone(), GREETING), local)
    }

    fn fragment(text: &str) -> String {
        serde_json::json!({ "role": "bot", "text": text }).to_string()
    }

    fn fragment_with_id(text: &str, id: &str) -> String {
        serde_json::json!({ "chat_id": id, "user": "bot", "message": text }).to_string()
    }

    fn data(c: &mut Controller, session: SessionId, payload: String) {
        c.handle_event(ChatEvent::StreamData {
            session,
            data: payload,
        });
    }

    fn transcript(c: &Controller) -> Vec<(Role, String)> {
        c.conversations()
            .transcript()
            .messages()
            .iter()
            .map(|m| (m.role, m.text.clone()))
            .collect()
    }

    fn loaded(id: &str, texts: &[(Role, &str)]) -> LoadedConversation {
        LoadedConversation {
            id: id.to_string(),
            title: Some(format!("Title {}", id)),
            messages: texts
                .iter()
                .map(|(role, text)| Message {
                    role: *role,
                    text: text.to_string(),
                    timestamp: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_blank_prompt_is_noop() {
        let (mut c, _) = controller();
        assert_eq!(c.send_message("   \n\t"), None);
        assert_eq!(c.send_message(""), None);
        assert!(c.take_commands().is_empty());
        assert_eq!(transcript(&c), vec![(Role::Bot, GREETING.to_string())]);
        assert_eq!(c.session_state(), SessionState::Idle);
    }

    #[test]
    fn test_send_appends_user_message_before_any_fragment() {
        let (mut c, _) = controller();
        let session = c.send_message("What is Rust?").unwrap();

        assert_eq!(
            transcript(&c),
            vec![
                (Role::Bot, GREETING.to_string()),
                (Role::User, "What is Rust?".to_string()),
            ]
        );
        assert_eq!(
            c.take_commands(),
            vec![Command::OpenStream {
                session,
                prompt: "What is Rust?".to_string(),
                chat_id: None,
            }]
        );
        assert_eq!(c.session_state(), SessionState::Opening);
        assert!(c
            .take_notifications()
            .contains(&Notification::FocusComposer));
    }

    #[test]
    fn test_cumulative_fragments_leave_one_bot_entry() {
        let (mut c, _) = controller();
        let s = c.send_message("hi").unwrap();
        for text in ["H", "He", "Hello"] {
            data(&mut c, s, fragment(text));
        }
        let t = transcript(&c);
        assert_eq!(t.len(), 3);
        assert_eq!(t[2], (Role::Bot, "Hello".to_string()));
        assert_eq!(c.session_state(), SessionState::Streaming);
    }

    #[test]
    fn test_second_send_starts_new_bot_entry() {
        let (mut c, _) = controller();
        let s1 = c.send_message("first").unwrap();
        data(&mut c, s1, fragment("Hi"));
        c.handle_event(ChatEvent::StreamEnded { session: s1 });

        let s2 = c.send_message("second").unwrap();
        data(&mut c, s2, fragment("Bye"));

        assert_eq!(
            transcript(&c)[1..],
            [
                (Role::User, "first".to_string()),
                (Role::Bot, "Hi".to_string()),
                (Role::User, "second".to_string()),
                (Role::Bot, "Bye".to_string()),
            ]
        );
    }

    #[test]
    fn test_new_send_supersedes_live_session() {
        let (mut c, _) = controller();
        let s1 = c.send_message("one").unwrap();
        c.take_commands();

        let s2 = c.send_message("two").unwrap();
        let commands = c.take_commands();
        assert_eq!(commands[0], Command::CloseStream { session: s1 });
        assert!(matches!(commands[1], Command::OpenStream { session, .. } if session == s2));
        assert_eq!(c.session().unwrap().id(), s2);
    }

    #[test]
    fn test_late_fragments_from_preempted_session_are_dropped() {
        let (mut c, _) = controller();
        let s1 = c.send_message("A").unwrap();
        data(&mut c, s1, fragment("Hi"));

        let s2 = c.send_message("B").unwrap();
        data(&mut c, s1, fragment("Hi there, late"));
        data(&mut c, s2, fragment("B"));
        data(&mut c, s1, fragment("Hi there, later"));
        data(&mut c, s2, fragment("Bye"));
        c.handle_event(ChatEvent::StreamFailed {
            session: s1,
            error: "gone".into(),
        });

        assert_eq!(
            transcript(&c)[1..],
            [
                (Role::User, "A".to_string()),
                (Role::Bot, "Hi".to_string()),
                (Role::User, "B".to_string()),
                (Role::Bot, "Bye".to_string()),
            ]
        );
        assert_eq!(c.session_state(), SessionState::Streaming);
    }

    #[test]
    fn test_malformed_fragment_keeps_session_open() {
        let (mut c, _) = controller();
        let s = c.send_message("hi").unwrap();
        data(&mut c, s, fragment("Hel"));
        data(&mut c, s, "{not json".to_string());
        data(&mut c, s, r#"{"role":"bot"}"#.to_string());
        assert_eq!(c.session_state(), SessionState::Streaming);

        data(&mut c, s, fragment("Hello"));
        assert_eq!(transcript(&c).last().unwrap().1, "Hello");
        assert_eq!(c.session().unwrap().fragments(), 2);
    }

    #[test]
    fn test_first_fragment_adopts_conversation_id() {
        let (mut c, local) = controller();
        let s = c.send_message("Explain ownership and borrowing please").unwrap();
        data(&mut c, s, fragment_with_id("Sure", "c-1"));
        data(&mut c, s, fragment_with_id("Sure thing", "c-other"));

        assert_eq!(c.conversations().active_id(), Some("c-1"));
        assert_eq!(local.get(ACTIVE_CHAT_KEY).as_deref(), Some("c-1"));
        assert_eq!(c.conversations().summaries().len(), 1);
        let summary = c.conversations().summary("c-1").unwrap();
        assert_eq!(summary.title, "Explain ownership an");
        assert_eq!(summary.title.chars().count(), TITLE_PREFIX_CHARS);
    }

    #[test]
    fn test_title_prefix_counts_characters() {
        let (mut c, _) = controller();
        let prompt = "日本語のテキストをもっと長く書いてみましょうか";
        let s = c.send_message(prompt).unwrap();
        data(&mut c, s, fragment_with_id("ok", "jp"));
        let title = &c.conversations().summary("jp").unwrap().title;
        assert_eq!(title.chars().count(), 20);
        assert!(prompt.starts_with(title.as_str()));
    }

    #[test]
    fn test_existing_summary_is_not_duplicated() {
        let (mut c, _) = controller();
        c.handle_event(ChatEvent::ConversationsListed(Ok(vec![
            ConversationSummary::new("c-1", "Backend title"),
        ])));
        let s = c.send_message("prompt").unwrap();
        data(&mut c, s, fragment_with_id("x", "c-1"));
        assert_eq!(c.conversations().summaries().len(), 1);
        assert_eq!(c.conversations().summaries()[0].title, "Backend title");
    }

    #[test]
    fn test_send_in_active_conversation_carries_id_and_never_adopts() {
        let (mut c, _) = controller();
        c.load_conversation("c-7");
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "c-7".into(),
            result: Ok(loaded("c-7", &[])),
        });
        c.take_commands();

        let s = c.send_message("more").unwrap();
        assert!(matches!(
            &c.take_commands()[0],
            Command::OpenStream { chat_id: Some(id), .. } if id == "c-7"
        ));
        data(&mut c, s, fragment_with_id("x", "c-8"));
        assert_eq!(c.conversations().active_id(), Some("c-7"));
    }

    #[test]
    fn test_stream_error_closes_session_and_keeps_transcript() {
        let (mut c, _) = controller();
        let s = c.send_message("hi").unwrap();
        data(&mut c, s, fragment("partial"));
        c.take_notifications();

        c.handle_event(ChatEvent::StreamFailed {
            session: s,
            error: "connection reset".into(),
        });
        assert_eq!(c.session_state(), SessionState::Closed(CloseReason::Error));
        assert_eq!(transcript(&c).last().unwrap().1, "partial");
        assert!(matches!(
            c.take_notifications().as_slice(),
            [Notification::Error(msg)] if msg.contains("connection reset")
        ));

        data(&mut c, s, fragment("partial and more"));
        assert_eq!(transcript(&c).last().unwrap().1, "partial");
    }

    #[test]
    fn test_stream_end_completes_session() {
        let (mut c, _) = controller();
        let s = c.send_message("hi").unwrap();
        c.handle_event(ChatEvent::StreamOpened { session: s });
        assert_eq!(c.session_state(), SessionState::Streaming);
        c.handle_event(ChatEvent::StreamEnded { session: s });
        assert_eq!(
            c.session_state(),
            SessionState::Closed(CloseReason::Completed)
        );
        assert!(!c.is_streaming());
    }

    #[test]
    fn test_explicit_close() {
        let (mut c, _) = controller();
        let s = c.send_message("hi").unwrap();
        c.take_commands();
        assert!(c.close_session());
        assert_eq!(c.take_commands(), vec![Command::CloseStream { session: s }]);
        assert!(!c.close_session());
        assert!(c.take_commands().is_empty());
    }

    #[test]
    fn test_list_replaces_summaries() {
        let (mut c, _) = controller();
        c.list_conversations();
        assert_eq!(c.take_commands(), vec![Command::ListConversations]);

        c.handle_event(ChatEvent::ConversationsListed(Ok(vec![
            ConversationSummary::new("a", "A"),
            ConversationSummary::new("b", "B"),
        ])));
        c.handle_event(ChatEvent::ConversationsListed(Ok(vec![
            ConversationSummary::new("c", "C"),
        ])));
        let ids: Vec<_> = c
            .conversations()
            .summaries()
            .iter()
            .map(|s| s.id.clone())
            .collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_list_failure_keeps_state() {
        let (mut c, _) = controller();
        c.handle_event(ChatEvent::ConversationsListed(Ok(vec![
            ConversationSummary::new("a", "A"),
        ])));
        c.handle_event(ChatEvent::ConversationsListed(Err(BackendError::Stream(
            "boom".into(),
        ))));
        assert_eq!(c.conversations().summaries().len(), 1);
        assert!(matches!(
            c.take_notifications().as_slice(),
            [Notification::Error(_)]
        ));
    }

    #[test]
    fn test_load_replaces_transcript_and_persists() {
        let (mut c, local) = controller();
        c.load_conversation("c-1");
        assert_eq!(
            c.take_commands(),
            vec![Command::LoadConversation { id: "c-1".into() }]
        );
        assert!(c.is_loading());

        c.handle_event(ChatEvent::ConversationLoaded {
            id: "c-1".into(),
            result: Ok(loaded("c-1", &[(Role::User, "q"), (Role::Bot, "a")])),
        });
        assert_eq!(
            transcript(&c),
            vec![(Role::User, "q".into()), (Role::Bot, "a".into())]
        );
        assert_eq!(c.conversations().active_id(), Some("c-1"));
        assert_eq!(local.get(ACTIVE_CHAT_KEY).as_deref(), Some("c-1"));
        assert!(!c.is_loading());
    }

    #[test]
    fn test_only_latest_load_is_applied() {
        let (mut c, _) = controller();
        c.load_conversation("first");
        c.load_conversation("second");

        c.handle_event(ChatEvent::ConversationLoaded {
            id: "second".into(),
            result: Ok(loaded("second", &[(Role::Bot, "two")])),
        });
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "first".into(),
            result: Ok(loaded("first", &[(Role::Bot, "one")])),
        });

        assert_eq!(c.conversations().active_id(), Some("second"));
        assert_eq!(transcript(&c), vec![(Role::Bot, "two".into())]);
    }

    #[test]
    fn test_load_failure_keeps_state() {
        let (mut c, local) = controller();
        c.load_conversation("a");
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "a".into(),
            result: Ok(loaded("a", &[(Role::Bot, "kept")])),
        });
        c.load_conversation("b");
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "b".into(),
            result: Err(BackendError::NotFound("b".into())),
        });

        assert_eq!(c.conversations().active_id(), Some("a"));
        assert_eq!(transcript(&c), vec![(Role::Bot, "kept".into())]);
        assert_eq!(local.get(ACTIVE_CHAT_KEY).as_deref(), Some("a"));
    }

    #[test]
    fn test_load_closes_live_session() {
        let (mut c, _) = controller();
        let s = c.send_message("hi").unwrap();
        c.take_commands();
        c.load_conversation("other");
        assert_eq!(
            c.take_commands(),
            vec![
                Command::CloseStream { session: s },
                Command::LoadConversation { id: "other".into() },
            ]
        );
        assert_eq!(
            c.session_state(),
            SessionState::Closed(CloseReason::Explicit)
        );
    }

    #[test]
    fn test_delete_active_resets_to_greeting() {
        let (mut c, local) = controller();
        c.handle_event(ChatEvent::ConversationsListed(Ok(vec![
            ConversationSummary::new("a", "A"),
            ConversationSummary::new("b", "B"),
        ])));
        c.load_conversation("a");
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "a".into(),
            result: Ok(loaded("a", &[(Role::User, "q"), (Role::Bot, "a")])),
        });
        let s = c.send_message("follow up").unwrap();
        c.take_commands();

        c.delete_conversation("a");
        assert_eq!(
            c.take_commands(),
            vec![Command::DeleteConversation { id: "a".into() }]
        );
        c.handle_event(ChatEvent::ConversationDeleted {
            id: "a".into(),
            result: Ok(()),
        });

        assert_eq!(transcript(&c), vec![(Role::Bot, GREETING.to_string())]);
        assert_eq!(c.conversations().active_id(), None);
        assert_eq!(local.get(ACTIVE_CHAT_KEY), None);
        assert_eq!(c.conversations().summaries().len(), 1);
        assert_eq!(c.take_commands(), vec![Command::CloseStream { session: s }]);
    }

    #[test]
    fn test_delete_inactive_keeps_transcript() {
        let (mut c, _) = controller();
        c.handle_event(ChatEvent::ConversationsListed(Ok(vec![
            ConversationSummary::new("a", "A"),
            ConversationSummary::new("b", "B"),
        ])));
        c.load_conversation("a");
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "a".into(),
            result: Ok(loaded("a", &[(Role::Bot, "stay")])),
        });

        c.delete_conversation("b");
        c.handle_event(ChatEvent::ConversationDeleted {
            id: "b".into(),
            result: Ok(()),
        });
        assert_eq!(c.conversations().active_id(), Some("a"));
        assert_eq!(transcript(&c), vec![(Role::Bot, "stay".into())]);
        assert!(c.conversations().summary("b").is_none());
    }

    #[test]
    fn test_delete_failure_leaves_state() {
        let (mut c, _) = controller();
        c.handle_event(ChatEvent::ConversationsListed(Ok(vec![
            ConversationSummary::new("a", "A"),
        ])));
        c.take_notifications();
        c.handle_event(ChatEvent::ConversationDeleted {
            id: "a".into(),
            result: Err(BackendError::Status {
                status: 500,
                body: "nope".into(),
            }),
        });
        assert_eq!(c.conversations().summaries().len(), 1);
        assert!(matches!(
            c.take_notifications().as_slice(),
            [Notification::Error(_)]
        ));
    }

    #[test]
    fn test_new_conversation_resets_and_clears_persisted_id() {
        let (mut c, local) = controller();
        c.load_conversation("a");
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "a".into(),
            result: Ok(loaded("a", &[(Role::Bot, "x")])),
        });
        c.new_conversation();
        assert_eq!(c.conversations().active_id(), None);
        assert_eq!(local.get(ACTIVE_CHAT_KEY), None);
        assert_eq!(transcript(&c), vec![(Role::Bot, GREETING.to_string())]);
    }

    #[test]
    fn test_restore_round_trip_matches_direct_load() {
        let local = LocalStore::in_memory();
        let conversation = loaded("c-9", &[(Role::User, "q"), (Role::Bot, "answer")]);

        let mut direct = Controller::new(LocalStore::in_memory(), GREETING);
        direct.load_conversation("c-9");
        direct.handle_event(ChatEvent::ConversationLoaded {
            id: "c-9".into(),
            result: Ok(conversation.clone()),
        });

        {
            let mut first = Controller::new(local.clone(), GREETING);
            first.load_conversation("c-9");
            first.handle_event(ChatEvent::ConversationLoaded {
                id: "c-9".into(),
                result: Ok(conversation.clone()),
            });
        }

        let mut restarted = Controller::new(local.clone(), GREETING);
        restarted.restore();
        assert_eq!(
            restarted.take_commands(),
            vec![
                Command::ListConversations,
                Command::LoadConversation { id: "c-9".into() },
            ]
        );
        restarted.handle_event(ChatEvent::ConversationLoaded {
            id: "c-9".into(),
            result: Ok(conversation),
        });

        assert_eq!(transcript(&restarted), transcript(&direct));
        assert_eq!(
            restarted.conversations().active_id(),
            direct.conversations().active_id()
        );
    }

    #[test]
    fn test_send_cancels_pending_load() {
        let (mut c, local) = controller();
        c.load_conversation("a");
        let s = c.send_message("hi").unwrap();
        assert!(!c.is_loading());

        // The load answers after the send; the transcript on screen must win
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "a".into(),
            result: Ok(loaded("a", &[(Role::User, "q"), (Role::Bot, "old answer")])),
        });
        data(&mut c, s, fragment_with_id("Hello", "new"));

        assert_eq!(
            transcript(&c),
            vec![
                (Role::Bot, GREETING.to_string()),
                (Role::User, "hi".into()),
                (Role::Bot, "Hello".into()),
            ]
        );
        assert_eq!(c.conversations().active_id(), Some("new"));
        assert_eq!(local.get(ACTIVE_CHAT_KEY).as_deref(), Some("new"));
        assert!(c.is_streaming());
    }

    #[test]
    fn test_send_during_restore_abandons_restore() {
        let local = LocalStore::in_memory();
        local.set(ACTIVE_CHAT_KEY, "gone");
        let mut c = Controller::new(local.clone(), GREETING);
        c.restore();
        c.send_message("hi");

        c.handle_event(ChatEvent::ConversationLoaded {
            id: "gone".into(),
            result: Err(BackendError::NotFound("gone".into())),
        });
        assert_eq!(c.restoring, None);
        assert_eq!(local.get(ACTIVE_CHAT_KEY).as_deref(), Some("gone"));
        assert_eq!(transcript(&c).len(), 2);
    }

    #[test]
    fn test_deleting_conversation_being_restored_clears_restore() {
        let local = LocalStore::in_memory();
        local.set(ACTIVE_CHAT_KEY, "a");
        let mut c = Controller::new(local.clone(), GREETING);
        c.restore();
        assert_eq!(c.restoring.as_deref(), Some("a"));

        c.delete_conversation("a");
        c.handle_event(ChatEvent::ConversationDeleted {
            id: "a".into(),
            result: Ok(()),
        });
        assert!(!c.is_loading());
        assert_eq!(c.restoring, None);

        // A late load result for the deleted conversation is ignored
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "a".into(),
            result: Ok(loaded("a", &[(Role::Bot, "ghost")])),
        });
        assert_eq!(transcript(&c), vec![(Role::Bot, GREETING.to_string())]);
    }

    #[test]
    fn test_restore_without_persisted_id_only_lists() {
        let (mut c, _) = controller();
        c.restore();
        assert_eq!(c.take_commands(), vec![Command::ListConversations]);
        assert_eq!(transcript(&c), vec![(Role::Bot, GREETING.to_string())]);
    }

    #[test]
    fn test_restore_not_found_clears_persisted_id() {
        let local = LocalStore::in_memory();
        local.set(ACTIVE_CHAT_KEY, "gone");
        let mut c = Controller::new(local.clone(), GREETING);
        c.restore();
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "gone".into(),
            result: Err(BackendError::NotFound("gone".into())),
        });

        assert_eq!(local.get(ACTIVE_CHAT_KEY), None);
        assert_eq!(transcript(&c), vec![(Role::Bot, GREETING.to_string())]);
    }

    #[test]
    fn test_restore_transient_failure_keeps_persisted_id() {
        let local = LocalStore::in_memory();
        local.set(ACTIVE_CHAT_KEY, "c-1");
        let mut c = Controller::new(local.clone(), GREETING);
        c.restore();
        c.handle_event(ChatEvent::ConversationLoaded {
            id: "c-1".into(),
            result: Err(BackendError::Stream("offline".into())),
        });

        assert_eq!(local.get(ACTIVE_CHAT_KEY).as_deref(), Some("c-1"));
        assert_eq!(transcript(&c), vec![(Role::Bot, GREETING.to_string())]);
    }
}
