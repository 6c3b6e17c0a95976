// Transcript of the open conversation
//
// Append-only, with one exception: the trailing bot entry is overwritten by
// every fragment of a streaming reply. Fragments carry the whole reply so
// far, so replacing (not concatenating) is what keeps the text correct.

use super::models::{Message, Role};

/// Greeting shown in a fresh conversation when nothing else is configured
pub const DEFAULT_GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Fresh transcript holding only the bot greeting
    pub fn greeting(text: &str) -> Self {
        Self {
            messages: vec![Message::bot(text)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Most recent bot entry, used for clipboard copy
    pub fn last_bot_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Bot)
            .map(|m| m.text.as_str())
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Merge a cumulative bot fragment
    ///
    /// Replaces the trailing entry if it is a bot message, otherwise appends.
    pub fn reconcile(&mut self, message: Message) {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Bot => *last = message,
            _ => self.messages.push(message),
        }
    }

    /// Replace the whole transcript (used by load and reset)
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(t: &Transcript) -> Vec<(Role, &str)> {
        t.messages()
            .iter()
            .map(|m| (m.role, m.text.as_str()))
            .collect()
    }

    #[test]
    fn test_greeting_is_single_bot_entry() {
        let t = Transcript::greeting(DEFAULT_GREETING);
        assert_eq!(texts(&t), vec![(Role::Bot, DEFAULT_GREETING)]);
    }

    #[test]
    fn test_cumulative_fragments_collapse_into_one_entry() {
        let mut t = Transcript::default();
        t.push(Message::user("hi"));
        for text in ["H", "He", "Hello"] {
            t.reconcile(Message::bot(text));
        }
        assert_eq!(texts(&t), vec![(Role::User, "hi"), (Role::Bot, "Hello")]);
    }

    #[test]
    fn test_user_entry_starts_new_bot_entry() {
        let mut t = Transcript::default();
        t.push(Message::user("first"));
        t.reconcile(Message::bot("Hi"));
        t.push(Message::user("second"));
        t.reconcile(Message::bot("Bye"));
        assert_eq!(
            texts(&t),
            vec![
                (Role::User, "first"),
                (Role::Bot, "Hi"),
                (Role::User, "second"),
                (Role::Bot, "Bye"),
            ]
        );
    }

    #[test]
    fn test_reconcile_into_empty_transcript_appends() {
        let mut t = Transcript::default();
        t.reconcile(Message::bot("x"));
        assert_eq!(t.messages().len(), 1);
    }

    #[test]
    fn test_last_bot_text_skips_user_entries() {
        let mut t = Transcript::greeting("hey");
        t.push(Message::user("question"));
        assert_eq!(t.last_bot_text(), Some("hey"));
    }
}
