// Conversation store: summaries, the open transcript and the active id
//
// Pure in-memory state. Persistence of the active id is the controller's job
// so that every change goes through one place.

use super::models::{ConversationSummary, Message};
use super::transcript::Transcript;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ConversationStore {
    summaries: Vec<ConversationSummary>,
    transcript: Transcript,
    active_id: Option<String>,
    greeting: String,
}

impl ConversationStore {
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            summaries: Vec::new(),
            transcript: Transcript::greeting(&greeting),
            active_id: None,
            greeting,
        }
    }

    pub fn summaries(&self) -> &[ConversationSummary] {
        &self.summaries
    }

    pub fn summary(&self, id: &str) -> Option<&ConversationSummary> {
        self.summaries.iter().find(|s| s.id == id)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn set_active_id(&mut self, id: Option<String>) {
        self.active_id = id;
    }

    /// Title of the active conversation, if it is known
    pub fn active_title(&self) -> Option<&str> {
        let id = self.active_id.as_deref()?;
        self.summary(id).map(|s| s.title.as_str())
    }

    /// Replace the summary list wholesale
    ///
    /// Arrival order is kept. Repeated ids keep their first occurrence.
    pub fn replace_summaries(&mut self, summaries: Vec<ConversationSummary>) {
        let mut seen = HashSet::new();
        self.summaries = summaries
            .into_iter()
            .filter(|s| seen.insert(s.id.clone()))
            .collect();
    }

    /// Append a summary unless one with the same id already exists
    ///
    /// Returns true when a new entry was added.
    pub fn ensure_summary(&mut self, summary: ConversationSummary) -> bool {
        if self.summary(&summary.id).is_some() {
            return false;
        }
        self.summaries.push(summary);
        true
    }

    pub fn remove_summary(&mut self, id: &str) -> bool {
        let before = self.summaries.len();
        self.summaries.retain(|s| s.id != id);
        self.summaries.len() != before
    }

    /// Install a loaded transcript and make its conversation active
    pub fn open(&mut self, id: String, messages: Vec<Message>) {
        self.transcript.replace(messages);
        self.active_id = Some(id);
    }

    /// Back to the fresh state: greeting only, nothing active
    pub fn reset(&mut self) {
        self.transcript = Transcript::greeting(&self.greeting);
        self.active_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(store: &ConversationStore) -> Vec<&str> {
        store.summaries().iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_replace_keeps_order_and_dedupes() {
        let mut store = ConversationStore::new("hi");
        store.replace_summaries(vec![
            ConversationSummary::new("b", "B"),
            ConversationSummary::new("a", "A"),
            ConversationSummary::new("b", "B again"),
        ]);
        assert_eq!(ids(&store), vec!["b", "a"]);
        assert_eq!(store.summary("b").unwrap().title, "B");
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut store = ConversationStore::new("hi");
        store.replace_summaries(vec![ConversationSummary::new("a", "A")]);
        store.replace_summaries(vec![ConversationSummary::new("c", "C")]);
        assert_eq!(ids(&store), vec!["c"]);
    }

    #[test]
    fn test_ensure_summary_is_idempotent() {
        let mut store = ConversationStore::new("hi");
        assert!(store.ensure_summary(ConversationSummary::new("a", "A")));
        assert!(!store.ensure_summary(ConversationSummary::new("a", "other")));
        assert_eq!(store.summaries().len(), 1);
        assert_eq!(store.summary("a").unwrap().title, "A");
    }

    #[test]
    fn test_reset_restores_greeting() {
        let mut store = ConversationStore::new("welcome");
        store.open("a".into(), vec![Message::user("x"), Message::bot("y")]);
        assert_eq!(store.active_id(), Some("a"));

        store.reset();
        assert_eq!(store.active_id(), None);
        assert_eq!(store.transcript().messages().len(), 1);
        assert_eq!(store.transcript().messages()[0].text, "welcome");
    }

    #[test]
    fn test_active_title_requires_summary() {
        let mut store = ConversationStore::new("hi");
        store.set_active_id(Some("a".into()));
        assert_eq!(store.active_title(), None);
        store.ensure_summary(ConversationSummary::new("a", "Alpha"));
        assert_eq!(store.active_title(), Some("Alpha"));
    }
}
