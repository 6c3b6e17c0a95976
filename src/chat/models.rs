// Domain types for conversations
//
// These are the normalized shapes the rest of the client works with. The
// backend's field-naming variants (`user`/`role`, `message`/`text`,
// `chat_id`/`id`) are folded into these at the HTTP boundary, see
// `backend::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

impl Role {
    /// Label shown above the message in the transcript
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Bot => "AI Assistant",
        }
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            timestamp: Some(Utc::now()),
        }
    }

    /// Timestamp formatted the way the transcript header shows it (`03:07 PM`)
    pub fn clock_label(&self) -> Option<String> {
        self.timestamp
            .map(|ts| ts.with_timezone(&chrono::Local).format("%I:%M %p").to_string())
    }
}

/// Lightweight list entry for the sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
}

impl ConversationSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A full conversation as returned by a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConversation {
    pub id: String,
    pub title: Option<String>,
    pub messages: Vec<Message>,
}

/// One push event of a streaming reply
///
/// `text` is the cumulative reply so far, not a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub role: Role,
    pub text: String,
    pub chat_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<Fragment> for Message {
    fn from(fragment: Fragment) -> Self {
        Message {
            role: fragment.role,
            text: fragment.text,
            timestamp: fragment.timestamp.or_else(|| Some(Utc::now())),
        }
    }
}
