// Wire formats for the chat backend
//
// The backend has shipped with two spellings of the same fields over time:
//
//   {"chat_id": "...", "title": "..."}            vs {"id": "...", "title": "..."}
//   {"user": "bot", "message": "...", ...}        vs {"role": "bot", "text": "..."}
//
// Both are accepted here and normalized into `chat::models` types, so nothing
// past this module ever sees the variance.

use crate::chat::models::{ConversationSummary, Fragment, LoadedConversation, Message, Role};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub(crate) struct WireSummary {
    #[serde(alias = "chat_id")]
    id: String,
    #[serde(default)]
    title: String,
}

impl From<WireSummary> for ConversationSummary {
    fn from(wire: WireSummary) -> Self {
        ConversationSummary::new(wire.id, wire.title)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    #[serde(alias = "user")]
    role: Role,
    #[serde(alias = "message")]
    text: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: Option<DateTime<Utc>>,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message {
            role: wire.role,
            text: wire.text,
            timestamp: wire.timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireConversation {
    #[serde(default, alias = "id")]
    chat_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    messages: Vec<WireMessage>,
}

impl WireConversation {
    /// Normalize, falling back to the requested id when the body omits it
    pub(crate) fn into_loaded(self, requested_id: &str) -> LoadedConversation {
        LoadedConversation {
            id: self.chat_id.unwrap_or_else(|| requested_id.to_string()),
            title: self.title,
            messages: self.messages.into_iter().map(Message::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireFragment {
    #[serde(alias = "user")]
    role: Role,
    #[serde(alias = "message")]
    text: String,
    #[serde(default)]
    chat_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: Option<DateTime<Utc>>,
}

/// Body of DELETE /chat/{id}
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireDeleteReply {
    #[serde(default)]
    pub message: Option<String>,
}

/// Parse one SSE data payload into a fragment
pub fn parse_fragment(data: &str) -> Result<Fragment, serde_json::Error> {
    let wire: WireFragment = serde_json::from_str(data)?;
    Ok(Fragment {
        role: wire.role,
        text: wire.text,
        chat_id: wire.chat_id.filter(|id| !id.is_empty()),
        timestamp: wire.timestamp,
    })
}

/// Accept RFC 3339 or naive ISO-8601 (assumed UTC); anything else becomes `None`
///
/// A bad timestamp should never cost us the message it is attached to.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
