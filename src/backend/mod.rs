// Backend module - HTTP client for the chat service
//
// Four operations, all relative to the configured base URL:
//
//   GET    /chats                  -> [{id, title}]
//   GET    /load_chat/{id}         -> {chat_id, title, messages: [...]}
//   DELETE /chat/{id}              -> {message}
//   GET    /chat?prompt=&chat_id=  -> text/event-stream of cumulative fragments
//
// The stream is handed back as a `Stream` of raw SSE data payloads. Decoding
// them into fragments is left to the controller so a malformed payload can be
// dropped without ending the session.

mod error;
pub mod models;

#[cfg(test)]
mod tests;

pub use error::BackendError;

use crate::chat::models::{ConversationSummary, LoadedConversation};
use crate::config::{AssistantConfig, BackendConfig};
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use models::{WireConversation, WireDeleteReply, WireSummary};
use reqwest::{StatusCode, Url};
use std::pin::Pin;
use std::time::Duration;

/// One item from an open reply stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    /// Raw `data:` payload of one SSE event
    Data(String),
    /// The backend signalled the end of the reply
    Done,
}

pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<StreamItem, BackendError>> + Send>>;

/// Client for the chat backend
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
    assistant: AssistantConfig,
}

impl BackendClient {
    pub fn new(backend: &BackendConfig, assistant: &AssistantConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&backend.base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", backend.base_url, e)))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(BackendError::InvalidUrl(backend.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("chatline/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            request_timeout: Duration::from_secs(backend.request_timeout_secs),
            assistant: assistant.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET /chats
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, BackendError> {
        let url = self.endpoint(&["chats"])?;
        let resp = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let body = success_body(resp).await?;
        let wire: Vec<WireSummary> = serde_json::from_str(&body)?;
        Ok(wire.into_iter().map(ConversationSummary::from).collect())
    }

    /// GET /load_chat/{id}
    pub async fn load_conversation(&self, id: &str) -> Result<LoadedConversation, BackendError> {
        let url = self.endpoint(&["load_chat", id])?;
        let resp = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(id.to_string()));
        }
        let body = success_body(resp).await?;
        let wire: WireConversation = serde_json::from_str(&body)?;
        Ok(wire.into_loaded(id))
    }

    /// DELETE /chat/{id}
    ///
    /// Any success status counts, including the backend's "Chat not found"
    /// reply: the conversation is gone either way.
    pub async fn delete_conversation(&self, id: &str) -> Result<(), BackendError> {
        let url = self.endpoint(&["chat", id])?;
        let resp = self
            .http
            .delete(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let body = success_body(resp).await?;
        let reply: WireDeleteReply = serde_json::from_str(&body).unwrap_or_default();
        tracing::debug!(
            "Deleted conversation {}: {}",
            id,
            reply.message.as_deref().unwrap_or("ok")
        );
        Ok(())
    }

    /// GET /chat?prompt=..[&chat_id=..] as an SSE stream
    ///
    /// No timeout: a reply may legitimately take a long time.
    pub async fn open_stream(
        &self,
        prompt: &str,
        chat_id: Option<&str>,
    ) -> Result<ReplyStream, BackendError> {
        let url = self.stream_url(prompt, chat_id)?;
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let stream = resp
            .bytes_stream()
            .eventsource()
            .filter_map(|result| async move {
                match result {
                    Ok(event) => classify_event(&event.event, event.data),
                    Err(e) => Some(Err(BackendError::Stream(e.to_string()))),
                }
            });

        Ok(Box::pin(stream))
    }

    fn stream_url(&self, prompt: &str, chat_id: Option<&str>) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&["chat"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("prompt", prompt);
            if let Some(id) = chat_id {
                query.append_pair("chat_id", id);
            }
            if self.assistant.is_active() {
                if let Some(key) = self.assistant.api_key.as_deref() {
                    query.append_pair("api_key", key);
                    query.append_pair("model", &self.assistant.model);
                }
            }
        }
        Ok(url)
    }

    /// Base URL plus percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Map one SSE event to a stream item; `None` skips it
fn classify_event(event: &str, data: String) -> Option<Result<StreamItem, BackendError>> {
    let trimmed = data.trim();
    if event == "done" || trimmed == "[DONE]" {
        return Some(Ok(StreamItem::Done));
    }
    if trimmed.is_empty() {
        return None;
    }
    Some(Ok(StreamItem::Data(data)))
}

/// Read the body of a successful response, or turn the failure into an error
async fn success_body(resp: reqwest::Response) -> Result<String, BackendError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
