// Demo backend: an in-memory chat service for trying the client offline
//
// Implements the same HTTP surface the client talks to:
//
//   GET    /chats                  list conversations
//   GET    /load_chat/:id          full transcript, 404 if unknown
//   DELETE /chat/:id               delete (200 even if unknown)
//   GET    /chat?prompt=&chat_id=  SSE stream of cumulative reply fragments
//
// Replies are canned: the same sentence streamed word by word, each event
// carrying everything generated so far. A prompt without chat_id starts a
// new conversation titled with the prompt.
//
// Run with: chatline demo-backend --bind 127.0.0.1:8000

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

/// The reply every prompt gets, streamed one word at a time
const REPLY: &str = "Hello, this is a streaming response from the chatbot!";

/// Demo server settings
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Pause between streamed words
    pub word_delay: Duration,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            word_delay: Duration::from_millis(500),
        }
    }
}

/// Full text of the canned reply
pub fn canned_reply() -> &'static str {
    REPLY
}

#[derive(Debug, Clone, Serialize)]
struct DemoMessage {
    user: String,
    message: String,
    timestamp: DateTime<Utc>,
}

impl DemoMessage {
    fn new(user: &str, message: impl Into<String>) -> Self {
        Self {
            user: user.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
struct DemoChat {
    id: String,
    title: String,
    messages: Vec<DemoMessage>,
}

#[derive(Clone)]
struct DemoState {
    chats: Arc<Mutex<Vec<DemoChat>>>,
    next_id: Arc<AtomicU64>,
    options: DemoOptions,
}

impl DemoState {
    fn new(options: DemoOptions) -> Self {
        let seeded = vec![
            DemoChat {
                id: "chat1".to_string(),
                title: "Chat One".to_string(),
                messages: vec![
                    DemoMessage::new("user", "Hello"),
                    DemoMessage::new("bot", "Hi! How can I help?"),
                ],
            },
            DemoChat {
                id: "chat2".to_string(),
                title: "Chat Two".to_string(),
                messages: vec![DemoMessage::new("user", "What's up?")],
            },
        ];

        Self {
            chats: Arc::new(Mutex::new(seeded)),
            next_id: Arc::new(AtomicU64::new(1)),
            options,
        }
    }

    fn chats(&self) -> MutexGuard<'_, Vec<DemoChat>> {
        self.chats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Unique id: counter plus a random suffix so restarts don't collide
    fn generate_id(&self) -> String {
        use std::collections::hash_map::RandomState;
        use std::hash::{BuildHasher, Hasher};

        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let random = RandomState::new().build_hasher().finish();
        format!("chat-{}-{:04x}", n, random & 0xFFFF)
    }

    fn append(&self, chat_id: &str, message: DemoMessage) {
        if let Some(chat) = self.chats().iter_mut().find(|c| c.id == chat_id) {
            chat.messages.push(message);
        }
    }
}

/// Build the demo router
pub fn router(options: DemoOptions) -> Router {
    Router::new()
        .route("/chats", get(list_chats))
        .route("/load_chat/:chat_id", get(load_chat))
        .route("/chat/:chat_id", delete(delete_chat))
        .route("/chat", get(chat))
        .with_state(DemoState::new(options))
}

/// Serve on an already-bound listener until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    options: DemoOptions,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, router(options))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Demo backend error")
}

/// Bind and serve until Ctrl+C
pub async fn run(bind_addr: SocketAddr, options: DemoOptions) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    tracing::info!("Demo backend listening on http://{}", listener.local_addr()?);

    serve(listener, options, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    tracing::info!("Demo backend shut down");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn list_chats(State(state): State<DemoState>) -> Json<serde_json::Value> {
    let chats: Vec<_> = state
        .chats()
        .iter()
        .map(|c| json!({ "id": c.id, "title": c.title }))
        .collect();
    Json(json!(chats))
}

async fn load_chat(State(state): State<DemoState>, Path(chat_id): Path<String>) -> Response {
    let chats = state.chats();
    match chats.iter().find(|c| c.id == chat_id) {
        Some(chat) => Json(json!({
            "chat_id": chat.id,
            "title": chat.title,
            "messages": chat.messages,
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Chat not found" })),
        )
            .into_response(),
    }
}

async fn delete_chat(
    State(state): State<DemoState>,
    Path(chat_id): Path<String>,
) -> Json<serde_json::Value> {
    let mut chats = state.chats();
    let before = chats.len();
    chats.retain(|c| c.id != chat_id);

    let message = if chats.len() < before {
        "Chat deleted successfully"
    } else {
        "Chat not found"
    };
    Json(json!({ "message": message }))
}

#[derive(Debug, Deserialize)]
struct ChatQuery {
    prompt: String,
    #[serde(default)]
    chat_id: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

async fn chat(
    State(state): State<DemoState>,
    Query(query): Query<ChatQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    if let Some(model) = &query.model {
        tracing::debug!("Demo backend ignoring requested model {}", model);
    }

    let chat_id = {
        let mut chats = state.chats();
        let existing = query
            .chat_id
            .as_deref()
            .filter(|id| chats.iter().any(|c| c.id == *id))
            .map(str::to_string);

        match existing {
            Some(id) => id,
            None => {
                let id = query
                    .chat_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| state.generate_id());
                chats.push(DemoChat {
                    id: id.clone(),
                    title: query.prompt.clone(),
                    messages: Vec::new(),
                });
                id
            }
        }
    };
    state.append(&chat_id, DemoMessage::new("user", query.prompt.clone()));

    let (tx, rx) = mpsc::channel::<Event>(canned_reply().split(' ').count());
    tokio::spawn(stream_reply(state, chat_id, tx));

    Sse::new(ReceiverStream::new(rx).map(Ok)).keep_alive(KeepAlive::default())
}

/// Push the canned reply one word at a time, then store it
async fn stream_reply(state: DemoState, chat_id: String, tx: mpsc::Sender<Event>) {
    let mut text = String::new();

    for (i, word) in canned_reply().split(' ').enumerate() {
        if i > 0 {
            tokio::time::sleep(state.options.word_delay).await;
            text.push(' ');
        }
        text.push_str(word);

        let payload = DemoMessage::new("bot", text.clone());
        let data = json!({
            "chat_id": chat_id,
            "user": payload.user,
            "message": payload.message,
            "timestamp": payload.timestamp,
        });

        // Client went away: stop generating
        if tx.send(Event::default().data(data.to_string())).await.is_err() {
            tracing::debug!("Demo client disconnected from {}", chat_id);
            return;
        }
    }

    state.append(&chat_id, DemoMessage::new("bot", text));
}
