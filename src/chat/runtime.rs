// Runtime - executes controller commands against the backend
//
// Each command becomes a spawned task that reports back through the event
// channel. Reply streams are tracked by session id so that a `CloseStream`
// can abort the task; anything the task already queued is discarded by the
// controller's session check.

use super::controller::Command;
use super::session::SessionId;
use crate::backend::{BackendClient, StreamItem};
use crate::events::ChatEvent;
use futures::StreamExt;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Runtime {
    client: BackendClient,
    event_tx: mpsc::Sender<ChatEvent>,
    streams: HashMap<SessionId, JoinHandle<()>>,
}

impl Runtime {
    pub fn new(client: BackendClient, event_tx: mpsc::Sender<ChatEvent>) -> Self {
        Self {
            client,
            event_tx,
            streams: HashMap::new(),
        }
    }

    pub fn execute_all(&mut self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.execute(command);
        }
    }

    /// Start the work for one command. Must be called inside a tokio runtime.
    pub fn execute(&mut self, command: Command) {
        let client = self.client.clone();
        let tx = self.event_tx.clone();

        match command {
            Command::OpenStream {
                session,
                prompt,
                chat_id,
            } => {
                self.reap();
                let handle = tokio::spawn(stream_reply(client, tx, session, prompt, chat_id));
                self.streams.insert(session, handle);
            }
            Command::CloseStream { session } => {
                if let Some(handle) = self.streams.remove(&session) {
                    handle.abort();
                    tracing::debug!("Aborted reply stream {}", session);
                }
            }
            Command::ListConversations => {
                tokio::spawn(async move {
                    let result = client.list_conversations().await;
                    let _ = tx.send(ChatEvent::ConversationsListed(result)).await;
                });
            }
            Command::LoadConversation { id } => {
                tokio::spawn(async move {
                    let result = client.load_conversation(&id).await;
                    let _ = tx.send(ChatEvent::ConversationLoaded { id, result }).await;
                });
            }
            Command::DeleteConversation { id } => {
                tokio::spawn(async move {
                    let result = client.delete_conversation(&id).await;
                    let _ = tx.send(ChatEvent::ConversationDeleted { id, result }).await;
                });
            }
        }
    }

    /// Abort every running stream
    pub fn shutdown(&mut self) {
        for (session, handle) in self.streams.drain() {
            handle.abort();
            tracing::debug!("Aborted reply stream {} on shutdown", session);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_tracking(&self, session: SessionId) -> bool {
        self.streams.contains_key(&session)
    }

    fn reap(&mut self) {
        self.streams.retain(|_, handle| !handle.is_finished());
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Pump one reply stream into the event channel
async fn stream_reply(
    client: BackendClient,
    tx: mpsc::Sender<ChatEvent>,
    session: SessionId,
    prompt: String,
    chat_id: Option<String>,
) {
    let mut stream = match client.open_stream(&prompt, chat_id.as_deref()).await {
        Ok(stream) => stream,
        Err(e) => {
            let _ = tx
                .send(ChatEvent::StreamFailed {
                    session,
                    error: e.to_string(),
                })
                .await;
            return;
        }
    };

    if tx.send(ChatEvent::StreamOpened { session }).await.is_err() {
        return;
    }

    while let Some(item) = stream.next().await {
        let event = match item {
            Ok(StreamItem::Data(data)) => ChatEvent::StreamData { session, data },
            Ok(StreamItem::Done) => break,
            Err(e) => {
                let _ = tx
                    .send(ChatEvent::StreamFailed {
                        session,
                        error: e.to_string(),
                    })
                    .await;
                return;
            }
        };
        // Receiver gone means the app is shutting down
        if tx.send(event).await.is_err() {
            return;
        }
    }

    let _ = tx.send(ChatEvent::StreamEnded { session }).await;
}
