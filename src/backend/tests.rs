// Client tests against the in-process demo backend

use super::*;
use crate::chat::models::Role;
use crate::chat::session::{CloseReason, SessionState};
use crate::chat::{Controller, Runtime};
use crate::demo::{self, DemoOptions};
use crate::events::{ChatEvent, EVENT_CHANNEL_CAPACITY};
use crate::storage::{LocalStore, ACTIVE_CHAT_KEY};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

/// Demo backend on an ephemeral port; dropping the guard stops it
struct DemoServer {
    base_url: String,
    _shutdown: oneshot::Sender<()>,
}

async fn spawn_demo(prefix: &str) -> DemoServer {
    spawn_demo_with(
        prefix,
        DemoOptions {
            word_delay: Duration::ZERO,
        },
    )
    .await
}

async fn spawn_demo_with(prefix: &str, options: DemoOptions) -> DemoServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = if prefix.is_empty() {
        demo::router(options)
    } else {
        axum::Router::new().nest(prefix, demo::router(options))
    };

    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    DemoServer {
        base_url: format!("http://{}{}", addr, prefix),
        _shutdown: shutdown_tx,
    }
}

fn client_for(server: &DemoServer) -> BackendClient {
    let backend = BackendConfig {
        base_url: server.base_url.clone(),
        request_timeout_secs: 5,
    };
    BackendClient::new(&backend, &AssistantConfig::default()).unwrap()
}

async fn collect_data(mut stream: ReplyStream) -> Vec<String> {
    let mut data = Vec::new();
    while let Some(item) = stream.next().await {
        match item.unwrap() {
            StreamItem::Data(d) => data.push(d),
            StreamItem::Done => break,
        }
    }
    data
}

#[test]
fn test_rejects_unusable_base_url() {
    let assistant = AssistantConfig::default();
    for url in ["not a url", "ftp://example.com", "mailto:someone@example.com"] {
        let backend = BackendConfig {
            base_url: url.to_string(),
            ..Default::default()
        };
        let result = BackendClient::new(&backend, &assistant);
        assert!(matches!(result, Err(BackendError::InvalidUrl(_))), "{}", url);
    }
}

#[test]
fn test_endpoint_keeps_path_prefix_and_encodes() {
    let backend = BackendConfig {
        base_url: "http://localhost:9000/api/".to_string(),
        ..Default::default()
    };
    let client = BackendClient::new(&backend, &AssistantConfig::default()).unwrap();

    let url = client.endpoint(&["load_chat", "a b/c"]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:9000/api/load_chat/a%20b%2Fc");
}

#[test]
fn test_stream_url_query() {
    let backend = BackendConfig::default();
    let client = BackendClient::new(&backend, &AssistantConfig::default()).unwrap();

    let url = client.stream_url("hi there", None).unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(pairs, vec![("prompt".to_string(), "hi there".to_string())]);

    let url = client.stream_url("hi", Some("chat1")).unwrap();
    assert!(url.query_pairs().any(|(k, v)| k == "chat_id" && v == "chat1"));
    assert!(!url.query_pairs().any(|(k, _)| k == "api_key"));
}

#[test]
fn test_stream_url_forwards_assistant_only_when_active() {
    let backend = BackendConfig::default();
    let assistant = AssistantConfig {
        use_openai: true,
        model: "gpt-4o-mini".to_string(),
        api_key: Some("sk-test".to_string()),
    };
    let client = BackendClient::new(&backend, &assistant).unwrap();
    let url = client.stream_url("hi", None).unwrap();
    assert!(url.query_pairs().any(|(k, v)| k == "api_key" && v == "sk-test"));
    assert!(url.query_pairs().any(|(k, v)| k == "model" && v == "gpt-4o-mini"));

    let without_key = AssistantConfig {
        api_key: None,
        ..assistant
    };
    let client = BackendClient::new(&backend, &without_key).unwrap();
    let url = client.stream_url("hi", None).unwrap();
    assert!(!url.query_pairs().any(|(k, _)| k == "model"));
}

#[test]
fn test_classify_event() {
    assert!(matches!(
        classify_event("message", "{\"a\":1}".to_string()),
        Some(Ok(StreamItem::Data(d))) if d == "{\"a\":1}"
    ));
    assert!(matches!(
        classify_event("message", "[DONE]".to_string()),
        Some(Ok(StreamItem::Done))
    ));
    assert!(matches!(
        classify_event("done", String::new()),
        Some(Ok(StreamItem::Done))
    ));
    assert!(classify_event("message", "  ".to_string()).is_none());
}

#[tokio::test]
async fn test_list_and_load() {
    let server = spawn_demo("").await;
    let client = client_for(&server);

    let summaries = client.list_conversations().await.unwrap();
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["chat1", "chat2"]);
    assert_eq!(summaries[0].title, "Chat One");

    let loaded = client.load_conversation("chat1").await.unwrap();
    assert_eq!(loaded.id, "chat1");
    assert_eq!(loaded.title.as_deref(), Some("Chat One"));
    assert_eq!(loaded.messages.len(), 2);
    assert_eq!(loaded.messages[0].role, Role::User);
    assert_eq!(loaded.messages[1].role, Role::Bot);
    assert!(loaded.messages[1].timestamp.is_some());
}

#[tokio::test]
async fn test_load_unknown_is_not_found() {
    let server = spawn_demo("").await;
    let client = client_for(&server);

    let err = client.load_conversation("nope").await.unwrap_err();
    assert!(err.is_not_found(), "{:?}", err);
}

#[tokio::test]
async fn test_delete_then_list() {
    let server = spawn_demo("").await;
    let client = client_for(&server);

    client.delete_conversation("chat1").await.unwrap();
    // Already gone still counts as success
    client.delete_conversation("chat1").await.unwrap();

    let summaries = client.list_conversations().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "chat2");
}

#[tokio::test]
async fn test_requests_under_path_prefix() {
    let server = spawn_demo("/api").await;
    let client = client_for(&server);

    assert_eq!(client.list_conversations().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = BackendConfig {
        base_url: format!("http://{}", addr),
        request_timeout_secs: 2,
    };
    let client = BackendClient::new(&backend, &AssistantConfig::default()).unwrap();
    let err = client.list_conversations().await.unwrap_err();
    assert!(matches!(err, BackendError::Http(_)), "{:?}", err);
}

#[tokio::test]
async fn test_stream_is_cumulative() {
    let server = spawn_demo("").await;
    let client = client_for(&server);

    let stream = client.open_stream("hello", None).await.unwrap();
    let data = collect_data(stream).await;
    assert!(data.len() > 1);

    let fragments: Vec<_> = data
        .iter()
        .map(|d| models::parse_fragment(d).unwrap())
        .collect();

    // Each fragment extends the previous one
    for pair in fragments.windows(2) {
        assert!(pair[1].text.starts_with(&pair[0].text));
    }
    let last = fragments.last().unwrap();
    assert_eq!(last.text, demo::canned_reply());
    assert_eq!(last.role, Role::Bot);

    // The new conversation shows up under its id
    let chat_id = last.chat_id.clone().unwrap();
    assert!(fragments.iter().all(|f| f.chat_id.as_deref() == Some(&chat_id)));
    let loaded = client.load_conversation(&chat_id).await.unwrap();
    assert_eq!(loaded.messages.first().map(|m| m.text.as_str()), Some("hello"));
}

#[tokio::test]
async fn test_stream_into_existing_conversation() {
    let server = spawn_demo("").await;
    let client = client_for(&server);

    let stream = client.open_stream("again", Some("chat2")).await.unwrap();
    let data = collect_data(stream).await;
    let last = models::parse_fragment(data.last().unwrap()).unwrap();
    assert_eq!(last.chat_id.as_deref(), Some("chat2"));

    let summaries = client.list_conversations().await.unwrap();
    assert_eq!(summaries.len(), 2);
}

/// Feed events to the controller until the live session closes
async fn drive(
    controller: &mut Controller,
    runtime: &mut Runtime,
    rx: &mut mpsc::Receiver<ChatEvent>,
) {
    runtime.execute_all(controller.take_commands());
    while !matches!(controller.session_state(), SessionState::Closed(_)) {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for events")
            .expect("event channel closed");
        controller.handle_event(event);
        runtime.execute_all(controller.take_commands());
    }
}

#[tokio::test]
async fn test_send_adopts_new_conversation() {
    let server = spawn_demo("").await;
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut runtime = Runtime::new(client_for(&server), tx);
    let local = LocalStore::in_memory();
    let mut controller = Controller::new(local.clone(), "Hi!");

    controller.send_message("Tell me something interesting");
    drive(&mut controller, &mut runtime, &mut rx).await;

    assert_eq!(
        controller.session_state(),
        SessionState::Closed(CloseReason::Completed)
    );

    let store = controller.conversations();
    let id = store.active_id().unwrap().to_string();
    assert_eq!(local.get(ACTIVE_CHAT_KEY), Some(id.clone()));
    assert_eq!(store.summary(&id).unwrap().title, "Tell me something in");

    // greeting, prompt, one reconciled reply
    let messages = store.transcript().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].text, "Tell me something interesting");
    assert_eq!(messages[2].role, Role::Bot);
    assert_eq!(messages[2].text, demo::canned_reply());
}

#[tokio::test]
async fn test_restore_reopens_persisted_conversation() {
    let server = spawn_demo("").await;
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut runtime = Runtime::new(client_for(&server), tx);
    let local = LocalStore::in_memory();
    local.set(ACTIVE_CHAT_KEY, "chat1");
    let mut controller = Controller::new(local, "Hi!");

    controller.restore();
    runtime.execute_all(controller.take_commands());

    // One list result and one load result
    for _ in 0..2 {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        controller.handle_event(event);
    }

    let store = controller.conversations();
    assert_eq!(store.active_id(), Some("chat1"));
    assert_eq!(store.summaries().len(), 2);
    assert_eq!(store.transcript().messages().len(), 2);
    assert_eq!(store.transcript().last_bot_text(), Some("Hi! How can I help?"));
}

#[tokio::test]
async fn test_second_send_aborts_first_stream() {
    let server = spawn_demo_with(
        "",
        DemoOptions {
            word_delay: Duration::from_millis(100),
        },
    )
    .await;
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut runtime = Runtime::new(client_for(&server), tx);
    let mut controller = Controller::new(LocalStore::in_memory(), "Hi!");

    let first = controller.send_message("first").unwrap();
    runtime.execute_all(controller.take_commands());

    // Wait for the first word of the first reply
    while controller.session().map_or(0, |s| s.fragments()) == 0 {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for the first fragment")
            .expect("event channel closed");
        controller.handle_event(event);
    }
    assert!(runtime.is_tracking(first));

    let second = controller.send_message("second").unwrap();
    runtime.execute_all(controller.take_commands());
    assert!(!runtime.is_tracking(first));
    assert!(runtime.is_tracking(second));

    drive(&mut controller, &mut runtime, &mut rx).await;
    assert_eq!(
        controller.session_state(),
        SessionState::Closed(CloseReason::Completed)
    );

    // Anything the aborted task queued before dying must not change the result
    tokio::time::sleep(Duration::from_millis(300)).await;
    while let Ok(event) = rx.try_recv() {
        controller.handle_event(event);
    }

    let messages = controller.conversations().transcript().messages();
    let texts: Vec<(Role, &str)> = messages.iter().map(|m| (m.role, m.text.as_str())).collect();
    assert_eq!(texts.len(), 5, "{:?}", texts);
    assert_eq!(texts[1], (Role::User, "first"));
    assert_eq!(texts[2].0, Role::Bot);
    assert!(demo::canned_reply().starts_with(texts[2].1));
    assert_ne!(texts[2].1, demo::canned_reply());
    assert_eq!(texts[3], (Role::User, "second"));
    assert_eq!(texts[4], (Role::Bot, demo::canned_reply()));
}
