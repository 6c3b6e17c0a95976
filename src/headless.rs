// Headless mode - the chat subcommands without the TUI
//
// `list`, `show` and `delete` call the backend client directly. `send` drives
// the same controller and runtime the TUI uses, printing the reply as the
// cumulative fragments arrive.

use crate::backend::BackendClient;
use crate::chat::models::Role;
use crate::chat::session::{CloseReason, SessionState};
use crate::chat::{Controller, Notification, Runtime};
use crate::events::{ChatEvent, EVENT_CHANNEL_CAPACITY};
use crate::storage::LocalStore;
use crate::theme::{Theme, ThemeProvider};
use anyhow::{bail, Context, Result};
use std::io::Write;
use tokio::sync::mpsc;

/// `chatline list`
pub async fn list(client: &BackendClient) -> Result<()> {
    let summaries = client
        .list_conversations()
        .await
        .context("Failed to list conversations")?;
    for summary in summaries {
        println!("{}\t{}", summary.id, summary.title);
    }
    Ok(())
}

/// `chatline show <id>`
pub async fn show(client: &BackendClient, id: &str) -> Result<()> {
    let loaded = client
        .load_conversation(id)
        .await
        .with_context(|| format!("Failed to load conversation {}", id))?;

    if let Some(title) = &loaded.title {
        println!("# {}", title);
        println!();
    }
    for message in &loaded.messages {
        match message.clock_label() {
            Some(clock) => println!("{} ({})", message.role.display_name(), clock),
            None => println!("{}", message.role.display_name()),
        }
        println!("{}", message.text);
        println!();
    }
    Ok(())
}

/// `chatline delete <id>`
pub async fn delete(client: &BackendClient, id: &str) -> Result<()> {
    client
        .delete_conversation(id)
        .await
        .with_context(|| format!("Failed to delete conversation {}", id))?;
    println!("Deleted {}", id);
    Ok(())
}

/// `chatline themes`
pub fn themes(store: LocalStore, configured: &str) {
    let provider = ThemeProvider::init(store, configured);
    for key in Theme::list_available() {
        let marker = if key == provider.current() { "*" } else { " " };
        println!("{} {}", marker, key);
    }
}

/// `chatline send <prompt> [--chat <id>]`
///
/// Uses a throwaway local store so a one-off send does not change which
/// conversation the TUI reopens.
pub async fn send(
    client: BackendClient,
    greeting: &str,
    prompt: &str,
    chat: Option<&str>,
) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Prompt is empty");
    }

    let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut runtime = Runtime::new(client, event_tx);
    let mut controller = Controller::new(LocalStore::in_memory(), greeting);

    if let Some(id) = chat {
        controller.load_conversation(id);
        runtime.execute_all(controller.take_commands());
        while controller.is_loading() {
            let event = next_event(&mut event_rx).await?;
            controller.handle_event(event);
        }
        if controller.conversations().active_id() != Some(id) {
            let error =
                first_error(&mut controller).unwrap_or_else(|| format!("Could not load {}", id));
            bail!("{}", error);
        }
    }

    controller.send_message(prompt);
    runtime.execute_all(controller.take_commands());

    let mut printed = String::new();
    loop {
        let event = tokio::select! {
            event = next_event(&mut event_rx) => event?,
            _ = tokio::signal::ctrl_c() => {
                controller.close_session();
                runtime.execute_all(controller.take_commands());
                println!();
                bail!("Interrupted");
            }
        };

        controller.handle_event(event);
        runtime.execute_all(controller.take_commands());
        print_progress(&controller, &mut printed)?;

        match controller.session_state() {
            SessionState::Closed(CloseReason::Completed) => break,
            state @ SessionState::Closed(_) => {
                println!();
                let error = first_error(&mut controller)
                    .unwrap_or_else(|| format!("Reply ended: {}", state.label()));
                bail!("{}", error);
            }
            _ => {}
        }
    }

    println!();
    if let Some(id) = controller.conversations().active_id() {
        eprintln!("conversation: {}", id);
    }
    Ok(())
}

/// Print whatever the latest fragment added to the reply
fn print_progress(controller: &Controller, printed: &mut String) -> Result<()> {
    let has_reply = controller.session().is_some_and(|s| s.fragments() > 0);
    let Some(last) = controller.conversations().transcript().last() else {
        return Ok(());
    };
    if !has_reply || last.role != Role::Bot || last.text == *printed {
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    match last.text.strip_prefix(printed.as_str()) {
        Some(delta) => write!(stdout, "{}", delta)?,
        // The backend rewrote earlier text; start the line over
        None => write!(stdout, "\n{}", last.text)?,
    }
    stdout.flush()?;
    *printed = last.text.clone();
    Ok(())
}

fn first_error(controller: &mut Controller) -> Option<String> {
    controller
        .take_notifications()
        .into_iter()
        .find_map(|n| match n {
            Notification::Error(message) => Some(message),
            _ => None,
        })
}

async fn next_event(rx: &mut mpsc::Receiver<ChatEvent>) -> Result<ChatEvent> {
    rx.recv().await.context("Event channel closed")
}
