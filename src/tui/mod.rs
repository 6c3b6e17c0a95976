// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, backend events)
// - Handing controller commands to the runtime after every update

pub mod app;
pub mod clipboard;
pub mod components;
pub mod scroll;
pub mod traits;
pub mod ui;

use crate::backend::BackendClient;
use crate::chat::{Controller, Runtime};
use crate::config::Config;
use crate::events::{ChatEvent, EVENT_CHANNEL_CAPACITY};
use crate::logging::LogBuffer;
use crate::storage::LocalStore;
use crate::theme::ThemeProvider;
use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the TUI
///
/// Builds the controller and runtime, restores the last conversation, then
/// owns the terminal until the user quits.
pub async fn run_tui(config: Config, log_buffer: LogBuffer) -> Result<()> {
    let client = BackendClient::new(&config.backend, &config.assistant)
        .context("Invalid backend configuration")?;
    let local = LocalStore::open(&config.state_file);
    tracing::info!(backend = %client.base_url(), "Starting chat UI");

    let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut runtime = Runtime::new(client, event_tx);

    let controller = Controller::new(local.clone(), &config.greeting);
    let themes = ThemeProvider::init(local, &config.theme);
    let mut app = App::new(controller, themes, log_buffer);

    app.controller.restore();
    runtime.execute_all(app.controller.take_commands());

    // Set up terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app, &mut runtime, &mut event_rx).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    runtime.shutdown();
    result
}

/// Main event loop
///
/// Waits on terminal input, the animation tick and backend events with
/// `tokio::select!`. Every branch may change controller state, so commands
/// and notifications are drained after each one.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runtime: &mut Runtime,
    event_rx: &mut mpsc::Receiver<ChatEvent>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            input = poll_terminal() => {
                if let Some(input) = input {
                    handle_terminal_event(app, input);
                }
            }

            _ = tick_interval.tick() => {
                app.tick_animation();
            }

            Some(chat_event) = event_rx.recv() => {
                app.controller.handle_event(chat_event);
            }
        }

        runtime.execute_all(app.controller.take_commands());
        app.apply_notifications();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn poll_terminal() -> Option<Event> {
    if event::poll(Duration::from_millis(10)).unwrap_or(false) {
        event::read().ok()
    } else {
        tokio::task::yield_now().await;
        None
    }
}

fn handle_terminal_event(app: &mut App, input: Event) {
    match input {
        Event::Key(key) => app.handle_key(key),
        Event::Paste(text) => app.handle_paste(&text),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => app.scroll_transcript(true),
            MouseEventKind::ScrollDown => app.scroll_transcript(false),
            _ => {}
        },
        _ => {}
    }
}
