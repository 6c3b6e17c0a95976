// chatline - terminal client for a streaming chat backend
//
// Architecture:
// - Backend (reqwest): list/load/delete over JSON, replies over SSE
// - Chat core: conversation store, streaming session and the root controller
// - Runtime (tokio): runs controller commands and reports back over mpsc
// - TUI (ratatui): conversation list, transcript, composer
// - Headless commands: the same operations from the shell
// - Demo backend (axum): an in-memory server that speaks the same protocol

mod backend;
mod chat;
mod cli;
mod config;
mod demo;
mod events;
mod headless;
mod logging;
mod storage;
mod theme;
mod tui;
mod util;

use anyhow::{Context, Result};
use backend::BackendClient;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use logging::{LogBuffer, LogSink};
use std::time::Duration;
use storage::LocalStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    // Extract bundled themes on first run
    theme::ensure_themes_extracted();

    let mut config = Config::from_env();
    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.clone();
    }

    // In TUI mode logs go to the in-app buffer so they don't garble the display
    let log_buffer = LogBuffer::new();
    let sink = if cli.is_tui() {
        LogSink::Buffer
    } else {
        LogSink::Stderr
    };
    let _log_guard = logging::init(&config.logging, sink, &log_buffer);

    match cli.command {
        None => tui::run_tui(config, log_buffer).await,
        Some(Commands::List) => headless::list(&client(&config)?).await,
        Some(Commands::Show { id }) => headless::show(&client(&config)?, &id).await,
        Some(Commands::Delete { id }) => headless::delete(&client(&config)?, &id).await,
        Some(Commands::Send { prompt, chat }) => {
            headless::send(client(&config)?, &config.greeting, &prompt, chat.as_deref()).await
        }
        Some(Commands::Themes) => {
            headless::themes(LocalStore::open(&config.state_file), &config.theme);
            Ok(())
        }
        Some(Commands::DemoBackend {
            bind,
            word_delay_ms,
        }) => {
            let options = demo::DemoOptions {
                word_delay: Duration::from_millis(word_delay_ms),
            };
            demo::run(bind, options).await
        }
        Some(Commands::Config {
            show,
            reset,
            edit,
            path,
        }) => {
            cli::handle_config(&config, show, reset, edit, path);
            Ok(())
        }
    }
}

fn client(config: &Config) -> Result<BackendClient> {
    BackendClient::new(&config.backend, &config.assistant).context("Invalid backend configuration")
}
