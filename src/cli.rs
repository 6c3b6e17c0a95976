// CLI module - command-line argument parsing and config handlers
//
// No subcommand starts the TUI. The chat subcommands (list, show, delete,
// send, themes) live in `headless`. Config management is handled here:
// - config --show: Display effective configuration
// - config --reset: Regenerate config file with defaults
// - config --edit: Open config file in $EDITOR
// - config --path: Print the config file location

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::net::SocketAddr;
use std::process::Command;

/// chatline - terminal chat client for a streaming chat backend
#[derive(Parser)]
#[command(name = "chatline")]
#[command(version = VERSION)]
#[command(about = "Terminal chat client for a streaming chat backend", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides config and CHATLINE_BACKEND_URL)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List conversations as id<TAB>title
    List,

    /// Print the transcript of a conversation
    Show {
        /// Conversation id
        id: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation id
        id: String,
    },

    /// Send a prompt and print the reply as it streams
    Send {
        /// The prompt text
        prompt: String,

        /// Continue an existing conversation instead of starting a new one
        #[arg(long)]
        chat: Option<String>,
    },

    /// List available themes, marking the current one
    Themes,

    /// Run the in-memory demo backend
    DemoBackend {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: SocketAddr,

        /// Delay between streamed words in milliseconds
        #[arg(long, default_value_t = 500)]
        word_delay_ms: u64,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

impl Cli {
    /// Whether this invocation runs the interactive TUI
    pub fn is_tui(&self) -> bool {
        self.command.is_none()
    }
}

pub fn handle_config(config: &Config, show: bool, reset: bool, edit: bool, path: bool) {
    if path {
        handle_config_path();
    } else if show {
        handle_config_show(config);
    } else if reset {
        handle_config_reset();
    } else if edit {
        handle_config_edit();
    } else {
        // No flag provided, show help
        println!("Usage: chatline config [--show|--reset|--edit|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --path    Show config file path");
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show(config: &Config) {
    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("theme = {:?}", config.theme);
    println!("greeting = {:?}", config.greeting);
    println!("state_file = {:?}", config.state_file.display().to_string());
    println!();
    println!("[backend]");
    println!("base_url = {:?}", config.backend.base_url);
    println!(
        "request_timeout_secs = {}",
        config.backend.request_timeout_secs
    );
    println!();
    println!("[assistant]");
    println!("use_openai = {}", config.assistant.use_openai);
    println!("model = {:?}", config.assistant.model);
    println!(
        "api_key = {}",
        if config.assistant.api_key.is_some() {
            "\"<set>\""
        } else {
            "<unset>"
        }
    );
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!(
        "file_dir = {:?}",
        config.logging.file_dir.display().to_string()
    );
    println!("file_rotation = {:?}", config.logging.file_rotation.as_str());
    println!("file_prefix = {:?}", config.logging.file_prefix);

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    if let Err(e) = Config::default().save() {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    // Ensure config exists
    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    match Command::new(&editor).arg(&path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}
