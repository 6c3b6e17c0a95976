//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Quote a string as a TOML basic string
fn quoted(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

impl Config {
    /// Serialize the config to a commented TOML document
    pub fn to_toml(&self) -> String {
        let api_key = match &self.assistant.api_key {
            Some(key) => format!("api_key = {}\n", quoted(key)),
            None => "# api_key = \"sk-...\"  # or set CHATLINE_OPENAI_API_KEY\n".to_string(),
        };

        format!(
            r#"# chatline configuration

# Theme used until one is picked in the TUI (Ctrl+T): dark, light, ocean
theme = {theme}

# First bot message of a fresh conversation
greeting = {greeting}

# Where the last active conversation and theme choice are remembered
state_file = {state_file}

# Chat backend (CHATLINE_BACKEND_URL overrides base_url)
[backend]
base_url = {base_url}
# Timeout for list/load/delete requests; reply streams never time out
request_timeout_secs = {timeout}

# Hosted model selection, forwarded with every prompt
[assistant]
use_openai = {use_openai}
model = {model}  # gpt-3.5-turbo, gpt-4, gpt-4-turbo
{api_key}
# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# File logging (in addition to TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = {log_file_rotation}  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            theme = quoted(&self.theme),
            greeting = quoted(&self.greeting),
            state_file = quoted(&self.state_file.to_string_lossy()),
            base_url = quoted(&self.backend.base_url),
            timeout = self.backend.request_timeout_secs,
            use_openai = self.assistant.use_openai,
            model = quoted(&self.assistant.model),
            api_key = api_key,
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.to_string_lossy()),
            log_file_rotation = quoted(self.logging.file_rotation.as_str()),
            log_file_prefix = quoted(&self.logging.file_prefix),
        )
    }

    /// Save config to ~/.config/chatline/config.toml
    pub fn save(&self) -> Result<(), std::io::Error> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config path",
            ));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml())
    }
}
