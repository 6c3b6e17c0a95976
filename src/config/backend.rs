//! Backend and assistant configuration
//!
//! - Backend: where the chat service lives and how long plain requests may take
//! - Assistant: which model the backend should answer with

use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Chat backend connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Base URL; may carry a path prefix (e.g. "https://host/api")
    pub base_url: String,
    /// Timeout for list/load/delete requests. Reply streams have none.
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Backend settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileBackend {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl BackendConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileBackend>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            base_url: file.base_url.unwrap_or(defaults.base_url),
            request_timeout_secs: file
                .request_timeout_secs
                .filter(|&secs| secs > 0)
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assistant
// ─────────────────────────────────────────────────────────────────────────────

/// Model requested when the config names none
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Models the backend knows how to route to
pub const KNOWN_MODELS: &[&str] = &[DEFAULT_MODEL, "gpt-4", "gpt-4-turbo"];

/// Assistant selection forwarded with each prompt
///
/// With `use_openai` off (or no key) the backend answers with its built-in
/// model.
#[derive(Clone, PartialEq)]
pub struct AssistantConfig {
    pub use_openai: bool,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            use_openai: false,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

// Hand-written so the key never ends up in logs
impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("use_openai", &self.use_openai)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Assistant settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileAssistant {
    pub use_openai: Option<bool>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl AssistantConfig {
    /// Create from file config; an API key from the environment wins
    pub fn from_file(file: Option<FileAssistant>, env_api_key: Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let model = file.model.unwrap_or(defaults.model);
        if !KNOWN_MODELS.contains(&model.as_str()) {
            tracing::warn!("Unknown assistant model '{}', passing it through", model);
        }

        Self {
            use_openai: file.use_openai.unwrap_or(defaults.use_openai),
            model,
            api_key: env_api_key.or(file.api_key).filter(|k| !k.is_empty()),
        }
    }

    /// Whether prompts will be answered by the hosted model
    pub fn is_active(&self) -> bool {
        self.use_openai && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
