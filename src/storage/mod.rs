// Storage module - client-local key/value state
//
// A tiny TOML file of string keys to string values that survives restarts.
// Two keys are used today:
//
//   last_active_chat = "<conversation id>"
//   app_theme        = "dark"
//
// Every mutation writes the whole file back. Clones share the same map, so the
// controller and the theme provider can each hold a handle without
// overwriting one another's keys.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Key holding the id of the conversation that was open last
pub const ACTIVE_CHAT_KEY: &str = "last_active_chat";

/// Key holding the selected theme name
pub const THEME_KEY: &str = "app_theme";

struct Inner {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

/// Handle to the persisted key/value state
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<Mutex<Inner>>,
}

impl LocalStore {
    /// Open (or lazily create) the state file at `path`
    ///
    /// A missing file is an empty store. A file that cannot be read or parsed
    /// is logged and treated as empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load_values(&path) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Ignoring unreadable state file {:?}: {:#}", path, e);
                BTreeMap::new()
            }
        };

        Self {
            inner: Arc::new(Mutex::new(Inner {
                path: Some(path),
                values,
            })),
        }
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                path: None,
                values: BTreeMap::new(),
            })),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().values.get(key).cloned()
    }

    /// Set a value and write through
    ///
    /// The in-memory value is updated even if the write fails, so the running
    /// session stays consistent; only the next start would miss it.
    pub fn set(&self, key: &str, value: &str) {
        let mut inner = self.lock();
        if inner.values.get(key).map(String::as_str) == Some(value) {
            return;
        }
        inner.values.insert(key.to_string(), value.to_string());
        flush(&inner);
    }

    /// Remove a value and write through
    pub fn remove(&self, key: &str) {
        let mut inner = self.lock();
        if inner.values.remove(key).is_some() {
            flush(&inner);
        }
    }

    /// Set when `Some`, remove when `None`
    pub fn put(&self, key: &str, value: Option<&str>) {
        match value {
            Some(v) => self.set(key, v),
            None => self.remove(key),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_values(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn flush(inner: &Inner) {
    let Some(path) = &inner.path else {
        return;
    };
    if let Err(e) = write_values(path, &inner.values) {
        tracing::error!("Failed to persist state to {:?}: {:#}", path, e);
    }
}

fn write_values(path: &Path, values: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create state directory")?;
    }
    let content = toml::to_string(values).context("Failed to serialize state")?;
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}
