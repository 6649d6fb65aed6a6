//! Display preferences.
//!
//! A small JSON key-value file holds UI settings. Only the dark-mode flag is
//! interpreted here; other keys in the file are carried through untouched.
//! Changes are broadcast on a `watch` channel so open views can re-render.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

/// Key the dark-mode flag is stored under.
pub const DARK_MODE_KEY: &str = "darkMode";

/// Dark mode is on until the user turns it off.
const DARK_MODE_DEFAULT: bool = true;

/// Preference persistence errors.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preferences file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("preferences file encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Process-wide display preferences.
pub struct DisplayPreferences {
    path: PathBuf,
    dark_mode: watch::Sender<bool>,
    write_lock: Mutex<()>,
}

impl DisplayPreferences {
    /// Load preferences from `path`. A missing, unreadable or malformed file
    /// falls back to the defaults.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let dark_mode = match read_map(&path).await {
            Ok(map) => match map.get(DARK_MODE_KEY) {
                Some(Value::Bool(enabled)) => *enabled,
                Some(other) => {
                    warn!(value = %other, "ignoring non-boolean dark mode preference");
                    DARK_MODE_DEFAULT
                }
                None => DARK_MODE_DEFAULT,
            },
            Err(PreferenceError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no preferences file, using defaults");
                DARK_MODE_DEFAULT
            }
            Err(e) => {
                warn!(error = %e, "unreadable preferences file, using defaults");
                DARK_MODE_DEFAULT
            }
        };

        let (sender, _) = watch::channel(dark_mode);
        Self {
            path,
            dark_mode: sender,
            write_lock: Mutex::new(()),
        }
    }

    /// Current dark-mode flag.
    #[must_use]
    pub fn dark_mode(&self) -> bool {
        *self.dark_mode.borrow()
    }

    /// Receive every subsequent change to the dark-mode flag.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.dark_mode.subscribe()
    }

    /// Persist the dark-mode flag and notify subscribers.
    ///
    /// Subscribers are only notified once the file has been written.
    ///
    /// # Errors
    ///
    /// Returns `PreferenceError` if the file cannot be written.
    #[instrument(skip(self))]
    pub async fn set_dark_mode(&self, enabled: bool) -> Result<(), PreferenceError> {
        let _guard = self.write_lock.lock().await;

        let mut map = read_map(&self.path).await.unwrap_or_default();
        map.insert(DARK_MODE_KEY.to_owned(), Value::Bool(enabled));
        let encoded = serde_json::to_vec_pretty(&map)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, encoded).await?;

        self.dark_mode.send_if_modified(|current| {
            let changed = *current != enabled;
            *current = enabled;
            changed
        });
        Ok(())
    }
}

async fn read_map(path: &Path) -> Result<Map<String, Value>, PreferenceError> {
    let raw = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&raw)?)
}
