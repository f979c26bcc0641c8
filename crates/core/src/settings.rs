//! Persisted user settings
//!
//! The active UI theme lives in a [`SettingsStore`] handle that is opened once
//! at startup and passed to whoever needs it. Changes are written back to
//! `settings.toml` and pushed to every subscriber.
//!
//! ```rust
//! use imghost_core::settings::{SettingsStore, Theme};
//!
//! let store = SettingsStore::in_memory();
//! let updates = store.subscribe();
//!
//! store.set_theme(Theme::Nordic).unwrap();
//!
//! assert_eq!(store.theme(), Theme::Nordic);
//! assert_eq!(updates.try_recv().unwrap(), Theme::Nordic);
//! ```

use crate::config::user_config_dir;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Settings file name inside the user config directory
pub const SETTINGS_FILE: &str = "settings.toml";

/// UI colour theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Neon red on black
    #[default]
    Dark,
    /// Catppuccin mauve
    Catppuccin,
    /// Catppuccin Macchiato blue
    Macchiato,
    /// Nord frost
    Nordic,
    /// Gruvbox orange
    Gruvbox,
    /// Dracula purple
    Dracula,
    /// Tokyo Night blue
    Tokyo,
}

impl Theme {
    /// All themes, in menu order
    pub const ALL: [Theme; 7] = [
        Theme::Dark,
        Theme::Catppuccin,
        Theme::Macchiato,
        Theme::Nordic,
        Theme::Gruvbox,
        Theme::Dracula,
        Theme::Tokyo,
    ];

    /// Identifier used in the settings file
    pub fn id(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Catppuccin => "catppuccin",
            Theme::Macchiato => "macchiato",
            Theme::Nordic => "nordic",
            Theme::Gruvbox => "gruvbox",
            Theme::Dracula => "dracula",
            Theme::Tokyo => "tokyo",
        }
    }

    /// Name shown in menus
    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::Dark => "Neon Red",
            Theme::Catppuccin => "Catppuccin",
            Theme::Macchiato => "Macchiato",
            Theme::Nordic => "Nordic",
            Theme::Gruvbox => "Gruvbox",
            Theme::Dracula => "Dracula",
            Theme::Tokyo => "Tokyo",
        }
    }

    /// Accent colour as `#rrggbb`
    pub fn accent(&self) -> &'static str {
        match self {
            Theme::Dark => "#ff0000",
            Theme::Catppuccin => "#cba6f7",
            Theme::Macchiato => "#ed8796",
            Theme::Nordic => "#88c0d0",
            Theme::Gruvbox => "#fe8019",
            Theme::Dracula => "#ff79c6",
            Theme::Tokyo => "#7aa2f7",
        }
    }

    /// Accent colour as RGB components
    pub fn accent_rgb(&self) -> (u8, u8, u8) {
        let hex = &self.accent()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or_default();
        (channel(0), channel(2), channel(4))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Theme {
    type Err = Error;

    /// Accepts `nordic`, `Nordic` and the `theme-nordic` class name form.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let id = normalized.strip_prefix("theme-").unwrap_or(&normalized);

        Theme::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| Error::unknown_theme(s))
    }
}

/// Everything persisted in `settings.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Selected colour theme
    #[serde(default)]
    pub theme: Theme,
}

/// Shared handle to the user's settings
///
/// Clones share state. Reads never block on disk.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: Option<PathBuf>,
    settings: RwLock<Settings>,
    subscribers: Mutex<Vec<Sender<Theme>>>,
}

impl SettingsStore {
    /// Open the store backed by `path`
    ///
    /// A missing file yields defaults. An unreadable or invalid file also
    /// yields defaults, with a warning; it is overwritten on the next change.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match read_settings(&path) {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable settings file");
                Settings::default()
            }
        };
        tracing::debug!(path = %path.display(), theme = %settings.theme, "Settings loaded");

        Self::with_settings(Some(path), settings)
    }

    /// Open the store at [`default_path`], or keep settings in memory when
    /// there is no config directory
    pub fn open_default() -> Self {
        match default_path() {
            Some(path) => Self::open(path),
            None => {
                tracing::warn!("No config directory found; settings will not be saved");
                Self::in_memory()
            }
        }
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self::with_settings(None, Settings::default())
    }

    fn with_settings(path: Option<PathBuf>, settings: Settings) -> Self {
        Self {
            inner: Arc::new(Inner {
                path,
                settings: RwLock::new(settings),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Snapshot of all settings
    pub fn settings(&self) -> Settings {
        self.inner
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current theme
    pub fn theme(&self) -> Theme {
        self.inner
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .theme
    }

    /// Change the theme, persist it and notify subscribers
    ///
    /// Nothing changes in memory if writing the file fails.
    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        {
            let mut settings = self
                .inner
                .settings
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            let updated = Settings { theme, ..settings.clone() };
            if let Some(path) = &self.inner.path {
                write_settings(path, &updated)?;
            }
            *settings = updated;
        }

        tracing::info!(theme = %theme, "Theme changed");
        self.broadcast(theme);
        Ok(())
    }

    /// Receive every subsequent theme change
    pub fn subscribe(&self) -> Receiver<Theme> {
        let (tx, rx) = mpsc::channel();
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn broadcast(&self, theme: Theme) {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Dropped receivers make send fail
        subscribers.retain(|tx| tx.send(theme).is_ok());
    }
}

/// `<config dir>/imghost/settings.toml`
pub fn default_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(SETTINGS_FILE))
}

fn read_settings(path: &Path) -> Result<Option<Settings>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(toml::from_str(&content)?))
}

fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::settings(format!("Failed to create {}", parent.display())).with_source(e)
        })?;
    }

    let content = toml::to_string(settings)?;
    std::fs::write(path, content).map_err(|e| {
        Error::settings(format!("Failed to write settings to {}", path.display())).with_source(e)
    })
}
