use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Idle time after the last keystroke before a budget cell is saved
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(2);
/// How long a cell shows as saved
pub const DEFAULT_SAVED_FLASH: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Session and pending budget input live here
    pub storage_dir: PathBuf,
    pub autosave_delay: Duration,
    pub saved_flash: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            storage_dir: PathBuf::from(".dashboard"),
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            saved_flash: DEFAULT_SAVED_FLASH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    base_url: Option<String>,
    storage_dir: Option<PathBuf>,
    autosave_delay_ms: Option<u64>,
    saved_flash_ms: Option<u64>,
}

impl ClientConfig {
    /// Parse a `client.toml`; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        let defaults = Self::default();

        Ok(Self {
            base_url: file
                .base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            storage_dir: file.storage_dir.unwrap_or(defaults.storage_dir),
            autosave_delay: file
                .autosave_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.autosave_delay),
            saved_flash: file
                .saved_flash_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.saved_flash),
        })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!("{} not found, using default client config", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn session_path(&self) -> PathBuf {
        self.storage_dir.join("session.json")
    }

    pub fn pending_changes_path(&self) -> PathBuf {
        self.storage_dir.join("budget_pending_changes.json")
    }
}
