//! User settings stored as settings.json in the app data directory

use crate::constants::{COUNTDOWN_SECS, DEFAULT_API_BASE_URL, PREVIEW_POLL_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Backend
    pub api_base_url: String,
    pub preview_poll_ms: u64,
    pub countdown_secs: u32,

    // Player
    pub player_name: String,

    // Paths
    pub cats_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            preview_poll_ms: PREVIEW_POLL_MS,
            countdown_secs: COUNTDOWN_SECS,
            player_name: String::new(),
            cats_dir: None,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    /// Backend URL, preferring a non-empty environment override
    pub fn base_url_with_override(&self, env_value: Option<String>) -> String {
        env_value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.api_base_url.clone())
    }

    pub fn cats_dir_or_default(&self) -> PathBuf {
        self.cats_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::utils::get_data_dir().join("cats"))
    }

    /// Poll interval clamped so a bad config cannot hammer the backend
    pub fn poll_interval_ms(&self) -> u64 {
        self.preview_poll_ms.max(100)
    }
}
