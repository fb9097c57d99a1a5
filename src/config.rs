use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::outbox::Outbox;
use crate::state::FilterParameters;
use crate::submit::DEFAULT_JPEG_QUALITY;

/// Overrides where posts are written, ahead of the config file.
pub const OUTBOX_DIR_ENV: &str = "PHOTOPOST_OUTBOX_DIR";

#[derive(Debug, Default, Serialize, Deserialize)]
/// Persisted application settings for Photopost.
pub struct AppConfig {
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    pub library_dir: Option<PathBuf>,
    pub outbox_dir: Option<PathBuf>,
    pub jpeg_quality: Option<u8>,
    pub initial_filters: Option<FilterParameters>,
}

impl AppConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("photopost").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring malformed config");
                Self::default()
            }
        }
    }

    /// Writes config to disk, ignoring filesystem/serialization errors.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(s) = toml::to_string_pretty(self) {
            let _ = std::fs::write(&path, s);
        }
    }

    pub fn library_dir(&self) -> PathBuf {
        self.library_dir
            .clone()
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn outbox_dir(&self) -> PathBuf {
        if let Ok(raw) = std::env::var(OUTBOX_DIR_ENV) {
            if !raw.trim().is_empty() {
                return PathBuf::from(raw);
            }
        }
        self.outbox_dir.clone().unwrap_or_else(Outbox::default_dir)
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
            .unwrap_or(DEFAULT_JPEG_QUALITY)
            .clamp(1, 100)
    }

    pub fn initial_filters(&self) -> FilterParameters {
        self.initial_filters.unwrap_or_default()
    }
}
