// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Tunable viewer values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, ViewerError};
use crate::metadata::Color;

/// File name looked up in the data root for overrides.
pub const CONFIG_FILE_NAME: &str = "viewer.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Multiplier applied per zoom step.
    pub zoom_factor: f64,
    /// Zooming below this scale snaps the view back to identity.
    pub min_zoom: f64,
    /// Zoom steps that would exceed this scale are rejected.
    pub max_zoom: f64,
    /// Base thumbnails are downscaled to at most this many pixels wide.
    pub thumbnail_max_width: u32,
    pub blink_interval_ms: u64,
    /// Visual opacity for thumbnails without a match while something is selected.
    pub dimmed_thumbnail_opacity: f64,
    pub default_highlight_color: Color,
    pub default_highlight_opacity: f64,
    pub default_region: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.5,
            min_zoom: 0.9,
            max_zoom: 20.0,
            thumbnail_max_width: 800,
            blink_interval_ms: 450,
            dimmed_thumbnail_opacity: 0.35,
            default_highlight_color: Color::INDIAN_RED,
            default_highlight_opacity: 0.20,
            default_region: "PAL".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ViewerError::io(path, e))?;
        serde_json::from_str(&content).map_err(|source| ViewerError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `viewer.json` from `data_root`, falling back to defaults when it
    /// is missing or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(data_root: P) -> Self {
        let path = data_root.as_ref().join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded viewer configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default configuration");
                Self::default()
            }
        }
    }
}
