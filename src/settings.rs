// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Persisted user choices.
//!
//! Per-board entries are keyed by [`BoardKey::storage_key`] (`hardware|board`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::data::BoardKey;
use crate::error::{Result, ViewerError};

pub const SETTINGS_FILE_NAME: &str = "viewer-settings.json";

/// Storage for selections that survive a restart.
///
/// Setters never fail: a store that cannot persist logs and keeps going.
pub trait SettingsStore {
    fn last_hardware(&self) -> Option<String>;
    fn set_last_hardware(&mut self, hardware: &str);

    fn last_board(&self, hardware: &str) -> Option<String>;
    fn set_last_board(&mut self, hardware: &str, board: &str);

    fn region(&self) -> Option<String>;
    fn set_region(&mut self, region: &str);

    fn categories(&self, board: &BoardKey) -> Option<Vec<String>>;
    fn set_categories(&mut self, board: &BoardKey, categories: &[String]);

    fn selected_components(&self, board: &BoardKey) -> Option<Vec<String>>;
    fn set_selected_components(&mut self, board: &BoardKey, keys: &[String]);

    fn last_schematic(&self, board: &BoardKey) -> Option<String>;
    fn set_last_schematic(&mut self, board: &BoardKey, schematic: &str);
}

/// Serialized form shared by both stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    pub last_hardware: Option<String>,
    pub last_board: HashMap<String, String>,
    pub region: Option<String>,
    pub categories: HashMap<String, Vec<String>>,
    pub selected_components: HashMap<String, Vec<String>>,
    pub last_schematic: HashMap<String, String>,
}

impl StoredSettings {
    /// Hardware names are looked up case-insensitively, like the catalog.
    fn hardware_key(hardware: &str) -> String {
        hardware.trim().to_lowercase()
    }
}

impl SettingsStore for StoredSettings {
    fn last_hardware(&self) -> Option<String> {
        self.last_hardware.clone()
    }

    fn set_last_hardware(&mut self, hardware: &str) {
        self.last_hardware = Some(hardware.to_string());
    }

    fn last_board(&self, hardware: &str) -> Option<String> {
        self.last_board.get(&Self::hardware_key(hardware)).cloned()
    }

    fn set_last_board(&mut self, hardware: &str, board: &str) {
        self.last_board
            .insert(Self::hardware_key(hardware), board.to_string());
    }

    fn region(&self) -> Option<String> {
        self.region.clone()
    }

    fn set_region(&mut self, region: &str) {
        self.region = Some(region.to_string());
    }

    fn categories(&self, board: &BoardKey) -> Option<Vec<String>> {
        self.categories.get(&board.storage_key()).cloned()
    }

    fn set_categories(&mut self, board: &BoardKey, categories: &[String]) {
        self.categories
            .insert(board.storage_key(), categories.to_vec());
    }

    fn selected_components(&self, board: &BoardKey) -> Option<Vec<String>> {
        self.selected_components.get(&board.storage_key()).cloned()
    }

    fn set_selected_components(&mut self, board: &BoardKey, keys: &[String]) {
        self.selected_components
            .insert(board.storage_key(), keys.to_vec());
    }

    fn last_schematic(&self, board: &BoardKey) -> Option<String> {
        self.last_schematic.get(&board.storage_key()).cloned()
    }

    fn set_last_schematic(&mut self, board: &BoardKey, schematic: &str) {
        self.last_schematic
            .insert(board.storage_key(), schematic.to_string());
    }
}

/// In-memory store, mostly for tests.
pub type MemoryStore = StoredSettings;

/// JSON file rewritten after every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    settings: StoredSettings,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let settings = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| ViewerError::io(&path, e))?;
            serde_json::from_str(&content).map_err(|source| ViewerError::Settings {
                path: path.clone(),
                source,
            })?
        } else {
            StoredSettings::default()
        };
        Ok(Self { path, settings })
    }

    /// Like [`JsonFileStore::open`] but starts empty on any error.
    pub fn open_or_default<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("{e}; starting with empty settings");
                Self {
                    path,
                    settings: StoredSettings::default(),
                }
            }
        }
    }

    fn save(&self) {
        let json = match serde_json::to_string_pretty(&self.settings) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize settings: {e}");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, json) {
            log::warn!("Failed to write settings {}: {e}", self.path.display());
        }
    }

    fn update(&mut self, change: impl FnOnce(&mut StoredSettings)) {
        change(&mut self.settings);
        self.save();
    }
}

impl SettingsStore for JsonFileStore {
    fn last_hardware(&self) -> Option<String> {
        self.settings.last_hardware()
    }

    fn set_last_hardware(&mut self, hardware: &str) {
        self.update(|s| s.set_last_hardware(hardware));
    }

    fn last_board(&self, hardware: &str) -> Option<String> {
        self.settings.last_board(hardware)
    }

    fn set_last_board(&mut self, hardware: &str, board: &str) {
        self.update(|s| s.set_last_board(hardware, board));
    }

    fn region(&self) -> Option<String> {
        self.settings.region()
    }

    fn set_region(&mut self, region: &str) {
        self.update(|s| s.set_region(region));
    }

    fn categories(&self, board: &BoardKey) -> Option<Vec<String>> {
        self.settings.categories(board)
    }

    fn set_categories(&mut self, board: &BoardKey, categories: &[String]) {
        self.update(|s| s.set_categories(board, categories));
    }

    fn selected_components(&self, board: &BoardKey) -> Option<Vec<String>> {
        self.settings.selected_components(board)
    }

    fn set_selected_components(&mut self, board: &BoardKey, keys: &[String]) {
        self.update(|s| s.set_selected_components(board, keys));
    }

    fn last_schematic(&self, board: &BoardKey) -> Option<String> {
        self.settings.last_schematic(board)
    }

    fn set_last_schematic(&mut self, board: &BoardKey, schematic: &str) {
        self.update(|s| s.set_last_schematic(board, schematic));
    }
}
