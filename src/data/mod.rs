// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    #[serde(rename = "BoardLabel", default)]
    pub board_label: String,
    #[serde(rename = "FriendlyName", default)]
    pub friendly_name: String,
    #[serde(rename = "TechnicalNameOrValue", default)]
    pub technical_value: String,
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Region", default)]
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchematicRecord {
    #[serde(rename = "SchematicName", default)]
    pub name: String,
    #[serde(rename = "SchematicImageFile", default)]
    pub image_file: String,
    #[serde(rename = "MainImageHighlightColor", default)]
    pub main_highlight_color: String,
    #[serde(rename = "MainHighlightOpacity", default)]
    pub main_highlight_opacity: String,
    #[serde(rename = "ThumbnailImageHighlightColor", default)]
    pub thumbnail_highlight_color: String,
    #[serde(rename = "ThumbnailHighlightOpacity", default)]
    pub thumbnail_highlight_opacity: String,
}

/// One highlight rectangle as it appears in the data files. Coordinates are
/// kept as text and parsed when the highlight tables are built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighlightRecord {
    #[serde(rename = "SchematicName", default)]
    pub schematic_name: String,
    #[serde(rename = "BoardLabel", default)]
    pub board_label: String,
    #[serde(rename = "Region", default)]
    pub region: String,
    #[serde(rename = "X", default)]
    pub x: String,
    #[serde(rename = "Y", default)]
    pub y: String,
    #[serde(rename = "Width", default)]
    pub width: String,
    #[serde(rename = "Height", default)]
    pub height: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardData {
    pub components: Vec<ComponentRecord>,
    pub schematics: Vec<SchematicRecord>,
    pub highlights: Vec<HighlightRecord>,
}

/// Row of the hardware/board catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardEntry {
    #[serde(rename = "Hardware", default)]
    pub hardware: String,
    #[serde(rename = "Board", default)]
    pub board: String,
    #[serde(rename = "Folder", default)]
    pub folder: String,
}

/// Identifies one board for persistence and loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardKey {
    pub hardware: String,
    pub board: String,
}

impl BoardKey {
    pub fn new(hardware: impl Into<String>, board: impl Into<String>) -> Self {
        Self {
            hardware: hardware.into(),
            board: board.into(),
        }
    }

    /// `hardware|board`, the key used by the settings store.
    pub fn storage_key(&self) -> String {
        format!("{}|{}", self.hardware, self.board)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub entries: Vec<BoardEntry>,
}

impl Catalog {
    /// Distinct hardware names in first-seen order.
    pub fn hardware_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in &self.entries {
            let name = entry.hardware.trim();
            if name.is_empty() {
                continue;
            }
            if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                names.push(name.to_string());
            }
        }
        names
    }

    pub fn boards_for(&self, hardware: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.hardware.trim().eq_ignore_ascii_case(hardware.trim()))
            .map(|e| e.board.trim())
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn find(&self, key: &BoardKey) -> Option<&BoardEntry> {
        self.entries.iter().find(|e| {
            e.hardware.trim().eq_ignore_ascii_case(key.hardware.trim())
                && e.board.trim().eq_ignore_ascii_case(key.board.trim())
        })
    }
}

/// Supplier of board records. Implementations are called from worker
/// threads, hence `Send + Sync`.
pub trait BoardSource: Send + Sync {
    fn catalog(&self) -> Result<Catalog>;

    fn load_board(&self, key: &BoardKey) -> Result<BoardData>;

    /// Resolves an image reference from a schematic record to a file path.
    fn resolve_image(&self, key: &BoardKey, image_file: &str) -> std::path::PathBuf;
}

pub mod reader;
