// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use super::{BoardData, BoardEntry, BoardKey, BoardSource, Catalog};
use crate::error::{Result, ViewerError};

pub const CATALOG_FILE: &str = "boards.csv";
pub const COMPONENTS_FILE: &str = "components.csv";
pub const SCHEMATICS_FILE: &str = "schematics.csv";
pub const HIGHLIGHTS_FILE: &str = "highlights.csv";

/// Reads a CSV table with a header row into typed records.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ViewerError::table(path, e))?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.map_err(|e| ViewerError::table(path, e))?);
    }
    Ok(rows)
}

/// Board data laid out as CSV files under a data root:
///
/// ```text
/// <root>/boards.csv
/// <root>/<folder>/components.csv
/// <root>/<folder>/schematics.csv
/// <root>/<folder>/highlights.csv
/// ```
///
/// Image paths in `schematics.csv` are relative to the data root.
#[derive(Debug, Clone)]
pub struct CsvBoardSource {
    root: PathBuf,
}

impl CsvBoardSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn board_folder(&self, entry: &BoardEntry) -> PathBuf {
        join_relative(&self.root, &entry.folder)
    }
}

/// Joins a `/`-separated relative reference onto `base`.
fn join_relative(base: &Path, reference: &str) -> PathBuf {
    reference
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .fold(base.to_path_buf(), |path, part| path.join(part))
}

impl BoardSource for CsvBoardSource {
    fn catalog(&self) -> Result<Catalog> {
        let path = self.root.join(CATALOG_FILE);
        log::info!("[LOAD] Loading board catalog: {}", path.display());
        let entries: Vec<BoardEntry> = read_table(&path)?;
        log::info!("[INFO] Catalog lists {} boards", entries.len());
        Ok(Catalog { entries })
    }

    fn load_board(&self, key: &BoardKey) -> Result<BoardData> {
        let catalog = self.catalog()?;
        let entry = catalog
            .find(key)
            .ok_or_else(|| ViewerError::UnknownBoard {
                hardware: key.hardware.clone(),
                board: key.board.clone(),
            })?;

        let folder = self.board_folder(entry);
        log::info!("[LOAD] Loading board data: {}", folder.display());

        let components = read_table(&folder.join(COMPONENTS_FILE))?;
        let schematics = read_table(&folder.join(SCHEMATICS_FILE))?;

        let highlights_path = folder.join(HIGHLIGHTS_FILE);
        let highlights = if highlights_path.exists() {
            read_table(&highlights_path)?
        } else {
            log::warn!("[WARN] No highlight table at {}", highlights_path.display());
            Vec::new()
        };

        let data = BoardData {
            components,
            schematics,
            highlights,
        };
        log::info!(
            "[INFO] Board {}: {} components, {} schematics, {} highlight rects",
            key.storage_key(),
            data.components.len(),
            data.schematics.len(),
            data.highlights.len()
        );
        Ok(data)
    }

    fn resolve_image(&self, _key: &BoardKey, image_file: &str) -> PathBuf {
        join_relative(&self.root, image_file)
    }
}
