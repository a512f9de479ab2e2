// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Per-board thumbnail cache.
//!
//! Each schematic keeps one base bitmap for the lifetime of the board and one
//! exposed bitmap that is either the base itself or a highlighted variant.
//! Bitmaps are shared through `Arc`, so a variant handed to the UI stays alive
//! until the UI drops its copy even after the cache has moved on.

use image::RgbaImage;
use std::path::PathBuf;
use std::sync::Arc;

use crate::filter::CaseKey;

#[derive(Debug, Clone)]
pub struct SchematicThumbnail {
    pub name: String,
    pub image_path: PathBuf,
    base: Option<Arc<RgbaImage>>,
    exposed: Option<Arc<RgbaImage>>,
    /// Pixel size of the full-resolution image the thumbnail was scaled from.
    original_size: (u32, u32),
    pub visual_opacity: f64,
    pub is_match: bool,
    /// Bumped whenever the exposed bitmap changes.
    revision: u64,
}

impl SchematicThumbnail {
    pub fn new(
        name: impl Into<String>,
        image_path: impl Into<PathBuf>,
        base: Option<RgbaImage>,
        original_size: (u32, u32),
    ) -> Self {
        let base = base.map(Arc::new);
        Self {
            name: name.into(),
            image_path: image_path.into(),
            exposed: base.clone(),
            base,
            original_size,
            visual_opacity: 1.0,
            is_match: false,
            revision: 0,
        }
    }

    pub fn base(&self) -> Option<&Arc<RgbaImage>> {
        self.base.as_ref()
    }

    /// The bitmap the UI should show.
    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        self.exposed.as_ref()
    }

    pub fn original_size(&self) -> (u32, u32) {
        self.original_size
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_showing_base(&self) -> bool {
        match (&self.exposed, &self.base) {
            (Some(exposed), Some(base)) => Arc::ptr_eq(exposed, base),
            (None, None) => true,
            _ => false,
        }
    }

    /// Exposes a new highlighted variant. The previous variant is released
    /// only after the new one is installed.
    pub fn install_variant(&mut self, variant: RgbaImage) {
        let previous = self.exposed.replace(Arc::new(variant));
        self.revision += 1;
        drop(previous);
    }

    /// Exposes the base bitmap again, releasing any highlighted variant.
    pub fn restore_base(&mut self) {
        if self.is_showing_base() {
            return;
        }
        let previous = std::mem::replace(&mut self.exposed, self.base.clone());
        self.revision += 1;
        drop(previous);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThumbnailCache {
    items: Vec<SchematicThumbnail>,
}

impl ThumbnailCache {
    pub fn new(items: Vec<SchematicThumbnail>) -> Self {
        Self { items }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchematicThumbnail> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SchematicThumbnail> {
        self.items.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&SchematicThumbnail> {
        self.items.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&SchematicThumbnail> {
        let key = CaseKey::new(name);
        self.items.iter().find(|t| CaseKey::new(&t.name) == key)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        let key = CaseKey::new(name);
        self.items.iter().position(|t| CaseKey::new(&t.name) == key)
    }
}
