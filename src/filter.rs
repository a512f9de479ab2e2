// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Derived lookup tables built from board records: the category list, the
//! visible component rows, and per-schematic highlight rectangles.
//!
//! Schematic names, board labels, categories and regions all compare
//! case-insensitively through [`CaseKey`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::data::{BoardData, ComponentRecord, HighlightRecord};
use crate::geometry::Rect;
use crate::metadata::parse_number;

/// Separator between the fields of a component selection key.
const KEY_SEPARATOR: &str = "\u{1F}";

/// Case-insensitive string key. Keeps the original spelling for display.
#[derive(Clone)]
pub struct CaseKey {
    original: String,
    folded: String,
}

impl CaseKey {
    pub fn new(text: &str) -> Self {
        let original = text.trim().to_string();
        let folded = original.to_lowercase();
        Self { original, folded }
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl PartialEq for CaseKey {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for CaseKey {}

impl std::hash::Hash for CaseKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl fmt::Debug for CaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.original)
    }
}

impl From<&str> for CaseKey {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Label → rectangles for one schematic, in record order.
pub type LabelRects = HashMap<CaseKey, Vec<Rect>>;

/// Schematic → label → rectangles.
pub type HighlightTable = HashMap<CaseKey, LabelRects>;

/// Selection key of a component row: label, name, value and region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey(CaseKey);

impl SelectionKey {
    pub fn from_record(component: &ComponentRecord) -> Self {
        let joined = [
            component.board_label.trim(),
            component.friendly_name.trim(),
            component.technical_value.trim(),
            component.region.trim(),
        ]
        .join(KEY_SEPARATOR);
        Self(CaseKey::new(&joined))
    }

    /// Restores a key previously written by [`SelectionKey::as_str`].
    pub fn from_stored(text: &str) -> Self {
        Self(CaseKey::new(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// One row of the component list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentItem {
    pub board_label: String,
    /// `label | name | value` built from the non-empty parts.
    pub display_text: String,
    pub key: SelectionKey,
}

impl ComponentItem {
    pub fn label_key(&self) -> CaseKey {
        CaseKey::new(&self.board_label)
    }
}

/// A component is listed when its region is empty or matches `region`.
pub fn is_visible_in_region(component_region: &str, region: &str) -> bool {
    let component_region = CaseKey::new(component_region);
    component_region.as_str().is_empty() || component_region == CaseKey::new(region)
}

/// Distinct categories in the order they first appear.
pub fn distinct_categories(board: &BoardData) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for component in &board.components {
        let category = component.category.trim();
        if category.is_empty() {
            continue;
        }
        if seen.insert(CaseKey::new(category)) {
            categories.push(category.to_string());
        }
    }

    categories
}

/// Component rows visible in `region` whose category is in `categories`.
pub fn component_items(
    board: &BoardData,
    region: &str,
    categories: &HashSet<CaseKey>,
) -> Vec<ComponentItem> {
    let mut items = Vec::new();

    for component in &board.components {
        if !is_visible_in_region(&component.region, region) {
            continue;
        }
        if !categories.contains(&CaseKey::new(&component.category)) {
            continue;
        }

        let parts: Vec<&str> = [
            component.board_label.trim(),
            component.friendly_name.trim(),
            component.technical_value.trim(),
        ]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();

        if parts.is_empty() {
            continue;
        }

        items.push(ComponentItem {
            board_label: component.board_label.trim().to_string(),
            display_text: parts.join(" | "),
            key: SelectionKey::from_record(component),
        });
    }

    items
}

/// Parses the four coordinate fields. `None` for unparsable numbers or a
/// non-positive extent.
pub fn parse_highlight_rect(record: &HighlightRecord) -> Option<Rect> {
    let x = parse_number(&record.x)?;
    let y = parse_number(&record.y)?;
    let width = parse_number(&record.width)?;
    let height = parse_number(&record.height)?;

    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    Some(Rect::new(x, y, width, height))
}

/// Groups highlight rectangles by schematic and label for `region`.
///
/// A rectangle tagged with a region applies only to that region. An untagged
/// rectangle follows its component: visible when no component row lists a
/// region for the label, or when one of the listed regions matches.
pub fn build_highlight_table(board: &BoardData, region: &str) -> HighlightTable {
    let mut regions_by_label: HashMap<CaseKey, HashSet<CaseKey>> = HashMap::new();
    for component in &board.components {
        if component.board_label.trim().is_empty() {
            continue;
        }
        let regions = regions_by_label
            .entry(CaseKey::new(&component.board_label))
            .or_default();
        if !component.region.trim().is_empty() {
            regions.insert(CaseKey::new(&component.region));
        }
    }

    let active = CaseKey::new(region);
    let label_visible = |label: &CaseKey| match regions_by_label.get(label) {
        Some(regions) => regions.is_empty() || regions.contains(&active),
        None => true,
    };

    let mut table = HighlightTable::new();
    let mut dropped = 0usize;

    for record in &board.highlights {
        if record.schematic_name.trim().is_empty() || record.board_label.trim().is_empty() {
            continue;
        }

        let label = CaseKey::new(&record.board_label);
        let visible = if record.region.trim().is_empty() {
            label_visible(&label)
        } else {
            CaseKey::new(&record.region) == active
        };
        if !visible {
            continue;
        }

        let Some(rect) = parse_highlight_rect(record) else {
            dropped += 1;
            continue;
        };

        table
            .entry(CaseKey::new(&record.schematic_name))
            .or_default()
            .entry(label)
            .or_default()
            .push(rect);
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} malformed highlight rectangles");
    }

    table
}

/// Labels of the rows whose keys are in `selected`, in row order, without
/// empty labels.
pub fn surviving_labels(items: &[ComponentItem], selected: &HashSet<SelectionKey>) -> Vec<String> {
    items
        .iter()
        .filter(|item| selected.contains(&item.key))
        .map(|item| item.board_label.clone())
        .filter(|label| !label.is_empty())
        .collect()
}
