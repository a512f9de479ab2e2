// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use schematic_viewer::compose::HighlightStyle;
use schematic_viewer::data::{ComponentRecord, HighlightRecord, SchematicRecord};
use schematic_viewer::filter::{build_highlight_table, CaseKey, SelectionKey};
use schematic_viewer::metadata::parse_opacity_or;
use schematic_viewer::{
    BoardData, BoardKey, BoardSource, Catalog, MemoryStore, Result, SelectionSync, SettingsStore,
    SyncEvent, ViewerConfig, ViewerError,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Board records served from memory. Image paths do not exist, so every
/// schematic loads without a bitmap.
struct StaticSource {
    boards: HashMap<String, BoardData>,
}

impl StaticSource {
    fn new(boards: Vec<(BoardKey, BoardData)>) -> Self {
        Self {
            boards: boards
                .into_iter()
                .map(|(key, data)| (key.storage_key(), data))
                .collect(),
        }
    }
}

impl BoardSource for StaticSource {
    fn catalog(&self) -> Result<Catalog> {
        Ok(Catalog::default())
    }

    fn load_board(&self, key: &BoardKey) -> Result<BoardData> {
        self.boards
            .get(&key.storage_key())
            .cloned()
            .ok_or_else(|| ViewerError::UnknownBoard {
                hardware: key.hardware.clone(),
                board: key.board.clone(),
            })
    }

    fn resolve_image(&self, _key: &BoardKey, image_file: &str) -> PathBuf {
        std::env::temp_dir()
            .join("schematic_viewer_missing")
            .join(image_file)
    }
}

fn create_component(label: &str, name: &str, category: &str, region: &str) -> ComponentRecord {
    ComponentRecord {
        board_label: label.to_string(),
        friendly_name: name.to_string(),
        technical_value: String::new(),
        category: category.to_string(),
        region: region.to_string(),
    }
}

fn create_highlight(schematic: &str, label: &str, region: &str, x: &str) -> HighlightRecord {
    HighlightRecord {
        schematic_name: schematic.to_string(),
        board_label: label.to_string(),
        region: region.to_string(),
        x: x.to_string(),
        y: "10".to_string(),
        width: "20".to_string(),
        height: "20".to_string(),
    }
}

fn create_schematic(name: &str) -> SchematicRecord {
    SchematicRecord {
        name: name.to_string(),
        image_file: format!("{name}.png"),
        ..Default::default()
    }
}

fn c64_key() -> BoardKey {
    BoardKey::new("C64", "250407")
}

fn create_c64_board() -> BoardData {
    BoardData {
        components: vec![
            create_component("U1", "CPU", "Logic", ""),
            create_component("U2", "RAM", "Memory", ""),
            create_component("U3", "CIA", "Logic", ""),
            create_component("R1", "Resistor PAL", "Passives", "PAL"),
            create_component("R1", "Resistor NTSC", "Passives", "NTSC"),
        ],
        schematics: vec![create_schematic("Main"), create_schematic("Video")],
        highlights: vec![
            create_highlight("Main", "U1", "", "0"),
            create_highlight("Main", "U2", "", "40"),
            create_highlight("Video", "U3", "", "0"),
            create_highlight("Video", "R1", "NTSC", "80"),
            create_highlight("Main", "U3", "", "oops"),
        ],
    }
}

fn create_sync() -> SelectionSync {
    let source = StaticSource::new(vec![(c64_key(), create_c64_board())]);
    let mut sync = SelectionSync::new(ViewerConfig::default(), Box::new(MemoryStore::default()));
    sync.change_board(c64_key(), &source).unwrap();
    sync
}

fn key_of(sync: &SelectionSync, label: &str, name: &str) -> SelectionKey {
    sync.items()
        .iter()
        .find(|i| i.board_label == label && i.display_text.contains(name))
        .map(|i| i.key.clone())
        .unwrap()
}

#[test]
fn test_board_load_defaults() {
    let sync = create_sync();

    assert_eq!(sync.region(), "PAL");
    assert_eq!(sync.categories(), ["Logic", "Memory", "Passives"]);
    assert_eq!(sync.active_categories().len(), 3);
    // R1 NTSC is hidden in PAL
    assert_eq!(sync.items().len(), 4);
    assert_eq!(sync.thumbnails().len(), 2);
    assert!(sync.thumbnails().iter().all(|t| t.image().is_none()));
    assert_eq!(sync.displayed_schematic(), Some("Main"));
}

#[test]
fn test_selection_survives_category_changes() {
    let mut sync = create_sync();
    let u1 = key_of(&sync, "U1", "CPU");
    let u2 = key_of(&sync, "U2", "RAM");
    let u3 = key_of(&sync, "U3", "CIA");
    sync.set_selection([u1.clone(), u2.clone(), u3.clone()]);
    assert_eq!(sync.selected_keys().len(), 3);

    // Hiding Memory moves U3 up one row; it stays selected by key
    sync.set_categories(&["Logic".to_string()]);
    assert_eq!(sync.items().len(), 2);
    assert!(sync.is_selected(&u1));
    assert!(sync.is_selected(&u3));
    assert!(!sync.is_selected(&u2));

    // Rows that left the list do not come back selected
    sync.set_categories(&["Logic".to_string(), "Memory".to_string()]);
    assert!(sync.is_selected(&u1));
    assert!(!sync.is_selected(&u2));
}

#[test]
fn test_empty_selection_has_no_index() {
    let mut sync = create_sync();
    assert!(sync.index_for("Main").is_none());
    assert!(sync.overlay_quads().is_empty());

    let u2 = key_of(&sync, "U2", "RAM");
    sync.set_selection([u2]);
    assert_eq!(sync.index_for("Main").map(|i| i.len()), Some(1));
    assert!(sync.index_for("Video").is_none());

    sync.clear_selection();
    assert!(sync.index_for("Main").is_none());
    assert!(sync.overlay_quads().is_empty());
    assert!(!sync.has_selection());
}

#[test]
fn test_malformed_rects_are_dropped() {
    let table = build_highlight_table(&create_c64_board(), "PAL");
    let main = &table[&CaseKey::new("main")];
    assert!(main.get(&CaseKey::new("U3")).is_none());
    assert_eq!(main[&CaseKey::new("u1")].len(), 1);
}

#[test]
fn test_region_switch_refilters() {
    let mut sync = create_sync();
    let r1_pal = key_of(&sync, "R1", "PAL");
    sync.set_selection([r1_pal.clone()]);
    // The only R1 rectangle is tagged NTSC
    assert!(sync.index_for("Video").is_none());
    assert!(sync.has_selection());

    sync.set_region("NTSC");
    assert_eq!(sync.settings().region().as_deref(), Some("NTSC"));
    assert!(sync.items().iter().all(|i| i.key != r1_pal));
    assert!(sync.selected_keys().is_empty());

    let r1_ntsc = key_of(&sync, "R1", "NTSC");
    sync.set_selection([r1_ntsc]);
    let index = sync.index_for("Video").unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.rects()[0].x, 80.0);
}

#[test]
fn test_toggle_and_select_by_label() {
    let mut sync = create_sync();
    sync.drain_events();

    sync.toggle_label("u1");
    assert_eq!(sync.selected_keys().len(), 1);
    sync.toggle_label("U1");
    assert!(sync.selected_keys().is_empty());

    sync.select_label("U2", "U2 | RAM");
    sync.select_label("U3", "U3 | CIA");
    assert_eq!(sync.selected_keys().len(), 2);

    let events = sync.drain_events();
    assert!(events.contains(&SyncEvent::SelectionChanged));
    assert!(events.contains(&SyncEvent::OpenDetail {
        label: "U3".to_string(),
        display_text: "U3 | CIA".to_string(),
    }));

    // Unknown labels change nothing
    sync.select_label("X99", "");
    assert!(sync.drain_events().is_empty());
}

#[test]
fn test_selection_is_persisted_and_restored() {
    let source = StaticSource::new(vec![(c64_key(), create_c64_board())]);
    let mut sync = SelectionSync::new(ViewerConfig::default(), Box::new(MemoryStore::default()));
    sync.change_board(c64_key(), &source).unwrap();

    let u3 = key_of(&sync, "U3", "CIA");
    sync.set_selection([u3.clone()]);
    sync.set_categories(&["Logic".to_string()]);
    sync.show_schematic("video");

    let settings = sync.settings();
    assert_eq!(settings.last_hardware().as_deref(), Some("C64"));
    assert_eq!(settings.last_board("c64").as_deref(), Some("250407"));
    assert_eq!(settings.categories(&c64_key()), Some(vec!["Logic".to_string()]));
    assert_eq!(
        settings.selected_components(&c64_key()),
        Some(vec![u3.as_str().to_string()])
    );
    assert_eq!(settings.last_schematic(&c64_key()).as_deref(), Some("Video"));

    // Reloading the board restores all of it
    sync.change_board(c64_key(), &source).unwrap();
    assert_eq!(sync.active_categories(), vec!["Logic"]);
    assert_eq!(sync.selected_keys(), vec![u3]);
    assert_eq!(sync.displayed_schematic(), Some("Video"));
}

#[test]
fn test_select_all_and_dimming() {
    let mut sync = create_sync();
    sync.select_all();
    assert_eq!(sync.selected_keys().len(), sync.items().len());

    // Without bitmaps thumbnails keep their defaults
    for thumb in sync.thumbnails().iter() {
        assert_eq!(thumb.visual_opacity, 1.0);
        assert!(!thumb.is_match);
    }
}

#[test]
fn test_blink_timer() {
    let mut sync = create_sync();
    sync.set_blink_enabled(true);
    // Nothing selected: enabled but idle
    assert!(!sync.is_blinking());
    assert!(sync.blink_phase_visible());

    let u1 = key_of(&sync, "U1", "CPU");
    sync.set_selection([u1]);
    assert!(sync.is_blinking());

    let start = std::time::Instant::now();
    assert!(sync.time_to_next_blink(start).is_some());
    let later = start + Duration::from_millis(1000);
    assert!(sync.tick(later));
    assert!(!sync.blink_phase_visible());
    assert!(!sync.tick(later));

    sync.set_blink_enabled(false);
    assert!(!sync.is_blinking());
    assert!(sync.blink_phase_visible());
    assert!(sync.time_to_next_blink(later).is_none());
}

#[test]
fn test_background_board_change_supersedes() {
    let other = BoardKey::new("C64", "250469");
    let source: Arc<dyn BoardSource> = Arc::new(StaticSource::new(vec![
        (c64_key(), create_c64_board()),
        (other.clone(), BoardData::default()),
    ]));

    let mut sync = SelectionSync::new(ViewerConfig::default(), Box::new(MemoryStore::default()));
    sync.begin_board_change(c64_key(), source.clone());
    sync.begin_board_change(other.clone(), source);
    assert!(sync.is_loading_board());

    assert!(sync.wait_for_board(Duration::from_secs(5)).unwrap());
    assert_eq!(sync.board_key(), Some(&other));
    assert!(sync.items().is_empty());
    assert!(!sync.is_loading_board());
}

/// Serves boards like [`StaticSource`] after a fixed delay.
struct SlowSource {
    inner: StaticSource,
    delay: Duration,
}

impl BoardSource for SlowSource {
    fn catalog(&self) -> Result<Catalog> {
        self.inner.catalog()
    }

    fn load_board(&self, key: &BoardKey) -> Result<BoardData> {
        std::thread::sleep(self.delay);
        self.inner.load_board(key)
    }

    fn resolve_image(&self, key: &BoardKey, image_file: &str) -> PathBuf {
        self.inner.resolve_image(key, image_file)
    }
}

#[test]
fn test_saved_selection_survives_edits_during_load() {
    let mut sync = create_sync();
    let u1 = key_of(&sync, "U1", "CPU");
    sync.set_selection([u1.clone()]);

    let source: Arc<dyn BoardSource> = Arc::new(SlowSource {
        inner: StaticSource::new(vec![(c64_key(), create_c64_board())]),
        delay: Duration::from_millis(300),
    });
    sync.begin_board_change(c64_key(), source);
    assert!(sync.thumbnails().is_empty());

    // Controls stay live while the board loads
    sync.set_region("NTSC");
    sync.select_all();
    sync.clear_selection();
    sync.set_categories(&["Memory".to_string()]);

    let settings = sync.settings();
    assert_eq!(
        settings.selected_components(&c64_key()),
        Some(vec![u1.as_str().to_string()])
    );
    assert_eq!(settings.categories(&c64_key()), None);
    assert_eq!(settings.region().as_deref(), Some("NTSC"));

    assert!(sync.wait_for_board(Duration::from_secs(5)).unwrap());
    assert_eq!(sync.region(), "NTSC");
    assert_eq!(sync.selected_keys(), vec![u1]);
    assert!(!sync.thumbnails().is_empty());
}

#[test]
fn test_unknown_board_is_an_error() {
    let source = StaticSource::new(Vec::new());
    let mut sync = SelectionSync::new(ViewerConfig::default(), Box::new(MemoryStore::default()));
    let result = sync.change_board(c64_key(), &source);
    assert!(matches!(result, Err(ViewerError::UnknownBoard { .. })));
}

#[test]
fn test_opacity_accepts_percent_and_fraction() {
    assert_eq!(parse_opacity_or("20", 0.5), 0.20);
    assert_eq!(parse_opacity_or("0.2", 0.5), 0.2);
    assert_eq!(parse_opacity_or("150", 0.5), 1.0);
    assert_eq!(parse_opacity_or("-3", 0.5), 0.0);
    assert_eq!(parse_opacity_or("n/a", 0.5), 0.5);

    let config = ViewerConfig::default();
    let style = HighlightStyle::parse("not a color", "", &config);
    assert_eq!(style.color, config.default_highlight_color);
    assert_eq!(style.opacity, 0.20);
    assert_eq!(style.effective_opacity(0.0), 0.0);
}
