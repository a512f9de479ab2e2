// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Selection state synchronizer.
//!
//! [`SelectionSync`] owns every piece of per-board state: the filtered
//! component list, the selected rows, the per-schematic highlight indices,
//! the thumbnail cache, the blink timer and the live view transform. Each
//! public operation leaves that state consistent before it returns and queues
//! [`SyncEvent`]s describing what the UI has to refresh.

use image::RgbaImage;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::compose::{
    create_highlighted_thumbnail, overlay_quads, HighlightStyle, OverlayQuad, SchematicStyles,
};
use crate::config::ViewerConfig;
use crate::data::{BoardData, BoardKey, BoardSource};
use crate::error::Result;
use crate::filter::{
    build_highlight_table, component_items, distinct_categories, surviving_labels, CaseKey,
    ComponentItem, HighlightTable, SelectionKey,
};
use crate::geometry::{Point, Size};
use crate::index::HighlightIndex;
use crate::loader::{self, BackgroundLoader, CancelToken, FullResImage, LoadedBoard};
use crate::settings::SettingsStore;
use crate::thumbnail::{SchematicThumbnail, ThumbnailCache};
use crate::view::{ViewTransform, ZoomDirection, ZoomLimits, ZoomOutcome};

/// What changed after an operation. Drained by the UI once per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    BoardLoaded,
    CategoriesChanged,
    ComponentListChanged,
    SelectionChanged,
    ThumbnailsChanged,
    /// The overlay or the view matrix changed.
    RedrawOverlay,
    /// A schematic became the displayed one. Its bitmap may still be loading.
    SchematicDisplayed { name: String },
    /// The full-resolution bitmap of the displayed schematic is ready.
    FullResReady { name: String },
    /// A component was clicked on the schematic.
    OpenDetail { label: String, display_text: String },
}

/// Component row under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverHit {
    pub label: String,
    pub display_text: String,
}

#[derive(Debug, Clone)]
struct BlinkState {
    enabled: bool,
    phase_visible: bool,
    running: bool,
    last_tick: Instant,
    interval: Duration,
}

impl BlinkState {
    fn new(interval: Duration) -> Self {
        Self {
            enabled: false,
            phase_visible: true,
            running: false,
            last_tick: Instant::now(),
            interval,
        }
    }

    /// 1.0 unless blinking is on, something is selected and the phase is hidden.
    fn factor(&self, has_selection: bool) -> f64 {
        if !has_selection || !self.enabled || self.phase_visible {
            1.0
        } else {
            0.0
        }
    }
}

pub struct SelectionSync {
    config: ViewerConfig,
    settings: Box<dyn SettingsStore>,

    board_key: Option<BoardKey>,
    board: BoardData,
    categories: Vec<String>,
    active_categories: HashSet<CaseKey>,
    region: String,
    items: Vec<ComponentItem>,
    selected: HashSet<SelectionKey>,

    table: HighlightTable,
    indices: HashMap<CaseKey, Arc<HighlightIndex>>,
    styles: HashMap<CaseKey, SchematicStyles>,
    thumbnails: ThumbnailCache,
    has_selection: bool,
    overlay_multiplier: f64,
    blink: BlinkState,

    displayed: Option<String>,
    full_res: Option<Arc<RgbaImage>>,
    view: ViewTransform,

    board_loader: BackgroundLoader<LoadedBoard>,
    full_res_loader: BackgroundLoader<FullResImage>,
    events: Vec<SyncEvent>,
}

impl SelectionSync {
    pub fn new(config: ViewerConfig, settings: Box<dyn SettingsStore>) -> Self {
        let region = settings
            .region()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| config.default_region.clone());

        Self {
            view: ViewTransform::new(ZoomLimits::from(&config)),
            blink: BlinkState::new(config.blink_interval()),
            config,
            settings,
            board_key: None,
            board: BoardData::default(),
            categories: Vec::new(),
            active_categories: HashSet::new(),
            region,
            items: Vec::new(),
            selected: HashSet::new(),
            table: HighlightTable::new(),
            indices: HashMap::new(),
            styles: HashMap::new(),
            thumbnails: ThumbnailCache::default(),
            has_selection: false,
            overlay_multiplier: 1.0,
            displayed: None,
            full_res: None,
            board_loader: BackgroundLoader::new("board"),
            full_res_loader: BackgroundLoader::new("schematic"),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn board_key(&self) -> Option<&BoardKey> {
        self.board_key.as_ref()
    }

    pub fn board(&self) -> &BoardData {
        &self.board
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn is_category_active(&self, category: &str) -> bool {
        self.active_categories.contains(&CaseKey::new(category))
    }

    pub fn active_categories(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|c| self.is_category_active(c))
            .cloned()
            .collect()
    }

    /// Visible component rows in list order.
    pub fn items(&self) -> &[ComponentItem] {
        &self.items
    }

    pub fn is_selected(&self, key: &SelectionKey) -> bool {
        self.selected.contains(key)
    }

    /// Selected keys in list order.
    pub fn selected_keys(&self) -> Vec<SelectionKey> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(&item.key))
            .map(|item| item.key.clone())
            .collect()
    }

    pub fn has_selection(&self) -> bool {
        self.has_selection
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    /// Highlight index of a schematic; `None` when nothing selected lands on it.
    pub fn index_for(&self, schematic: &str) -> Option<&Arc<HighlightIndex>> {
        self.indices.get(&CaseKey::new(schematic))
    }

    pub fn displayed_schematic(&self) -> Option<&str> {
        self.displayed.as_deref()
    }

    pub fn full_res_image(&self) -> Option<&Arc<RgbaImage>> {
        self.full_res.as_ref()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn is_loading_board(&self) -> bool {
        self.board_loader.is_loading()
    }

    pub fn is_loading_schematic(&self) -> bool {
        self.full_res_loader.is_loading()
    }

    pub fn blink_enabled(&self) -> bool {
        self.blink.enabled
    }

    pub fn blink_phase_visible(&self) -> bool {
        self.blink.phase_visible
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.running
    }

    pub fn drain_events(&mut self) -> Vec<SyncEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: SyncEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    // Board lifecycle

    /// Drops all per-board state and starts loading `key` in the background.
    /// The result is installed by [`SelectionSync::poll`].
    pub fn begin_board_change(&mut self, key: BoardKey, source: Arc<dyn BoardSource>) {
        self.clear_board();
        self.remember_board(&key);
        self.board_key = Some(key.clone());

        let max_width = self.config.thumbnail_max_width;
        self.board_loader.start(move |token| {
            loader::load_board(source.as_ref(), &key, max_width, token)
        });
    }

    /// Loads `key` on the calling thread and installs it.
    pub fn change_board(&mut self, key: BoardKey, source: &dyn BoardSource) -> Result<()> {
        self.clear_board();
        self.remember_board(&key);
        self.board_key = Some(key.clone());

        let loaded = loader::load_board(
            source,
            &key,
            self.config.thumbnail_max_width,
            &CancelToken::new(),
        )?;
        self.finish_board_load(loaded);
        Ok(())
    }

    fn remember_board(&mut self, key: &BoardKey) {
        self.settings.set_last_hardware(&key.hardware);
        self.settings.set_last_board(&key.hardware, &key.board);
    }

    fn clear_board(&mut self) {
        self.board_loader.cancel();
        self.full_res_loader.cancel();

        self.board_key = None;
        self.board = BoardData::default();
        self.categories.clear();
        self.active_categories.clear();
        self.items.clear();
        self.selected.clear();
        self.table.clear();
        self.indices.clear();
        self.styles.clear();
        self.thumbnails.clear();
        self.has_selection = false;
        self.overlay_multiplier = 1.0;
        self.update_blink_timer(false);

        self.displayed = None;
        self.full_res = None;
        self.view.reset();

        self.emit(SyncEvent::CategoriesChanged);
        self.emit(SyncEvent::ComponentListChanged);
        self.emit(SyncEvent::ThumbnailsChanged);
        self.emit(SyncEvent::RedrawOverlay);
    }

    /// Installs a loaded board and restores the saved choices for it.
    pub fn finish_board_load(&mut self, loaded: LoadedBoard) {
        let LoadedBoard {
            key,
            data,
            schematics,
        } = loaded;

        if self.board_key.as_ref().is_some_and(|k| *k != key) {
            log::debug!("Ignored board {} loaded after a newer change", key.storage_key());
            return;
        }

        log::info!("[INFO] Installing board {}", key.storage_key());
        self.board_key = Some(key.clone());
        self.board = data;

        self.styles = self
            .board
            .schematics
            .iter()
            .map(|s| {
                (
                    CaseKey::new(&s.name),
                    SchematicStyles::from_record(s, &self.config),
                )
            })
            .collect();

        self.thumbnails = ThumbnailCache::new(
            schematics
                .into_iter()
                .map(|s| {
                    SchematicThumbnail::new(
                        s.record.name,
                        s.image_path,
                        s.thumbnail,
                        s.original_size,
                    )
                })
                .collect(),
        );

        self.categories = distinct_categories(&self.board);
        self.active_categories = match self.settings.categories(&key) {
            Some(saved) => {
                let saved: HashSet<CaseKey> = saved.iter().map(|c| CaseKey::new(c)).collect();
                self.categories
                    .iter()
                    .map(|c| CaseKey::new(c))
                    .filter(|c| saved.contains(c))
                    .collect()
            }
            None => self.categories.iter().map(|c| CaseKey::new(c)).collect(),
        };

        self.table = build_highlight_table(&self.board, &self.region);
        self.items = component_items(&self.board, &self.region, &self.active_categories);

        let saved_keys: HashSet<SelectionKey> = self
            .settings
            .selected_components(&key)
            .unwrap_or_default()
            .iter()
            .map(|k| SelectionKey::from_stored(k))
            .collect();
        self.selected = self
            .items
            .iter()
            .filter(|item| saved_keys.contains(&item.key))
            .map(|item| item.key.clone())
            .collect();

        self.rebuild_highlights();

        let restored = self
            .settings
            .last_schematic(&key)
            .filter(|name| self.thumbnails.find(name).is_some())
            .or_else(|| self.thumbnails.get(0).map(|t| t.name.clone()));
        if let Some(name) = restored {
            self.display_schematic(&name, false);
        }

        self.emit(SyncEvent::BoardLoaded);
        self.emit(SyncEvent::CategoriesChanged);
        self.emit(SyncEvent::ComponentListChanged);
        self.emit(SyncEvent::SelectionChanged);
    }

    /// Installs finished background work. Returns an error when a board
    /// failed to load; a schematic bitmap that fails to decode is only logged.
    pub fn poll(&mut self) -> Result<()> {
        if let Some(result) = self.board_loader.try_recv() {
            self.finish_board_load(result?);
        }
        if let Some(result) = self.full_res_loader.try_recv() {
            self.install_full_res(result);
        }
        Ok(())
    }

    /// Blocks until the pending board load, if any, has been installed.
    pub fn wait_for_board(&mut self, timeout: Duration) -> Result<bool> {
        match self.board_loader.wait(timeout) {
            Some(result) => {
                self.finish_board_load(result?);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Blocks until the pending schematic bitmap, if any, has been installed.
    pub fn wait_for_full_res(&mut self, timeout: Duration) -> bool {
        match self.full_res_loader.wait(timeout) {
            Some(result) => {
                self.install_full_res(result);
                true
            }
            None => false,
        }
    }

    fn install_full_res(&mut self, result: Result<FullResImage>) {
        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                log::warn!("[WARN] {e}");
                return;
            }
        };

        let current = self.displayed.as_deref().map(CaseKey::new);
        if current != Some(CaseKey::new(&loaded.name)) {
            log::debug!("Dropped bitmap for {}, no longer displayed", loaded.name);
            return;
        }

        let (width, height) = loaded.image.dimensions();
        self.full_res = Some(Arc::new(loaded.image));
        self.view
            .set_image_size(Some(Size::new(f64::from(width), f64::from(height))));

        self.emit(SyncEvent::FullResReady { name: loaded.name });
        self.emit(SyncEvent::RedrawOverlay);
    }

    // Schematic display

    /// Displays a schematic and remembers it for the board.
    pub fn show_schematic(&mut self, name: &str) {
        self.display_schematic(name, true);
    }

    fn display_schematic(&mut self, name: &str, remember: bool) {
        let Some(thumb) = self.thumbnails.find(name) else {
            log::warn!("[WARN] Unknown schematic {name}");
            return;
        };
        let name = thumb.name.clone();
        let path = thumb.image_path.clone();
        let (width, height) = thumb.original_size();

        self.full_res_loader.cancel();
        self.full_res = None;
        self.view.reset();
        if width > 0 && height > 0 {
            self.view
                .set_image_size(Some(Size::new(f64::from(width), f64::from(height))));
        }
        self.displayed = Some(name.clone());

        if remember {
            if let Some(key) = self.persisted_board_key() {
                self.settings.set_last_schematic(&key, &name);
            }
        }

        let job_name = name.clone();
        self.full_res_loader
            .start(move |token| loader::load_full_res(&job_name, &path, token));

        self.emit(SyncEvent::SchematicDisplayed { name });
        self.emit(SyncEvent::RedrawOverlay);
    }

    // Filters and selection

    /// Replaces the set of visible categories.
    pub fn set_categories(&mut self, categories: &[String]) {
        self.active_categories = categories.iter().map(|c| CaseKey::new(c)).collect();
        self.refilter();

        if let Some(key) = self.persisted_board_key() {
            let active = self.active_categories();
            self.settings.set_categories(&key, &active);
        }
        self.persist_selection();
        self.emit(SyncEvent::CategoriesChanged);
    }

    /// Shows or hides one category.
    pub fn set_category_active(&mut self, category: &str, active: bool) {
        let mut categories = self.active_categories();
        if active {
            categories.push(category.to_string());
        } else {
            let key = CaseKey::new(category);
            categories.retain(|c| CaseKey::new(c) != key);
        }
        self.set_categories(&categories);
    }

    pub fn set_region(&mut self, region: &str) {
        if CaseKey::new(region) == CaseKey::new(&self.region) {
            return;
        }

        self.region = region.trim().to_string();
        self.settings.set_region(&self.region);
        self.table = build_highlight_table(&self.board, &self.region);
        self.refilter();
        self.persist_selection();
    }

    /// Recomputes visible rows and keeps the selections that still match a
    /// row by label, name, value and region.
    fn refilter(&mut self) {
        self.items = component_items(&self.board, &self.region, &self.active_categories);
        let visible: HashSet<&SelectionKey> = self.items.iter().map(|i| &i.key).collect();
        self.selected.retain(|k| visible.contains(k));

        self.rebuild_highlights();
        self.emit(SyncEvent::ComponentListChanged);
        self.emit(SyncEvent::SelectionChanged);
    }

    /// Replaces the selection. Keys without a visible row are ignored.
    pub fn set_selection<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = SelectionKey>,
    {
        let wanted: HashSet<SelectionKey> = keys.into_iter().collect();
        self.selected = self
            .items
            .iter()
            .filter(|item| wanted.contains(&item.key))
            .map(|item| item.key.clone())
            .collect();
        self.selection_changed();
    }

    pub fn set_selected(&mut self, key: &SelectionKey, selected: bool) {
        let changed = if selected {
            self.items.iter().any(|i| i.key == *key) && self.selected.insert(key.clone())
        } else {
            self.selected.remove(key)
        };
        if changed {
            self.selection_changed();
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.items.iter().map(|i| i.key.clone()).collect();
        self.selection_changed();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.selection_changed();
    }

    /// Right-click behavior: deselects every row of `label` when any of them is
    /// selected, otherwise selects the first one.
    pub fn toggle_label(&mut self, label: &str) {
        let label = CaseKey::new(label);
        let any_selected = self
            .items
            .iter()
            .any(|i| i.label_key() == label && self.selected.contains(&i.key));

        if any_selected {
            for item in self.items.iter().filter(|i| i.label_key() == label) {
                self.selected.remove(&item.key);
            }
            self.selection_changed();
        } else {
            self.select_first_row(&label);
        }
    }

    /// Left-click behavior: selects the first row of `label` and asks the UI
    /// for a detail view.
    pub fn select_label(&mut self, label: &str, display_text: &str) {
        let key = CaseKey::new(label);
        if self.select_first_row(&key) {
            self.emit(SyncEvent::OpenDetail {
                label: key.as_str().to_string(),
                display_text: display_text.to_string(),
            });
        }
    }

    fn select_first_row(&mut self, label: &CaseKey) -> bool {
        let Some(item) = self.items.iter().find(|i| i.label_key() == *label) else {
            return false;
        };
        if self.selected.insert(item.key.clone()) {
            self.selection_changed();
        }
        true
    }

    fn selection_changed(&mut self) {
        self.rebuild_highlights();
        self.persist_selection();
        self.emit(SyncEvent::SelectionChanged);
    }

    fn persist_selection(&mut self) {
        let Some(key) = self.persisted_board_key() else {
            return;
        };
        let keys: Vec<String> = self
            .selected_keys()
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();
        self.settings.set_selected_components(&key, &keys);
    }

    /// Key to store per-board choices under. `None` while the board is still
    /// loading, since its rows are not known yet and the saved choices must
    /// survive until they are restored.
    fn persisted_board_key(&self) -> Option<BoardKey> {
        if self.board_loader.is_loading() {
            return None;
        }
        self.board_key.clone()
    }

    // Highlights

    /// Rebuilds the per-schematic indices from the selected labels and
    /// refreshes every visual that depends on them.
    fn rebuild_highlights(&mut self) {
        let labels = surviving_labels(&self.items, &self.selected);
        let mut unique = HashSet::new();
        let labels: Vec<CaseKey> = labels
            .iter()
            .map(|l| CaseKey::new(l))
            .filter(|l| unique.insert(l.clone()))
            .collect();

        self.indices.clear();
        if !labels.is_empty() {
            for (schematic, by_label) in &self.table {
                let rects = labels
                    .iter()
                    .filter_map(|l| by_label.get(l))
                    .flat_map(|rects| rects.iter().copied());
                let index = HighlightIndex::new(rects);
                if !index.is_empty() {
                    self.indices.insert(schematic.clone(), Arc::new(index));
                }
            }
        }

        self.has_selection = !labels.is_empty();
        self.apply_highlight_visuals(self.has_selection);
        self.update_blink_timer(self.has_selection);
    }

    fn default_style(&self) -> HighlightStyle {
        HighlightStyle {
            color: self.config.default_highlight_color,
            opacity: self.config.default_highlight_opacity,
        }
    }

    /// Regenerates thumbnail variants and the overlay multiplier for the
    /// current blink phase.
    fn apply_highlight_visuals(&mut self, has_selection: bool) {
        let factor = self.blink.factor(has_selection);
        let fallback = self.default_style();
        self.overlay_multiplier = factor;

        for thumb in self.thumbnails.iter_mut() {
            let Some(base) = thumb.base().cloned() else {
                continue;
            };

            let key = CaseKey::new(&thumb.name);
            let has_match = match self.indices.get(&key) {
                Some(index) => {
                    let style = self
                        .styles
                        .get(&key)
                        .map(|s| s.thumbnail)
                        .unwrap_or(fallback);
                    let variant = create_highlighted_thumbnail(
                        &base,
                        thumb.original_size(),
                        index,
                        style,
                        factor,
                    );
                    thumb.install_variant(variant);
                    true
                }
                None => {
                    thumb.restore_base();
                    false
                }
            };

            thumb.visual_opacity = if !has_selection || has_match {
                1.0
            } else {
                self.config.dimmed_thumbnail_opacity
            };
            thumb.is_match = has_selection && has_match;
        }

        self.emit(SyncEvent::ThumbnailsChanged);
        self.emit(SyncEvent::RedrawOverlay);
    }

    /// Container-space quads for the displayed schematic.
    pub fn overlay_quads(&self) -> Vec<OverlayQuad> {
        let Some(name) = self.displayed.as_deref() else {
            return Vec::new();
        };
        let key = CaseKey::new(name);
        let style = self
            .styles
            .get(&key)
            .map(|s| s.main)
            .unwrap_or_else(|| self.default_style());

        overlay_quads(
            self.indices.get(&key).map(Arc::as_ref),
            &self.view,
            style,
            self.overlay_multiplier,
        )
    }

    /// Component row under `at` (container coordinates) on the displayed
    /// schematic. Rows are scanned in list order; the first label whose
    /// rectangles contain the point wins.
    pub fn hit_test(&self, at: Point) -> Option<HoverHit> {
        let name = self.displayed.as_deref()?;
        let by_label = self.table.get(&CaseKey::new(name))?;
        let pixel = self.view.to_image_pixel(at)?;

        let mut seen = HashSet::new();
        for item in &self.items {
            if item.board_label.is_empty() {
                continue;
            }
            let label = item.label_key();
            if !seen.insert(label.clone()) {
                continue;
            }
            let Some(rects) = by_label.get(&label) else {
                continue;
            };
            if rects.iter().any(|r| r.contains(pixel)) {
                return Some(HoverHit {
                    label: item.board_label.clone(),
                    display_text: item.display_text.clone(),
                });
            }
        }
        None
    }

    // Blink

    pub fn set_blink_enabled(&mut self, enabled: bool) {
        self.blink.enabled = enabled;
        let has_selection = !self.indices.is_empty();

        if enabled && has_selection {
            // Start hidden so the toggle is visible at once.
            self.blink.phase_visible = false;
            self.apply_highlight_visuals(true);
            self.update_blink_timer(true);
            return;
        }

        self.blink.phase_visible = true;
        self.update_blink_timer(has_selection);
        self.apply_highlight_visuals(has_selection);
    }

    fn update_blink_timer(&mut self, has_selection: bool) {
        if !(self.blink.enabled && has_selection) {
            self.blink.running = false;
            self.blink.phase_visible = true;
            return;
        }
        if !self.blink.running {
            self.blink.running = true;
            self.blink.last_tick = Instant::now();
        }
    }

    /// One blink period elapsed: flip the phase, or stop when nothing is
    /// highlighted any more.
    pub fn blink_tick(&mut self) {
        if self.indices.is_empty() {
            self.update_blink_timer(false);
            self.apply_highlight_visuals(false);
            return;
        }

        self.blink.phase_visible = !self.blink.phase_visible;
        self.apply_highlight_visuals(true);
    }

    /// Drives the blink timer from the frame loop. Returns true when a tick ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.blink.running {
            return false;
        }
        if now.saturating_duration_since(self.blink.last_tick) < self.blink.interval {
            return false;
        }
        self.blink.last_tick = now;
        self.blink_tick();
        true
    }

    /// Time until the next blink tick is due, `None` when not blinking.
    pub fn time_to_next_blink(&self, now: Instant) -> Option<Duration> {
        if !self.blink.running {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.blink.last_tick);
        Some(self.blink.interval.saturating_sub(elapsed))
    }

    // View

    pub fn resize_view(&mut self, size: Size) {
        if self.view.set_container_size(size) {
            self.emit(SyncEvent::RedrawOverlay);
        }
    }

    pub fn zoom(&mut self, cursor: Point, direction: ZoomDirection) -> ZoomOutcome {
        let outcome = self.view.zoom(cursor, direction);
        if outcome.needs_redraw() {
            self.emit(SyncEvent::RedrawOverlay);
        }
        outcome
    }

    pub fn begin_pan(&mut self, at: Point) {
        self.view.begin_pan(at);
    }

    pub fn pan_to(&mut self, at: Point) {
        if self.view.pan_to(at) {
            self.emit(SyncEvent::RedrawOverlay);
        }
    }

    pub fn end_pan(&mut self) {
        self.view.end_pan();
    }
}
