// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use eframe::egui;
use image::RgbaImage;
use rfd::FileDialog;

use schematic_viewer::filter::SelectionKey;
use schematic_viewer::settings::SETTINGS_FILE_NAME;
use schematic_viewer::{
    BoardKey, BoardSource, Catalog, CsvBoardSource, JsonFileStore, MemoryStore, Point,
    SelectionSync, Size, SyncEvent, ViewerConfig, ZoomDirection,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

const REGIONS: [&str; 2] = ["PAL", "NTSC"];
const THUMBNAIL_WIDTH: f32 = 180.0;

pub struct SchematicViewerApp {
    data_root: Option<PathBuf>,
    source: Option<Arc<CsvBoardSource>>,
    catalog: Catalog,
    hardware: Option<String>,
    board: Option<String>,
    sync: SelectionSync,
    thumbnail_textures: HashMap<String, (u64, egui::TextureHandle)>,
    main_texture: Option<(String, egui::TextureHandle)>,
    // Label and display text of the last left-clicked component
    detail: Option<(String, String)>,
    error_message: Option<String>,
}

impl SchematicViewerApp {
    pub fn new(data_root: Option<PathBuf>) -> Self {
        let mut app = Self {
            data_root: None,
            source: None,
            catalog: Catalog::default(),
            hardware: None,
            board: None,
            sync: SelectionSync::new(ViewerConfig::default(), Box::new(MemoryStore::default())),
            thumbnail_textures: HashMap::new(),
            main_texture: None,
            detail: None,
            error_message: None,
        };
        if let Some(root) = data_root {
            app.open_data_root(root);
        }
        app
    }

    fn open_data_root(&mut self, root: PathBuf) {
        log::info!("[LOAD] Opening data folder: {}", root.display());

        let config = ViewerConfig::load_or_default(&root);
        let settings = JsonFileStore::open_or_default(root.join(SETTINGS_FILE_NAME));
        self.sync = SelectionSync::new(config, Box::new(settings));
        self.thumbnail_textures.clear();
        self.main_texture = None;
        self.detail = None;

        let source = Arc::new(CsvBoardSource::new(&root));
        self.data_root = Some(root);
        self.catalog = match source.catalog() {
            Ok(catalog) => catalog,
            Err(e) => {
                self.error_message = Some(format!("Failed to load board catalog: {e}"));
                Catalog::default()
            }
        };
        self.source = Some(source);

        let hardware_names = self.catalog.hardware_names();
        let hardware = self
            .sync
            .settings()
            .last_hardware()
            .and_then(|saved| {
                hardware_names
                    .iter()
                    .find(|h| h.eq_ignore_ascii_case(&saved))
                    .cloned()
            })
            .or_else(|| hardware_names.first().cloned());

        match hardware {
            Some(hardware) => self.select_hardware(hardware),
            None => {
                self.hardware = None;
                self.board = None;
            }
        }
    }

    fn select_hardware(&mut self, hardware: String) {
        let boards = self.catalog.boards_for(&hardware);
        let board = self
            .sync
            .settings()
            .last_board(&hardware)
            .and_then(|saved| boards.iter().find(|b| b.eq_ignore_ascii_case(&saved)).cloned())
            .or_else(|| boards.first().cloned());

        self.hardware = Some(hardware.clone());
        match board {
            Some(board) => self.select_board(hardware, board),
            None => self.board = None,
        }
    }

    fn select_board(&mut self, hardware: String, board: String) {
        let Some(source) = &self.source else {
            return;
        };

        self.board = Some(board.clone());
        self.thumbnail_textures.clear();
        self.main_texture = None;
        self.detail = None;

        let source: Arc<dyn BoardSource> = source.clone();
        self.sync
            .begin_board_change(BoardKey::new(hardware, board), source);
    }

    /// Returns true when any event was pending.
    fn handle_sync_events(&mut self) -> bool {
        let events = self.sync.drain_events();
        let pending = !events.is_empty();
        for event in events {
            match event {
                SyncEvent::OpenDetail {
                    label,
                    display_text,
                } => {
                    self.detail = Some((label, display_text));
                }
                SyncEvent::SchematicDisplayed { .. } | SyncEvent::FullResReady { .. } => {
                    self.main_texture = None;
                }
                SyncEvent::BoardLoaded => {
                    self.thumbnail_textures.clear();
                }
                _ => {}
            }
        }
        pending
    }

    fn to_color_image(image: &RgbaImage) -> egui::ColorImage {
        let (width, height) = image.dimensions();
        egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], image.as_raw())
    }

    fn thumbnail_texture(&mut self, ctx: &egui::Context, index: usize) -> Option<egui::TextureId> {
        let thumb = self.sync.thumbnails().get(index)?;
        let image = thumb.image()?;
        let revision = thumb.revision();

        if let Some((cached, texture)) = self.thumbnail_textures.get(&thumb.name) {
            if *cached == revision {
                return Some(texture.id());
            }
        }

        let texture = ctx.load_texture(
            format!("thumbnail-{}", thumb.name),
            Self::to_color_image(image),
            egui::TextureOptions::LINEAR,
        );
        let id = texture.id();
        self.thumbnail_textures
            .insert(thumb.name.clone(), (revision, texture));
        Some(id)
    }

    fn main_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureId> {
        let name = self.sync.displayed_schematic()?.to_string();
        if let Some((cached, texture)) = &self.main_texture {
            if *cached == name {
                return Some(texture.id());
            }
        }

        let image = self.sync.full_res_image()?;
        let texture = ctx.load_texture(
            format!("schematic-{name}"),
            Self::to_color_image(image),
            egui::TextureOptions::LINEAR,
        );
        let id = texture.id();
        self.main_texture = Some((name, texture));
        Some(id)
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Data Folder").clicked() {
                    if let Some(path) = FileDialog::new().pick_folder() {
                        self.open_data_root(path);
                    }
                    ui.close_menu();
                }
            });

            if let Some(root) = &self.data_root {
                ui.separator();
                ui.label(root.display().to_string());
            }
        });
    }

    fn render_left_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Board");

        let hardware_names = self.catalog.hardware_names();
        let mut chosen_hardware = None;
        egui::ComboBox::from_label("Hardware")
            .selected_text(self.hardware.clone().unwrap_or_default())
            .show_ui(ui, |ui| {
                for name in &hardware_names {
                    let selected = self.hardware.as_deref() == Some(name.as_str());
                    if ui.selectable_label(selected, name.as_str()).clicked() && !selected {
                        chosen_hardware = Some(name.clone());
                    }
                }
            });
        if let Some(hardware) = chosen_hardware {
            self.select_hardware(hardware);
        }

        let boards = self
            .hardware
            .as_deref()
            .map(|h| self.catalog.boards_for(h))
            .unwrap_or_default();
        let mut chosen_board = None;
        egui::ComboBox::from_label("Board")
            .selected_text(self.board.clone().unwrap_or_default())
            .show_ui(ui, |ui| {
                for name in &boards {
                    let selected = self.board.as_deref() == Some(name.as_str());
                    if ui.selectable_label(selected, name.as_str()).clicked() && !selected {
                        chosen_board = Some(name.clone());
                    }
                }
            });
        if let (Some(board), Some(hardware)) = (chosen_board, self.hardware.clone()) {
            self.select_board(hardware, board);
        }

        ui.horizontal(|ui| {
            ui.label("Region:");
            for region in REGIONS {
                let active = self.sync.region().eq_ignore_ascii_case(region);
                if ui.selectable_label(active, region).clicked() && !active {
                    self.sync.set_region(region);
                }
            }
        });

        let mut blink = self.sync.blink_enabled();
        if ui.checkbox(&mut blink, "Blink selected").changed() {
            self.sync.set_blink_enabled(blink);
        }

        ui.separator();
        ui.heading("Categories");
        let categories = self.sync.categories().to_vec();
        egui::ScrollArea::vertical()
            .id_salt("categories")
            .max_height(160.0)
            .show(ui, |ui| {
                for category in &categories {
                    let mut active = self.sync.is_category_active(category);
                    if ui.checkbox(&mut active, category.as_str()).changed() {
                        self.sync.set_category_active(category, active);
                    }
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            ui.heading("Components");
            if ui.small_button("Select all").clicked() {
                self.sync.select_all();
            }
            if ui.small_button("Clear").clicked() {
                self.sync.clear_selection();
            }
        });

        let items = self.sync.items().to_vec();
        let mut toggled: Vec<(SelectionKey, bool)> = Vec::new();
        egui::ScrollArea::vertical()
            .id_salt("components")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for item in &items {
                    let mut selected = self.sync.is_selected(&item.key);
                    if ui.checkbox(&mut selected, item.display_text.as_str()).changed() {
                        toggled.push((item.key.clone(), selected));
                    }
                }
            });
        for (key, selected) in toggled {
            self.sync.set_selected(&key, selected);
        }
    }

    fn render_thumbnails(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        let displayed = self.sync.displayed_schematic().map(str::to_string);
        let mut clicked = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            for index in 0..self.sync.thumbnails().len() {
                let Some(thumb) = self.sync.thumbnails().get(index) else {
                    continue;
                };
                let name = thumb.name.clone();
                let opacity = thumb.visual_opacity as f32;
                let is_match = thumb.is_match;
                let aspect = thumb
                    .image()
                    .map(|img| img.height() as f32 / img.width().max(1) as f32)
                    .unwrap_or(0.6);

                let size = egui::vec2(THUMBNAIL_WIDTH, THUMBNAIL_WIDTH * aspect);
                let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());

                match self.thumbnail_texture(&ctx, index) {
                    Some(texture) => {
                        ui.painter().image(
                            texture,
                            rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE.gamma_multiply(opacity),
                        );
                    }
                    None => {
                        ui.painter()
                            .rect_filled(rect, 0.0, egui::Color32::from_gray(40));
                    }
                }

                let stroke = if displayed.as_deref() == Some(name.as_str()) {
                    egui::Stroke::new(2.0, egui::Color32::from_rgb(33, 150, 243))
                } else if is_match {
                    egui::Stroke::new(2.0, egui::Color32::from_rgb(244, 67, 54))
                } else {
                    egui::Stroke::new(1.0, egui::Color32::from_gray(80))
                };
                ui.painter()
                    .rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Middle);

                ui.label(name.as_str());
                if response.clicked() {
                    clicked = Some(name);
                }
            }
        });

        if let Some(name) = clicked {
            self.sync.show_schematic(&name);
        }
    }

    fn render_schematic(&mut self, ui: &mut egui::Ui) {
        let available_size = ui.available_size();
        let (response, painter) =
            ui.allocate_painter(available_size, egui::Sense::click_and_drag());
        let rect = response.rect;
        let origin = rect.min;

        self.sync.resize_view(Size::new(
            f64::from(rect.width()),
            f64::from(rect.height()),
        ));

        let to_local =
            |p: egui::Pos2| Point::new(f64::from(p.x - origin.x), f64::from(p.y - origin.y));
        let to_screen = |r: schematic_viewer::Rect| {
            egui::Rect::from_min_size(
                egui::pos2(origin.x + r.x as f32, origin.y + r.y as f32),
                egui::vec2(r.width as f32, r.height as f32),
            )
        };

        // Mouse wheel zoom anchored at the pointer
        if let Some(hover_pos) = response.hover_pos() {
            let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
            if scroll_delta != 0.0 {
                let direction = if scroll_delta > 0.0 {
                    ZoomDirection::In
                } else {
                    ZoomDirection::Out
                };
                self.sync.zoom(to_local(hover_pos), direction);
            }
        }

        // Secondary button: click toggles the hovered component, drag pans
        if response.drag_started_by(egui::PointerButton::Secondary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.sync.begin_pan(to_local(pos));
            }
        }
        if response.dragged_by(egui::PointerButton::Secondary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.sync.pan_to(to_local(pos));
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Secondary) {
            self.sync.end_pan();
        }

        if response.secondary_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(hit) = self.sync.hit_test(to_local(pos)) {
                    self.sync.toggle_label(&hit.label);
                }
            }
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(hit) = self.sync.hit_test(to_local(pos)) {
                    self.sync.select_label(&hit.label, &hit.display_text);
                }
            }
        }

        let painter = painter.with_clip_rect(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::from_gray(24));

        let view = self.sync.view();
        let image_rect = to_screen(view.matrix().transform_rect(view.content_rect()));
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

        let ctx = ui.ctx().clone();
        let texture = self.main_texture(&ctx).or_else(|| {
            // Show the thumbnail until the full-resolution bitmap arrives
            let name = self.sync.displayed_schematic()?.to_string();
            let index = self.sync.thumbnails().position(&name)?;
            self.thumbnail_texture(&ctx, index)
        });
        if let Some(texture) = texture {
            painter.image(texture, image_rect, uv, egui::Color32::WHITE);
        }

        for quad in self.sync.overlay_quads() {
            let [r, g, b, a] = quad.color.to_array();
            let alpha = (f64::from(a) * quad.opacity).round() as u8;
            painter.rect_filled(
                to_screen(quad.rect),
                0.0,
                egui::Color32::from_rgba_unmultiplied(r, g, b, alpha),
            );
        }

        if self.sync.is_loading_schematic() {
            painter.text(
                rect.left_top() + egui::vec2(8.0, 8.0),
                egui::Align2::LEFT_TOP,
                "Loading schematic...",
                egui::FontId::proportional(14.0),
                egui::Color32::LIGHT_GRAY,
            );
        }

        if !self.sync.view().is_panning() {
            if let Some(hit) = response
                .hover_pos()
                .and_then(|pos| self.sync.hit_test(to_local(pos)))
            {
                response.on_hover_text_at_pointer(hit.display_text);
            }
        }
    }
}

impl eframe::App for SchematicViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Err(e) = self.sync.poll() {
            self.error_message = Some(format!("Failed to load board: {e}"));
        }

        let now = Instant::now();
        self.sync.tick(now);
        if let Some(delay) = self.sync.time_to_next_blink(now) {
            ctx.request_repaint_after(delay);
        }
        if self.sync.is_loading_board() || self.sync.is_loading_schematic() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        self.handle_sync_events();

        if let Some(error) = &self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.colored_label(egui::Color32::from_rgb(244, 67, 54), error);
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.allocate_space(egui::Vec2::new(ui.available_width() / 2.0 - 25.0, 0.0));
                        if ui.button("OK").clicked() {
                            self.error_message = None;
                        }
                    });
                });
        }

        if let Some((label, display_text)) = self.detail.clone() {
            let mut open = true;
            egui::Window::new(format!("Component {label}"))
                .open(&mut open)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(display_text.as_str());
                });
            if !open {
                self.detail = None;
            }
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui);
        });

        if self.sync.is_loading_board() {
            egui::TopBottomPanel::top("loading_bar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!(
                        "Loading board {}",
                        self.board.clone().unwrap_or_default()
                    ));
                });
            });
        }

        egui::SidePanel::left("left_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                self.render_left_panel(ui);
            });

        egui::SidePanel::right("thumbnails_panel")
            .resizable(true)
            .default_width(THUMBNAIL_WIDTH + 24.0)
            .show(ctx, |ui| {
                self.render_thumbnails(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.sync.displayed_schematic().unwrap_or("Schematic"));
            self.render_schematic(ui);
        });

        // Input handled this frame may have changed state drawn above
        if self.handle_sync_events() {
            ctx.request_repaint();
        }
    }
}
