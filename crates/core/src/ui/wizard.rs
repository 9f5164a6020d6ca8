//! The three-screen portrait wizard.
//!
//! `PortraitWizard` implements `eframe::App` and renders whatever phase the
//! session controller reports: the upload screen, the processing screen with
//! live narration, or the side-by-side result.

use super::export::{copy_to_clipboard, export_to_file};
use super::textures::{CachedTexture, fit_within, texture_for};
use crate::config::Config;
use crate::encoding::DEFAULT_EXPORT_FILENAME;
use crate::gemini::GeminiClient;
use crate::session::{EnhancementResult, Phase, SelectedFile, Session, SessionController};
use eframe::egui;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Handle;

const POLL_INTERVAL: Duration = Duration::from_millis(150);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(248, 113, 113);

pub struct PortraitWizard {
    controller: SessionController<GeminiClient>,
    runtime: Handle,
    model_name: String,

    // Ready screen
    path_input: String,

    // Textures, one slot per displayed image
    preview: Option<CachedTexture>,
    original: Option<CachedTexture>,
    enhanced: Option<CachedTexture>,

    /// Feedback from export/copy on the result screen.
    notice: Option<String>,
}

impl PortraitWizard {
    pub fn new(controller: SessionController<GeminiClient>, runtime: Handle, config: &Config) -> Self {
        Self {
            controller,
            runtime,
            model_name: config.model_name.clone(),
            path_input: String::new(),
            preview: None,
            original: None,
            enhanced: None,
            notice: None,
        }
    }

    fn select_path(&mut self, path: PathBuf) {
        self.path_input = path.display().to_string();
        // select_file spawns onto the ambient runtime
        let _guard = self.runtime.enter();
        drop(self.controller.select_file(SelectedFile::from_path(path)));
    }

    fn start_enhancement(&self, ctx: &egui::Context) {
        let controller = self.controller.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            controller.start_enhancement().await;
            ctx.request_repaint();
        });
    }

    fn restart(&mut self) {
        self.controller.reset();
        self.path_input.clear();
        self.notice = None;
        self.preview = None;
        self.original = None;
        self.enhanced = None;
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context, session: &Session) {
        if session.phase != Phase::Ready {
            return;
        }
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().find_map(|file| file.path) {
            self.select_path(path);
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui, session: &Session) {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.heading(egui::RichText::new("SONY ENHANCEMENT").strong());
                ui.label(
                    egui::RichText::new(format!("Engine: {}", self.model_name))
                        .small()
                        .color(egui::Color32::GRAY),
                );
            });
            if session.phase == Phase::Result {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Restart").clicked() {
                        self.restart();
                    }
                });
            }
        });
        ui.separator();
    }

    fn render_ready(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, session: &Session) {
        ui.vertical_centered(|ui| {
            ui.add_space(16.0);
            ui.heading("Portrait Re-Rendering");
            ui.label(
                egui::RichText::new(
                    "Transform any portrait with the characteristics of a Sony A1 + FE 85mm F1.4 GM setup. \
                     Identity is preserved; light is evolved.",
                )
                .color(egui::Color32::GRAY),
            );

            if session.status.is_error() {
                ui.add_space(8.0);
                ui.label(egui::RichText::new(&session.status.message).monospace().color(ERROR_COLOR));
            }
            ui.add_space(16.0);
        });

        ui.horizontal(|ui| {
            ui.label("Portrait:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .desired_width(420.0)
                    .hint_text("Path to a photo, or drop one onto the window"),
            );
            let enter_pressed = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if (ui.button("Load").clicked() || enter_pressed) && !self.path_input.trim().is_empty() {
                let path = PathBuf::from(self.path_input.trim());
                self.select_path(path);
            }
        });
        ui.add_space(12.0);

        ui.vertical_centered(|ui| match &session.preview_encoding {
            Some(uri) => {
                let max = egui::vec2(ui.available_width(), 420.0);
                show_image(ui, ctx, &mut self.preview, "preview", uri, max);

                ui.add_space(12.0);
                if ui
                    .add_enabled(session.can_start(), egui::Button::new("RENDER ENHANCEMENT  ➤"))
                    .clicked()
                {
                    self.start_enhancement(ctx);
                }
                if ui.small_button("Clear Selection").clicked() {
                    self.controller.clear_selection();
                    self.path_input.clear();
                }
            }
            None if session.selected_input.is_some() => {
                ui.spinner();
                ui.label("Reading photo...");
            }
            None => {
                ui.label(egui::RichText::new("Drop reference portrait").size(18.0));
                ui.label(
                    egui::RichText::new("Maximum fidelity preservation enabled")
                        .small()
                        .color(egui::Color32::GRAY),
                );
            }
        });
    }

    fn render_processing(&self, ui: &mut egui::Ui, session: &Session) {
        ui.vertical_centered(|ui| {
            ui.add_space(96.0);
            ui.add(egui::Spinner::new().size(64.0));
            ui.add_space(24.0);
            ui.heading("Evolving Frame");
            ui.label(
                egui::RichText::new(session.status.message.to_uppercase())
                    .monospace()
                    .color(egui::Color32::GRAY),
            );
        });
    }

    fn render_result(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, result: &EnhancementResult) {
        let column_width = (ui.available_width() - 24.0) / 2.0;
        let max = egui::vec2(column_width, ui.available_height() - 80.0);

        ui.columns(2, |columns| {
            columns[0].label(egui::RichText::new("SOURCE REFERENCE").small().color(egui::Color32::GRAY));
            show_image(&mut columns[0], ctx, &mut self.original, "original", &result.original_encoding, max);

            columns[1].horizontal(|ui| {
                ui.label(egui::RichText::new("ENHANCED OUTPUT").small().strong());
                if ui.small_button("Export").clicked() {
                    let path = Path::new(DEFAULT_EXPORT_FILENAME);
                    self.notice = Some(match export_to_file(&result.enhanced_encoding, path) {
                        Ok(()) => format!("Saved {}", path.display()),
                        Err(e) => format!("Export failed: {}", e),
                    });
                }
                if ui.small_button("Copy").clicked() {
                    self.notice = Some(match copy_to_clipboard(&result.enhanced_encoding) {
                        Ok(()) => "Copied to clipboard".to_string(),
                        Err(e) => e.to_string(),
                    });
                }
            });
            show_image(&mut columns[1], ctx, &mut self.enhanced, "enhanced", &result.enhanced_encoding, max);
        });

        if let Some(notice) = &self.notice {
            ui.add_space(8.0);
            ui.label(egui::RichText::new(notice).small().color(egui::Color32::GRAY));
        }
    }
}

fn show_image(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    slot: &mut Option<CachedTexture>,
    name: &str,
    uri: &str,
    max: egui::Vec2,
) {
    match texture_for(ctx, slot, name, uri) {
        Ok(texture) => {
            let size = fit_within(texture.size_vec2(), max);
            ui.add(egui::Image::from_texture((texture.id(), size)).fit_to_exact_size(size));
        }
        Err(message) => {
            ui.label(egui::RichText::new(format!("Cannot display image: {}", message)).color(ERROR_COLOR));
        }
    }
}

impl eframe::App for PortraitWizard {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Enforce dark mode
        ctx.set_visuals(egui::Visuals::dark());

        let session = self.controller.snapshot();
        self.handle_dropped_files(ctx, &session);

        // Background work (encoding, narration, the model call) does not
        // trigger repaints on its own
        let waiting = session.phase == Phase::Processing
            || (session.selected_input.is_some() && session.preview_encoding.is_none());
        if waiting {
            ctx.request_repaint_after(POLL_INTERVAL);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui, &session);

            match session.phase {
                Phase::Ready => self.render_ready(ui, ctx, &session),
                Phase::Processing => self.render_processing(ui, &session),
                Phase::Result => match &session.result {
                    Some(result) => self.render_result(ui, ctx, result),
                    None => {
                        ui.label("No result available.");
                    }
                },
            }
        });
    }
}
