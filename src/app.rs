use std::{sync::Arc, time::Duration};

use eframe::{App, Frame, egui};
use egui::{Color32, ColorImage, TextureOptions};
use rfd::FileDialog;
use tokio::runtime::Handle;

use crate::controller::Controller;
use crate::downloader::Downloader;
use crate::format::format_file_size;
use crate::ui::{self, Dispatcher, StatusKind, ViewState};

/// The main window
pub struct VidfetchApp {
    controller: Controller,
    dispatcher: Dispatcher,
    view: ViewState,
    /// Texture for the open metadata window
    thumbnail: Option<egui::TextureHandle>,
}

impl VidfetchApp {
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Handle, model: Arc<Downloader>) -> Self {
        let ctx = cc.egui_ctx.clone();
        let (handle, dispatcher) = ui::channel(move || ctx.request_repaint());
        let view = ViewState::new(&model.destination());
        let controller = Controller::new(model, runtime, handle);
        controller.check_engine();
        Self {
            controller,
            dispatcher,
            view,
            thumbnail: None,
        }
    }

    fn form(&mut self, ui: &mut egui::Ui) {
        let enabled = self.view.inputs_enabled;

        ui.heading("YouTube Video Downloader");
        ui.add_space(8.0);

        ui.label("Paste YouTube video URL:");
        ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(&mut self.view.url_input).desired_width(f32::INFINITY),
        );

        ui.horizontal(|ui| {
            ui.label("Download folder:");
            ui.label(&self.view.destination);
            if ui.add_enabled(enabled, egui::Button::new("Browse…")).clicked() {
                if let Some(folder) = FileDialog::new()
                    .set_directory(self.controller.destination())
                    .pick_folder()
                {
                    self.controller.choose_destination(folder);
                }
            }
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(enabled, egui::Button::new("⬇ Download")).clicked() {
                self.controller.submit_download(&self.view.url_input);
            }
            if ui.add_enabled(enabled, egui::Button::new("ℹ Get Info")).clicked() {
                self.controller.request_info(&self.view.url_input);
            }
            if ui.add_enabled(enabled, egui::Button::new("Clear")).clicked() {
                self.controller.clear();
            }
        });

        ui.add_space(8.0);
        if self.view.busy {
            match self.view.progress.as_ref() {
                Some(progress) => {
                    if let Some(fraction) = progress.fraction() {
                        ui.add(egui::ProgressBar::new(fraction).show_percentage());
                    }
                    ui.label(format!(
                        "Progress: {} | Speed: {}",
                        progress.percent, progress.speed
                    ));
                }
                None => {
                    ui.add(egui::Spinner::new());
                }
            }
        }

        if let Some((kind, text)) = &self.view.status {
            let (icon, color) = match kind {
                StatusKind::Info => ("ℹ", Color32::from_rgb(0x21, 0x96, 0xF3)),
                StatusKind::Success => ("✓", Color32::from_rgb(0x4C, 0xAF, 0x50)),
                StatusKind::Error => ("✗", Color32::from_rgb(0xF4, 0x43, 0x36)),
            };
            ui.colored_label(color, format!("{} {}", icon, text));
        }
    }

    fn metadata_window(&mut self, ctx: &egui::Context) {
        let Some((info, report)) = &self.view.metadata else {
            return;
        };
        let mut open = true;
        let mut close = false;
        egui::Window::new("Video Information")
            .open(&mut open)
            .default_width(500.0)
            .resizable(true)
            .show(ctx, |ui| {
                if let Some(tex) = &self.thumbnail {
                    ui.image(tex);
                }
                egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                    ui.label(report.as_str());
                    ui.collapsing(format!("Available formats ({})", info.formats.len()), |ui| {
                        for f in &info.formats {
                            ui.label(format!(
                                "{}  {}  {}  {}",
                                f.format_id,
                                f.ext,
                                f.resolution,
                                format_file_size(f.filesize)
                            ));
                        }
                    });
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("📋 Copy Information").clicked() {
                        ui.output_mut(|o| o.copied_text = report.clone());
                    }
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            });
        if !open || close {
            self.view.close_metadata();
            self.thumbnail = None;
        }
    }

    fn playlist_window(&mut self, ctx: &egui::Context) {
        let Some(prompt) = &self.view.playlist_prompt else {
            return;
        };
        let mut accept = None;
        egui::Window::new("Playlist detected")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(prompt.message.as_str());
                ui.horizontal(|ui| {
                    if ui.button("Use first video").clicked() {
                        accept = Some(true);
                    }
                    if ui.button("Dismiss").clicked() {
                        accept = Some(false);
                    }
                });
            });
        match accept {
            Some(true) => self.view.accept_suggestion(),
            Some(false) => self.view.dismiss_prompt(),
            None => {}
        }
    }
}

impl App for VidfetchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.dispatcher.drain(&mut self.view);

        if let Some(thumb) = self.view.take_thumbnail() {
            let img = ColorImage::from_rgba_unmultiplied(thumb.size, &thumb.rgba);
            self.thumbnail = Some(ctx.load_texture("thumbnail", img, TextureOptions::default()));
        }

        egui::CentralPanel::default().show(ctx, |ui| self.form(ui));
        self.metadata_window(ctx);
        self.playlist_window(ctx);

        // Workers wake us on every message; this only keeps the spinner moving
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
