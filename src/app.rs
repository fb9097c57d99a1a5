use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{Alert, PostError};
use crate::library::{self, SystemPhotoLibrary};
use crate::outbox::Outbox;
use crate::preview::{PreviewController, PreviewState};
use crate::state::{FilterKind, FilterParameters};
use crate::submit::{PendingPost, PostSubmitter};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const INITIAL_VIEW_WIDTH: f32 = 600.0;

/// One visit to the new-post screen. Replaced after a successful post.
struct ImagePostScreen {
    controller: PreviewController,
    title: String,
    texture: Option<egui::TextureHandle>,
    texture_revision: u64,
    pending: Option<PendingPost>,
    alert: Option<Alert>,
}

impl ImagePostScreen {
    fn new(params: FilterParameters) -> Self {
        Self {
            controller: PreviewController::new(INITIAL_VIEW_WIDTH, 1.0, params),
            title: String::new(),
            texture: None,
            texture_revision: 0,
            pending: None,
            alert: None,
        }
    }

    fn show_error(&mut self, err: PostError) {
        match err.alert() {
            Some(alert) => self.alert = Some(alert),
            None => warn!(%err, "action failed"),
        }
    }

    /// Upload the displayed bitmap when the controller has a newer one.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        if self.controller.revision() == self.texture_revision {
            return;
        }
        self.texture_revision = self.controller.revision();
        let Some(preview) = self.controller.displayed() else {
            self.texture = None;
            return;
        };
        let rgba = preview.image().to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let img = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        self.texture = Some(ctx.load_texture("post_preview", img, egui::TextureOptions::LINEAR));
    }
}

pub struct ImagePostApp {
    screen: ImagePostScreen,
    library: SystemPhotoLibrary,
    submitter: PostSubmitter,
    initial_filters: FilterParameters,
    status: String,
    config: AppConfig,
}

impl ImagePostApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let library = SystemPhotoLibrary::new(config.library_dir());
        let outbox = Outbox::new(config.outbox_dir());
        info!(outbox = %outbox.dir().display(), "posts will be stored locally");
        let submitter = PostSubmitter::new(Arc::new(outbox), config.jpeg_quality());
        let initial_filters = config.initial_filters();
        Self {
            screen: ImagePostScreen::new(initial_filters),
            library,
            submitter,
            initial_filters,
            status: String::new(),
            config,
        }
    }

    fn choose_image(&mut self) {
        match library::choose_image(&mut self.library) {
            Ok(Some(picked)) => self.screen.controller.select_image(&picked.bytes),
            Ok(None) => {}
            Err(err) => self.screen.show_error(err),
        }
    }

    fn create_post(&mut self) {
        let screen = &mut self.screen;
        match self
            .submitter
            .submit(screen.controller.displayed(), &screen.title)
        {
            Ok(pending) => {
                screen.pending = Some(pending);
                self.status = "Posting...".to_string();
            }
            Err(err) => screen.show_error(err),
        }
    }

    /// Drain the submission result on the UI thread.
    fn poll_pending(&mut self) {
        let Some(pending) = self.screen.pending.as_ref() else {
            return;
        };
        let Some(result) = pending.poll() else {
            return;
        };
        self.screen.pending = None;
        match result {
            Ok(()) => {
                self.status = format!("Posted \"{}\"", self.screen.title.trim());
                self.screen = ImagePostScreen::new(self.initial_filters);
            }
            Err(err) => {
                self.status.clear();
                self.screen.show_error(err);
            }
        }
    }
}

impl eframe::App for ImagePostApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_width = Some(rect.width());
            self.config.window_height = Some(rect.height());
        }

        self.poll_pending();
        if self.screen.pending.is_some() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }

        let posting = self.screen.pending.is_some();
        let mut choose_clicked = false;
        let mut post_clicked = false;

        egui::TopBottomPanel::top("main_menu").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.screen.controller.screen_title());
                ui.separator();
                let choose_label = match self.screen.controller.state() {
                    PreviewState::Empty => "Choose Image",
                    PreviewState::Loaded => "Change Image",
                };
                if ui.add_enabled(!posting, egui::Button::new(choose_label)).clicked() {
                    choose_clicked = true;
                }
                if ui.add_enabled(!posting, egui::Button::new("Post")).clicked() {
                    post_clicked = true;
                }
                if posting {
                    ui.spinner();
                }
                if !self.status.is_empty() {
                    ui.weak(&self.status);
                }
            });
        });

        egui::SidePanel::right("filters_panel")
            .min_width(260.0)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("Caption").strong());
                ui.add(
                    egui::TextEdit::singleline(&mut self.screen.title)
                        .hint_text("Title")
                        .desired_width(ui.available_width()),
                );
                ui.separator();

                ui.label(egui::RichText::new("Filters").strong());
                ui.add_space(4.0);
                let controller = &mut self.screen.controller;
                for kind in FilterKind::ALL {
                    let mut value = controller.parameters().get(kind);
                    let resp = ui.add(
                        egui::Slider::new(&mut value, kind.range())
                            .text(kind.label())
                            .fixed_decimals(2)
                            .clamping(egui::SliderClamping::Always),
                    );
                    if resp.changed() {
                        controller.set_parameter(kind, value);
                    }
                }
                if *controller.parameters() != self.initial_filters {
                    ui.add_space(4.0);
                    if ui.small_button("Reset filters").clicked() {
                        controller.set_parameters(self.initial_filters);
                    }
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let width = ui.available_width();
            self.screen
                .controller
                .set_viewport(width, ctx.pixels_per_point());
            self.screen.sync_texture(ctx);

            egui::ScrollArea::vertical()
                .id_salt("preview_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let viewport = self.screen.controller.viewport();
                    let size = egui::vec2(viewport.width, viewport.height);
                    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                    match self.screen.texture.as_ref() {
                        Some(tex) => {
                            ui.painter().image(
                                tex.id(),
                                rect,
                                egui::Rect::from_min_max(
                                    egui::pos2(0.0, 0.0),
                                    egui::pos2(1.0, 1.0),
                                ),
                                egui::Color32::WHITE,
                            );
                        }
                        None => {
                            ui.painter()
                                .rect_filled(rect, 4.0, egui::Color32::from_gray(40));
                            ui.painter().text(
                                rect.center(),
                                egui::Align2::CENTER_CENTER,
                                "Choose an image to get started",
                                egui::FontId::proportional(16.0),
                                egui::Color32::GRAY,
                            );
                        }
                    }
                });
        });

        let mut dismiss = false;
        if let Some(alert) = self.screen.alert.as_ref() {
            egui::Window::new(&alert.title)
                .id(egui::Id::new("alert"))
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(&alert.message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        dismiss = true;
                    }
                });
        }
        if dismiss {
            self.screen.alert = None;
        }

        // The picker dialog blocks, so run it after this frame's layout.
        if choose_clicked {
            self.choose_image();
        }
        if post_clicked {
            self.create_post();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.save();
    }
}
