use crate::device_display::interface::{DeviceDisplay, DisplayInput, View};
use eframe::egui;
use image::RgbImage;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const REPAINT_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Default)]
struct GuiState {
    view: View,
    preview: Option<RgbImage>,
}

/// Touchscreen window. `show`/`show_preview` only update shared state; the
/// window picks it up on its next repaint.
#[derive(Clone)]
pub struct DeviceDisplayGui {
    state: Arc<Mutex<GuiState>>,
    preview_size: (f32, f32),
}

impl DeviceDisplayGui {
    pub fn new(preview_size: Option<(u32, u32)>) -> Self {
        let (width, height) = preview_size.unwrap_or((420, 180));
        Self {
            state: Arc::new(Mutex::new(GuiState::default())),
            preview_size: (width as f32, height as f32),
        }
    }

    /// Blocks the calling thread (must be the main thread) until the window
    /// is closed.
    pub fn run<F>(&self, on_input: F) -> Result<(), Box<dyn Error + Send + Sync>>
    where
        F: Fn(DisplayInput) + Send + 'static,
    {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([
                    self.preview_size.0.max(420.0) + 40.0,
                    self.preview_size.1 + 140.0,
                ])
                .with_resizable(false),
            ..Default::default()
        };

        let window = GuiWindow {
            state: self.state.clone(),
            preview_size: self.preview_size,
            texture: None,
            on_input: Box::new(on_input),
        };

        eframe::run_native("Capture Station", options, Box::new(|_cc| Box::new(window)))
            .map_err(|e| -> Box<dyn Error + Send + Sync> { e.to_string().into() })
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn show(&mut self, view: &View) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.state.lock().unwrap().view = view.clone();
        Ok(())
    }

    fn show_preview(&mut self, frame: &RgbImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.state.lock().unwrap().preview = Some(frame.clone());
        Ok(())
    }
}

struct GuiWindow {
    state: Arc<Mutex<GuiState>>,
    preview_size: (f32, f32),
    texture: Option<egui::TextureHandle>,
    on_input: Box<dyn Fn(DisplayInput) + Send>,
}

impl GuiWindow {
    fn update_texture(&mut self, ctx: &egui::Context, frame: RgbImage) {
        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgb(size, frame.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::default()),
            None => {
                self.texture =
                    Some(ctx.load_texture("preview", image, egui::TextureOptions::default()))
            }
        }
    }
}

impl eframe::App for GuiWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (view, preview) = {
            let mut state = self.state.lock().unwrap();
            (state.view.clone(), state.preview.take())
        };
        if let Some(frame) = preview {
            self.update_texture(ctx, frame);
        }

        let mut close = view.close_enabled && ctx.input(|i| i.key_pressed(egui::Key::Escape));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(&view.status).size(18.0));

                match &self.texture {
                    Some(texture) => {
                        ui.add(
                            egui::Image::from_texture(egui::load::SizedTexture::from_handle(
                                texture,
                            ))
                            .max_size(egui::vec2(self.preview_size.0, self.preview_size.1)),
                        );
                    }
                    None => {
                        ui.add_space(self.preview_size.1);
                    }
                }

                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&view.progress).monospace());
                    ui.separator();
                    ui.label(egui::RichText::new(&view.timer).monospace());
                });

                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(view.start_enabled, egui::Button::new("Start"))
                        .clicked()
                    {
                        (self.on_input)(DisplayInput::StartPressed);
                    }
                    if ui
                        .add_enabled(view.close_enabled, egui::Button::new("Close"))
                        .clicked()
                    {
                        close = true;
                    }
                });
            });
        });

        if close {
            (self.on_input)(DisplayInput::ClosePressed);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
