use image::RgbImage;
use std::error::Error;

/// Everything the window shows apart from the preview.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct View {
    pub status: String,
    pub progress: String,
    pub timer: String,
    pub start_enabled: bool,
    pub close_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayInput {
    StartPressed,
    ClosePressed,
}

pub trait DeviceDisplay: Send + Sync {
    fn show(&mut self, view: &View) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Replaces the preview with `frame`. Called from the acquisition thread.
    fn show_preview(&mut self, frame: &RgbImage) -> Result<(), Box<dyn Error + Send + Sync>>;
}
