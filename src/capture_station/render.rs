use crate::capture_station::core::{Model, Phase};
use crate::capture_station::main::CaptureStation;
use crate::config::Config;
use crate::device_display::interface::View;
use std::error::Error;

pub fn view(config: &Config, model: &Model) -> View {
    let progress = match model.phase {
        Phase::Starting => "Pump running".to_string(),
        _ => format!("Images: {}/{}", model.captured_count, config.max_images),
    };
    let seconds = model.elapsed.as_secs();

    View {
        status: model.status.clone(),
        progress,
        timer: format!("Time: {:02}:{:02}", seconds / 60, seconds % 60),
        start_enabled: !model.closing && !model.phase.is_active(),
        close_enabled: !model.closing && !model.phase.is_active(),
    }
}

impl CaptureStation {
    pub(crate) fn render(&self, model: &Model) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.device_display
            .lock()
            .unwrap()
            .show(&view(&self.config, model))
    }
}
