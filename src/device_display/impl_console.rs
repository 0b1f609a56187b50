use crate::device_display::interface::{DeviceDisplay, View};
use image::RgbImage;
use std::error::Error;

const WIDTH: usize = 32;

/// Prints the view as a text panel whenever it changes. Previews are dropped.
pub struct DeviceDisplayConsole {
    last: Option<View>,
}

impl DeviceDisplayConsole {
    pub fn new() -> Self {
        Self { last: None }
    }

    fn render_display(view: &View) -> String {
        let border = "─".repeat(WIDTH);
        let mut out = format!("┌{}┐\n", border);
        for line in [&view.status, &view.progress, &view.timer] {
            let text: String = line.chars().take(WIDTH).collect();
            out.push_str(&format!("│{:<width$}│\n", text, width = WIDTH));
        }
        out.push_str(&format!("└{}┘", border));
        out
    }
}

impl Default for DeviceDisplayConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn show(&mut self, view: &View) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.last.as_ref() == Some(view) {
            return Ok(());
        }
        println!("{}", Self::render_display(view));
        self.last = Some(view.clone());
        Ok(())
    }

    fn show_preview(&mut self, _frame: &RgbImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
