use crate::device_display::interface::{DeviceDisplay, View};
use image::RgbImage;
use std::error::Error;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct DeviceDisplayFake {
    views: Arc<Mutex<Vec<View>>>,
    previews: Arc<Mutex<usize>>,
}

impl DeviceDisplayFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<View> {
        self.views.lock().unwrap().clone()
    }

    pub fn last_view(&self) -> Option<View> {
        self.views.lock().unwrap().last().cloned()
    }

    pub fn preview_count(&self) -> usize {
        *self.previews.lock().unwrap()
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn show(&mut self, view: &View) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.views.lock().unwrap().push(view.clone());
        Ok(())
    }

    fn show_preview(&mut self, _frame: &RgbImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        *self.previews.lock().unwrap() += 1;
        Ok(())
    }
}
