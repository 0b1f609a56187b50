use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Holds at most one frame; every store replaces the previous one.
#[derive(Clone, Default)]
pub struct FrameSlot {
    frame: Arc<Mutex<Option<RgbImage>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, frame: RgbImage) {
        *self.frame.lock().unwrap() = Some(frame);
    }

    pub fn is_empty(&self) -> bool {
        self.frame.lock().unwrap().is_none()
    }

    /// `None` when no frame has been stored yet.
    pub fn encode_png(&self) -> Option<Result<Vec<u8>, image::ImageError>> {
        let frame = self.frame.lock().unwrap();
        frame.as_ref().map(|frame| -> Result<Vec<u8>, image::ImageError> {
            let mut png = Cursor::new(Vec::new());
            frame.write_to(&mut png, ImageFormat::Png)?;
            Ok(png.into_inner())
        })
    }
}
