use image::RgbImage;
use std::path::Path;

pub trait DeviceCamera {
    fn open(
        &self,
        device_path: &Path,
    ) -> Result<Box<dyn CameraHandle>, Box<dyn std::error::Error + Send + Sync>>;
}

/// An open capture session. Dropping the handle releases the device.
pub trait CameraHandle: Send {
    fn read_frame(&mut self) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>>;
}
